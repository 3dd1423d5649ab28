//! Platform hosts
//!
//! Implementations of `sim::Host`:
//! - `headless`: virtual clock for tests and the native demo
//! - `web`: browser canvas, timers and input (wasm32 only)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::VirtualHost;
