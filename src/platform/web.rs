//! Browser host
//!
//! Draws on a 2D canvas and maps the game's timer requests onto
//! `requestAnimationFrame`, `setTimeout` and `setInterval`. Menus and HUD
//! text live in the page's own scripts, which drive `WebGame` through the
//! exported command/query methods.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window};

use crate::consts::{FIELD_HEIGHT, FIELD_WIDTH, FRAME_MS};
use crate::sim::{
    Difficulty, EndReason, Game, GameMode, GamePhase, Host, Sprite, TimerKind, TimerToken,
};

/// Browser handle behind a pending callback
#[derive(Debug, Clone, Copy)]
enum Handle {
    Frame(i32),
    Timeout(i32),
    Interval(i32),
}

/// Rust side of a pending browser callback, held so the JS function stays valid
#[allow(dead_code)]
enum Callback {
    Frame(Closure<dyn FnMut(f64)>),
    Timer(Closure<dyn FnMut()>),
}

struct WebApp {
    game: Game,
    host: WebHost,
}

struct WebHost {
    window: Window,
    ctx: CanvasRenderingContext2d,
    size: (f64, f64),
    app: Weak<RefCell<WebApp>>,
    handles: HashMap<TimerToken, Handle>,
    callbacks: HashMap<TimerToken, Callback>,
    /// Fired or cancelled callbacks. One of them may still be on the stack.
    retired: Vec<Callback>,
    last_frame_time: Option<f64>,
}

impl WebHost {
    fn fire(app: &Weak<RefCell<WebApp>>, token: TimerToken, time: Option<f64>) {
        let Some(app) = app.upgrade() else {
            return;
        };
        let Ok(mut guard) = app.try_borrow_mut() else {
            log::warn!("Re-entrant timer callback {:?} dropped", token);
            return;
        };
        let app = &mut *guard;
        // Only the closure for `token` is running, and it is not retired yet
        app.host.retired.clear();

        match token.kind {
            TimerKind::Countdown => app.game.on_countdown(token, &mut app.host),
            TimerKind::Spawn => {
                app.host.retire(token);
                app.game.on_spawn(token, &mut app.host);
            }
            TimerKind::Frame => {
                app.host.retire(token);
                let dt = match (app.host.last_frame_time, time) {
                    (Some(last), Some(now)) => ((now - last) / FRAME_MS) as f32,
                    _ => 1.0,
                };
                app.host.last_frame_time = time;
                app.game.on_frame(token, dt, &mut app.host);
            }
        }
    }

    /// Forget `token`'s browser handle and park its closure until it is
    /// safe to drop
    fn retire(&mut self, token: TimerToken) -> Option<Handle> {
        if let Some(callback) = self.callbacks.remove(&token) {
            self.retired.push(callback);
        }
        self.handles.remove(&token)
    }
}

impl Host for WebHost {
    fn request_frame(&mut self, token: TimerToken) {
        let app = self.app.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |time: f64| {
            WebHost::fire(&app, token, Some(time));
        });
        match self.window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => {
                self.handles.insert(token, Handle::Frame(id));
                self.callbacks.insert(token, Callback::Frame(closure));
            }
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }

    fn set_interval(&mut self, token: TimerToken, period_ms: u32) {
        let app = self.app.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            WebHost::fire(&app, token, None);
        });
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms as i32,
            ) {
            Ok(id) => {
                self.handles.insert(token, Handle::Interval(id));
                self.callbacks.insert(token, Callback::Timer(closure));
            }
            Err(e) => log::error!("setInterval failed: {:?}", e),
        }
    }

    fn set_timeout(&mut self, token: TimerToken, delay_ms: u32) {
        let app = self.app.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            WebHost::fire(&app, token, None);
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms as i32,
            ) {
            Ok(id) => {
                self.handles.insert(token, Handle::Timeout(id));
                self.callbacks.insert(token, Callback::Timer(closure));
            }
            Err(e) => log::error!("setTimeout failed: {:?}", e),
        }
    }

    fn cancel(&mut self, token: TimerToken) {
        match self.retire(token) {
            Some(Handle::Frame(id)) => {
                let _ = self.window.cancel_animation_frame(id);
                self.last_frame_time = None;
            }
            Some(Handle::Timeout(id)) => self.window.clear_timeout_with_handle(id),
            Some(Handle::Interval(id)) => self.window.clear_interval_with_handle(id),
            None => {}
        }
    }

    fn draw(&mut self, sprites: &[Sprite]) {
        let ctx = &self.ctx;
        ctx.clear_rect(0.0, 0.0, self.size.0, self.size.1);

        for sprite in sprites {
            let (x, y, r) = (
                sprite.pos.x as f64,
                sprite.pos.y as f64,
                sprite.radius as f64,
            );
            ctx.begin_path();
            if ctx.arc(x, y, r, 0.0, std::f64::consts::TAU).is_err() {
                continue;
            }
            ctx.set_fill_style_str(sprite.color.css());
            ctx.fill();

            if let Some(hits) = sprite.hits_remaining {
                ctx.set_fill_style_str("white");
                ctx.set_font(&format!("bold {}px Arial", sprite.radius.round()));
                ctx.set_text_align("center");
                ctx.set_text_baseline("middle");
                let _ = ctx.fill_text(&hits.to_string(), x, y);
            }
        }
    }
}

/// Game bound to a page canvas
#[wasm_bindgen]
pub struct WebGame {
    app: Rc<RefCell<WebApp>>,
}

#[wasm_bindgen]
impl WebGame {
    /// Attach to `<canvas id=canvas_id>`. Fails if the canvas or its 2D
    /// context is missing.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<WebGame, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed);
        game.set_field_size(FIELD_WIDTH, FIELD_HEIGHT);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new_cyclic(|weak| {
            RefCell::new(WebApp {
                game,
                host: WebHost {
                    window: window.clone(),
                    ctx,
                    size: (FIELD_WIDTH as f64, FIELD_HEIGHT as f64),
                    app: weak.clone(),
                    handles: HashMap::new(),
                    callbacks: HashMap::new(),
                    retired: Vec::new(),
                    last_frame_time: None,
                },
            })
        });

        setup_input_handlers(&window, &canvas, Rc::downgrade(&app))?;
        Ok(WebGame { app })
    }

    /// Start a session; `mode` is "hunt"/"clicker", `difficulty` one of
    /// "easy"/"normal"/"hard"/"veryhard"
    pub fn start(&self, mode: &str, difficulty: &str) -> Result<(), JsValue> {
        let mode = GameMode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown mode: {mode}")))?;
        let difficulty = Difficulty::from_str(difficulty)
            .ok_or_else(|| JsValue::from_str(&format!("unknown difficulty: {difficulty}")))?;

        let mut guard = self.app.borrow_mut();
        let app = &mut *guard;
        app.host.last_frame_time = None;
        app.game
            .start_game(mode, difficulty, &mut app.host)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn restart(&self) -> Result<(), JsValue> {
        let mut guard = self.app.borrow_mut();
        let app = &mut *guard;
        app.host.last_frame_time = None;
        app.game
            .restart(&mut app.host)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn pause(&self) -> bool {
        let mut guard = self.app.borrow_mut();
        let app = &mut *guard;
        app.game.pause(&mut app.host)
    }

    pub fn resume(&self) -> bool {
        let mut guard = self.app.borrow_mut();
        let app = &mut *guard;
        app.host.last_frame_time = None;
        app.game.resume(&mut app.host)
    }

    #[wasm_bindgen(js_name = returnToMenu)]
    pub fn return_to_menu(&self) {
        let mut guard = self.app.borrow_mut();
        let app = &mut *guard;
        app.game.return_to_menu(&mut app.host);
        app.host.draw(&[]);
    }

    pub fn score(&self) -> u32 {
        self.app.borrow().game.score()
    }

    #[wasm_bindgen(js_name = timeRemaining)]
    pub fn time_remaining(&self) -> u32 {
        self.app.borrow().game.time_remaining()
    }

    pub fn lives(&self) -> u8 {
        self.app.borrow().game.lives()
    }

    pub fn combo(&self) -> u32 {
        self.app.borrow().game.combo()
    }

    #[wasm_bindgen(js_name = maxCombo)]
    pub fn max_combo(&self) -> u32 {
        self.app.borrow().game.max_combo()
    }

    #[wasm_bindgen(js_name = comboBonus)]
    pub fn combo_bonus(&self) -> bool {
        self.app.borrow().game.combo_bonus_active()
    }

    pub fn phase(&self) -> String {
        match self.app.borrow().game.phase() {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::Paused => "paused",
            GamePhase::Over => "over",
        }
        .to_string()
    }

    #[wasm_bindgen(js_name = endReason)]
    pub fn end_reason(&self) -> String {
        match self.app.borrow().game.end_reason() {
            EndReason::None => "none",
            EndReason::TimeExpired => "timeExpired",
            EndReason::LivesExhausted => "livesExhausted",
        }
        .to_string()
    }
}

fn setup_input_handlers(
    window: &Window,
    canvas: &HtmlCanvasElement,
    app: Weak<RefCell<WebApp>>,
) -> Result<(), JsValue> {
    // Click - hit test in canvas pixels (CSS may scale the element)
    {
        let app = app.clone();
        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(app) = app.upgrade() else {
                return;
            };
            let rect = canvas_clone.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            let sx = canvas_clone.width() as f64 / rect.width();
            let sy = canvas_clone.height() as f64 / rect.height();
            let x = (event.client_x() as f64 - rect.left()) * sx;
            let y = (event.client_y() as f64 - rect.top()) * sy;

            if let Ok(mut guard) = app.try_borrow_mut() {
                guard.game.handle_pointer_down(x as f32, y as f32);
            }
        });
        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Keyboard - Space pauses
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.code() != "Space" {
                return;
            }
            let Some(app) = app.upgrade() else {
                return;
            };
            if let Ok(mut guard) = app.try_borrow_mut() {
                let app = &mut *guard;
                if app.game.phase() == GamePhase::Playing {
                    event.prevent_default();
                    app.game.pause(&mut app.host);
                }
            }
        });
        window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

/// Logging and panic reporting for the wasm build
#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&JsValue::from_str("logger already initialized"));
    }
    log::info!("Dot Hunter loaded");
}
