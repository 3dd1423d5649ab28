//! Dot Hunter entry point
//!
//! The browser build is a library (`WebGame`, see `platform::web`). Natively
//! this binary plays a headless session on a virtual clock with a simple bot
//! and prints the result.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    log::info!("Dot Hunter (native) starting...");

    if let Err(e) = headless_demo::run(headless_demo::Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless_demo {
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use dot_hunter::consts::{FIELD_HEIGHT, FIELD_WIDTH};
    use dot_hunter::platform::VirtualHost;
    use dot_hunter::sim::{EndReason, GamePhase};
    use dot_hunter::{Difficulty, Game, GameMode, HitOutcome, Tuning};

    /// Bot reaction time
    const BOT_STEP_MS: f64 = 200.0;
    /// Chance a bot click lands
    const BOT_ACCURACY: f64 = 0.85;
    /// Upper bound on virtual time
    const MAX_SESSION_MS: f64 = 10.0 * 60.0 * 1000.0;

    /// play a headless dot hunter session with a bot and print the result
    #[derive(Parser, Debug, Clone)]
    #[command(version, about)]
    pub struct Args {
        /// game mode
        #[arg(value_enum, default_value_t = ModeArg::Hunt)]
        mode: ModeArg,

        /// difficulty level
        #[arg(value_enum, default_value_t = DifficultyArg::Normal)]
        difficulty: DifficultyArg,

        /// JSON file with balance overrides
        #[arg(short, long, value_name = "PATH")]
        tuning: Option<PathBuf>,

        /// RNG seed (defaults to the current time)
        #[arg(short, long)]
        seed: Option<u64>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum ModeArg {
        Hunt,
        Clicker,
    }

    impl From<ModeArg> for GameMode {
        fn from(m: ModeArg) -> Self {
            match m {
                ModeArg::Hunt => GameMode::Hunt,
                ModeArg::Clicker => GameMode::Clicker,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum DifficultyArg {
        Easy,
        Normal,
        Hard,
        #[value(alias = "veryhard")]
        VeryHard,
    }

    impl From<DifficultyArg> for Difficulty {
        fn from(d: DifficultyArg) -> Self {
            match d {
                DifficultyArg::Easy => Difficulty::Easy,
                DifficultyArg::Normal => Difficulty::Normal,
                DifficultyArg::Hard => Difficulty::Hard,
                DifficultyArg::VeryHard => Difficulty::VeryHard,
            }
        }
    }

    pub fn run(args: Args) -> Result<(), String> {
        let mode = GameMode::from(args.mode);
        let difficulty = Difficulty::from(args.difficulty);
        let tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| format!("reading {}: {e}", path.display()))?;
                Tuning::from_json(&json)
                    .map_err(|e| format!("parsing {}: {e}", path.display()))?
            }
            None => Tuning::default(),
        };

        let seed = args.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
        log::info!("Game initialized with seed: {}", seed);

        let mut game = Game::with_tuning(seed, tuning);
        game.set_field_size(FIELD_WIDTH, FIELD_HEIGHT);
        let mut host = VirtualHost::new();
        game.start_game(mode, difficulty, &mut host).map_err(|e| e.to_string())?;

        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5eed);
        let mut clicks = 0u32;
        let mut misses = 0u32;

        while game.phase() == GamePhase::Playing && host.now_ms() < MAX_SESSION_MS {
            host.advance(&mut game, BOT_STEP_MS);
            if game.phase() != GamePhase::Playing {
                break;
            }

            // Go for the target closest to the bottom edge
            let Some(pos) = game
                .targets()
                .iter()
                .filter(|t| !t.is_removed())
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|t| t.pos)
            else {
                continue;
            };

            clicks += 1;
            let (x, y) = if bot.random_bool(BOT_ACCURACY) {
                (pos.x, pos.y)
            } else {
                misses += 1;
                (pos.x + 80.0, pos.y - 80.0)
            };
            if let Some(HitOutcome::Cleared) = game.handle_pointer_down(x, y) {
                log::debug!(
                    "t={:.0}ms score={} combo={}",
                    host.now_ms(),
                    game.score(),
                    game.combo()
                );
            }
        }

        let summary = game.summary();
        let reason = match summary.end_reason {
            EndReason::TimeExpired => "time up",
            EndReason::LivesExhausted => "out of lives",
            EndReason::None => "unfinished",
        };
        println!(
            "{} / {}: score {}, max combo {}, lives left {} ({}), {} clicks ({} wide)",
            mode.as_str(),
            difficulty.as_str(),
            summary.score,
            summary.max_combo,
            summary.lives,
            reason,
            clicks,
            misses
        );
        Ok(())
    }

}
