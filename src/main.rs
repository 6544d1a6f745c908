//! Gauntlet headless runner
//!
//! Plays one autopilot run at a simulated 60 fps display rate and prints a
//! JSON summary.
//!
//! Usage: `gauntlet [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use serde::Serialize;

    use gauntlet::ConfigError;
    use gauntlet::Tuning;
    use gauntlet::consts::{MAX_SUBSTEPS, SIM_DT};
    use gauntlet::sim::{DeathCause, GameEvent, GameState, Playfield, RunPhase, TickInput, tick};

    /// Simulated display frame time
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up after this many seconds of play
    const MAX_SECONDS: f32 = 600.0;

    #[derive(Debug, Serialize)]
    struct Summary {
        seed: u64,
        score: u32,
        cause: Option<DeathCause>,
        seconds: f32,
        gates_spawned: u32,
        impulses: u32,
    }

    struct Game {
        state: GameState,
        accumulator: f32,
        input: TickInput,
        elapsed: f32,
        impulses: u32,
    }

    impl Game {
        fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
            let playfield = Playfield::new(480.0, 800.0, 112.0)?;
            Ok(Self {
                state: GameState::new(seed, tuning, playfield)?,
                accumulator: 0.0,
                input: TickInput {
                    autopilot: true,
                    ..Default::default()
                },
                elapsed: 0.0,
                impulses: 0,
            })
        }

        /// Run simulation ticks for one display frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.elapsed += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                tick(&mut self.state, &self.input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.state.drain_events() {
                match event {
                    GameEvent::RunStarted => log::info!("Autopilot took off"),
                    GameEvent::Impulse(_) => self.impulses += 1,
                    GameEvent::GatePassed { score } => log::info!("Score {score}"),
                    GameEvent::Died { cause, score } => {
                        log::info!("Died by {cause} at {:.1}s with score {score}", self.elapsed)
                    }
                }
            }
        }

        fn finished(&self) -> bool {
            self.state.phase == RunPhase::Dead || self.elapsed >= MAX_SECONDS
        }

        fn summary(&self) -> Summary {
            Summary {
                seed: self.state.seed,
                score: self.state.score(),
                cause: self.state.flyer.cause_of_death,
                seconds: self.elapsed,
                gates_spawned: self.state.stream.spawn_count(),
                impulses: self.impulses,
            }
        }
    }

    fn load_tuning(path: Option<String>) -> Result<Tuning, ConfigError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(&path)
                    .map_err(|err| ConfigError::Malformed(format!("{path}: {err}")))?;
                Tuning::from_json(&json)
            }
            None => Ok(Tuning::default()),
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let mut args = std::env::args().skip(1);
        let seed = match args.next() {
            Some(arg) => arg
                .parse()
                .map_err(|_| ConfigError::Malformed(format!("invalid seed `{arg}`")))?,
            None => 42,
        };
        let tuning = load_tuning(args.next())?;

        let mut game = Game::new(seed, tuning)?;
        while !game.finished() {
            game.update(FRAME_DT);
        }

        let summary = serde_json::to_string_pretty(&game.summary())?;
        println!("{summary}");
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Gauntlet (native) starting...");

    if let Err(err) = runner::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by the host; there is no native loop on wasm
}
