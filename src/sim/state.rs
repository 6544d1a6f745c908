//! Game state and core simulation types
//!
//! Everything a run needs lives in [`GameState`]; there is no process-wide
//! shared state. The playfield is passed in explicitly and replaced on resize.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::DeathCause;
use super::flyer::{Flyer, ImpulseOutcome};
use super::hazard::HazardCatalog;
use super::stream::GateStream;
use crate::error::ConfigError;
use crate::tuning::{GateTuning, Tuning};

/// Playable area in screen units (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
    /// Height of the kill-floor strip at the bottom
    pub floor_height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32, floor_height: f32) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(ConfigError::InvalidPlayfield { width, height });
        }
        if !floor_height.is_finite() || floor_height < 0.0 || floor_height >= height {
            return Err(ConfigError::InvalidFloor {
                floor: floor_height,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            floor_height,
        })
    }

    /// Top edge of the kill-floor
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.height - self.floor_height
    }

    #[inline]
    pub fn gate_width(&self, tuning: &GateTuning) -> f32 {
        self.width * tuning.width_fraction
    }

    #[inline]
    pub fn gap_size(&self, tuning: &GateTuning) -> f32 {
        self.height * tuning.gap_fraction
    }

    #[inline]
    pub fn gate_speed(&self, tuning: &GateTuning) -> f32 {
        self.width * tuning.speed_fraction
    }

    /// Horizontal distance between consecutive gates
    #[inline]
    pub fn gate_spacing(&self, tuning: &GateTuning) -> f32 {
        self.width * tuning.spacing_fraction
    }

    /// Range of gap-center y positions a new gate may spawn with
    pub fn spawn_band(&self, tuning: &GateTuning) -> Result<(f32, f32), ConfigError> {
        let margin = self.height * tuning.spawn_margin_fraction;
        let min = margin;
        let max = self.floor_y() - margin;
        if min >= max {
            return Err(ConfigError::EmptySpawnBand { min, max });
        }
        Ok((min, max))
    }

    /// Check everything gate generation needs from this playfield
    pub fn validate_for(&self, tuning: &GateTuning) -> Result<(), ConfigError> {
        self.spawn_band(tuning)?;
        let gap = self.gap_size(tuning);
        if tuning.snap_close_min_gap >= gap {
            return Err(ConfigError::SnapGapTooLarge {
                min_gap: tuning.snap_close_min_gap,
                gap,
            });
        }
        Ok(())
    }
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Hovering, waiting for the first impulse
    Waiting,
    /// Active gameplay
    Playing,
    /// Flyer died; falls to the floor, gates are frozen
    Dead,
}

/// Events emitted by the simulation for the outer layers (audio, UI)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted,
    Impulse(ImpulseOutcome),
    GatePassed { score: u32 },
    Died { cause: DeathCause, score: u32 },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub catalog: HazardCatalog,
    pub playfield: Playfield,
    pub phase: RunPhase,
    pub flyer: Flyer,
    pub stream: GateStream,
    /// Simulation tick counter (reset with the run)
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(seed: u64, tuning: Tuning, playfield: Playfield) -> Result<Self, ConfigError> {
        tuning.validate()?;
        playfield.validate_for(&tuning.gate)?;

        log::info!(
            "New run: seed={seed} playfield={}x{} floor={}",
            playfield.width,
            playfield.height,
            playfield.floor_height
        );

        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            catalog: HazardCatalog::new(tuning.chaos.clone()),
            flyer: Flyer::new(playfield, tuning.flyer.clone()),
            stream: GateStream::new(playfield, tuning.gate.clone()),
            tuning,
            playfield,
            phase: RunPhase::Waiting,
            time_ticks: 0,
            events: Vec::new(),
        })
    }

    /// Current score
    pub fn score(&self) -> u32 {
        self.flyer.score
    }

    /// Leave the waiting phase
    pub fn start_run(&mut self) {
        if self.phase != RunPhase::Waiting {
            return;
        }
        self.phase = RunPhase::Playing;
        self.flyer.reroll_hazards(&self.catalog, &mut self.rng);
        self.events.push(GameEvent::RunStarted);
        log::info!("Run started");
    }

    /// Back to the waiting phase with every timer and hazard cleared.
    ///
    /// The RNG keeps its stream so consecutive runs differ.
    pub fn reset(&mut self) {
        self.stream.reset();
        self.flyer.reset();
        self.phase = RunPhase::Waiting;
        self.time_ticks = 0;
        self.events.clear();
        log::info!("Run reset");
    }

    /// Apply new playfield dimensions; safe mid-run
    pub fn resize(&mut self, playfield: Playfield) -> Result<(), ConfigError> {
        playfield.validate_for(&self.tuning.gate)?;

        self.stream.resize(playfield);
        self.flyer.resize(playfield);
        self.playfield = playfield;

        log::info!("Resized playfield to {}x{}", playfield.width, playfield.height);
        Ok(())
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playfield() -> Playfield {
        Playfield::new(480.0, 800.0, 112.0).unwrap()
    }

    #[test]
    fn test_playfield_rejects_bad_dimensions() {
        assert!(matches!(
            Playfield::new(0.0, 800.0, 10.0),
            Err(ConfigError::InvalidPlayfield { .. })
        ));
        assert!(matches!(
            Playfield::new(480.0, f32::NAN, 10.0),
            Err(ConfigError::InvalidPlayfield { .. })
        ));
        assert!(matches!(
            Playfield::new(480.0, 800.0, 800.0),
            Err(ConfigError::InvalidFloor { .. })
        ));
        assert!(matches!(
            Playfield::new(480.0, 800.0, -1.0),
            Err(ConfigError::InvalidFloor { .. })
        ));
    }

    #[test]
    fn test_spawn_band() {
        let tuning = GateTuning::default();
        let (min, max) = playfield().spawn_band(&tuning).unwrap();
        assert!((min - 120.0).abs() < 1e-3);
        assert!((max - (688.0 - 120.0)).abs() < 1e-3);
    }

    #[test]
    fn test_empty_spawn_band_is_an_error() {
        // Floor eats almost the whole playfield
        let pf = Playfield::new(480.0, 800.0, 600.0).unwrap();
        assert!(matches!(
            pf.spawn_band(&GateTuning::default()),
            Err(ConfigError::EmptySpawnBand { .. })
        ));
        assert!(GameState::new(1, Tuning::default(), pf).is_err());
    }

    #[test]
    fn test_snap_gap_must_fit() {
        let mut tuning = Tuning::default();
        tuning.gate.snap_close_min_gap = 1000.0;
        let result = GameState::new(1, tuning, playfield());
        assert!(matches!(result, Err(ConfigError::SnapGapTooLarge { .. })));
    }

    #[test]
    fn test_new_state_is_waiting() {
        let state = GameState::new(12345, Tuning::default(), playfield()).unwrap();
        assert_eq!(state.phase, RunPhase::Waiting);
        assert_eq!(state.score(), 0);
        assert!(state.stream.gates().is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_start_run_once() {
        let mut state = GameState::new(1, Tuning::default(), playfield()).unwrap();
        state.start_run();
        state.start_run();
        assert_eq!(state.phase, RunPhase::Playing);
        assert_eq!(state.drain_events(), vec![GameEvent::RunStarted]);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_resize_rejects_invalid_and_keeps_old() {
        let mut state = GameState::new(1, Tuning::default(), playfield()).unwrap();
        let tiny = Playfield::new(480.0, 800.0, 700.0).unwrap();
        assert!(state.resize(tiny).is_err());
        assert_eq!(state.playfield, playfield());

        let big = Playfield::new(960.0, 1600.0, 224.0).unwrap();
        state.resize(big).unwrap();
        assert_eq!(state.playfield, big);
    }
}
