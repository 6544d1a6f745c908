//! Gauntlet - physics and hazard core of an unfair side-scroller
//!
//! Core modules:
//! - `sim`: Simulation (flyer motion, gates, hazard engine, collisions)
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use tuning::{ChaosTuning, FlyerTuning, GateTuning, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Frame rate the per-frame hazard chances were balanced at
    pub const REFERENCE_HZ: f32 = 60.0;
}

/// Convert a chance balanced per 60 Hz frame into the chance for a tick of `dt` seconds.
///
/// Keeps per-frame hazard rolls independent of the simulation rate.
#[inline]
pub fn chance_per_tick(chance_per_frame: f32, dt: f32) -> f64 {
    let p = chance_per_frame.clamp(0.0, 1.0) as f64;
    let frames = (dt * consts::REFERENCE_HZ).max(0.0) as f64;
    1.0 - (1.0 - p).powf(frames)
}

/// Scale a per-60 Hz-frame multiplicative decay to a tick of `dt` seconds.
#[inline]
pub fn decay_per_tick(factor_per_frame: f32, dt: f32) -> f32 {
    factor_per_frame.powf(dt * consts::REFERENCE_HZ)
}
