//! Configuration errors
//!
//! The simulation itself has no recoverable failures. Everything here is a
//! startup-time (or resize-time) contract violation.

/// Invalid tuning or playfield configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed tuning data: {0}")]
    Malformed(String),
    #[error("Playfield dimensions must be finite and positive: width={width}, height={height}")]
    InvalidPlayfield { width: f32, height: f32 },
    #[error("Floor height {floor} must be in [0, {height})")]
    InvalidFloor { floor: f32, height: f32 },
    #[error("Gap spawn band is empty: minimum {min} >= maximum {max}")]
    EmptySpawnBand { min: f32, max: f32 },
    #[error("Snap-close minimum gap {min_gap} must be below the gap size {gap}")]
    SnapGapTooLarge { min_gap: f32, gap: f32 },
    #[error("Range `{name}` is inverted: {min} > {max}")]
    InvertedRange { name: &'static str, min: f32, max: f32 },
    #[error("Probability `{name}` out of [0, 1]: {value}")]
    InvalidProbability { name: &'static str, value: f32 },
    #[error("Value `{name}` must be finite and positive: {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("Hazard count weights must contain at least one positive weight")]
    EmptyCountWeights,
    #[error("Snap-close duration {duration}s exceeds the maximum reaction time {max}s")]
    SnapTooSlow { duration: f32, max: f32 },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Malformed(err.to_string())
    }
}
