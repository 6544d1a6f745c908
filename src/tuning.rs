//! Gameplay tuning
//!
//! Every balance number of the simulation lives here. Values sized by the
//! playfield are stored as fractions of its width or height; hazard
//! distances are in pixels and durations in seconds. Per-frame chances are
//! balanced at 60 Hz and converted with [`crate::chance_per_tick`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Flyer motion and flyer-hazard tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyerTuning {
    // === Body ===
    /// Horizontal resting position (fraction of playfield width)
    pub x_fraction: f32,
    /// Collision half-height (fraction of playfield height)
    pub half_height_fraction: f32,
    /// Half-width / half-height ratio of the body
    pub aspect: f32,

    // === Motion ===
    /// Upward speed set by an impulse (fraction of height per second)
    pub impulse_fraction: f32,
    /// Downward acceleration (fraction of height per second²)
    pub gravity_fraction: f32,
    /// Fastest upward speed (fraction of height per second)
    pub max_rise_fraction: f32,
    /// Terminal falling speed (fraction of height per second)
    pub max_fall_fraction: f32,
    /// Rotation clamp in degrees
    pub min_rotation: f32,
    pub max_rotation: f32,
    /// Rotation rates (degrees per 1/48 s) while rising and falling
    pub rotation_up_rate: f32,
    pub rotation_down_rate: f32,

    // === Waiting phase ===
    /// Idle bob center (fraction of height), frequency (Hz) and amplitude (px)
    pub hover_y_fraction: f32,
    pub hover_frequency: f32,
    pub hover_amplitude: f32,

    // === Flyer hazards ===
    /// Input lag: chance an impulse is swallowed
    pub input_lag_drop_chance: f32,
    /// Flap delay window (seconds)
    pub flap_delay_min: f32,
    pub flap_delay_max: f32,
    /// Flap random impulse multiplier range
    pub flap_random_min: f32,
    pub flap_random_max: f32,
    /// Air burst: per-frame start chance, duration, lift and gravity multipliers
    pub air_burst_start_chance: f32,
    pub air_burst_duration: f32,
    pub air_burst_lift: f32,
    pub air_burst_gravity: f32,
    /// Sudden drop: per-frame chance, spike (fraction of height per second), cooldown
    pub sudden_drop_chance: f32,
    pub sudden_drop_fraction: f32,
    pub sudden_drop_cooldown: f32,
    /// Gravity shift: per-frame reroll chance and multiplier range
    pub gravity_shift_chance: f32,
    pub gravity_shift_min: f32,
    pub gravity_shift_max: f32,
    /// Wind gust: per-frame start chance, max force (px/s) and duration range
    pub wind_start_chance: f32,
    pub wind_max_force: f32,
    pub wind_min_duration: f32,
    pub wind_max_duration: f32,
}

impl Default for FlyerTuning {
    fn default() -> Self {
        Self {
            x_fraction: 0.3,
            half_height_fraction: 0.025,
            aspect: 1.417,

            impulse_fraction: 0.55,
            gravity_fraction: 1.8,
            max_rise_fraction: 0.8,
            max_fall_fraction: 0.793,
            min_rotation: -20.0,
            max_rotation: 90.0,
            rotation_up_rate: 7.2,
            rotation_down_rate: 6.5,

            hover_y_fraction: 0.48,
            hover_frequency: 1.0,
            hover_amplitude: 6.0,

            input_lag_drop_chance: 0.35,
            flap_delay_min: 0.05,
            flap_delay_max: 0.12,
            flap_random_min: 0.7,
            flap_random_max: 1.3,
            air_burst_start_chance: 0.1,
            air_burst_duration: 5.0,
            air_burst_lift: 0.6,
            air_burst_gravity: 1.5,
            sudden_drop_chance: 0.15,
            sudden_drop_fraction: 0.8,
            sudden_drop_cooldown: 0.5,
            gravity_shift_chance: 0.08,
            gravity_shift_min: 0.3,
            gravity_shift_max: 2.3,
            wind_start_chance: 0.1,
            wind_max_force: 75.0,
            wind_min_duration: 2.0,
            wind_max_duration: 5.0,
        }
    }
}

/// Gate geometry and pipe-hazard tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateTuning {
    // === Geometry ===
    /// Scroll speed (fraction of width per second)
    pub speed_fraction: f32,
    /// Gate width (fraction of width)
    pub width_fraction: f32,
    /// Full gap size (fraction of height)
    pub gap_fraction: f32,
    /// Horizontal distance between consecutive gates (fraction of width)
    pub spacing_fraction: f32,
    /// Minimum distance of a gap center from the top and from the floor (fraction of height)
    pub spawn_margin_fraction: f32,

    // === Troll shift ===
    pub troll_shift_distance: f32,
    pub max_shifts: u32,
    /// Delay before the double-troll second shift (seconds)
    pub double_troll_delay: f32,

    // === Gap motion ===
    pub teleport_distance: f32,
    pub drift_speed: f32,
    pub drift_bound: f32,

    // === Snap close ===
    pub snap_close_duration: f32,
    /// Hard minimum gap a snapping gate can reach (px)
    pub snap_close_min_gap: f32,

    // === Shrinking gate ===
    /// Width multiplier applied per 60 Hz frame
    pub shrink_factor: f32,
    /// Smallest width as a fraction of the unshrunk width
    pub shrink_floor: f32,

    // === Pre-rolled offsets ===
    /// Full spread of the collision offset on each axis (px)
    pub collision_offset_x: f32,
    pub collision_offset_y: f32,
    /// Phantom hitbox horizontal distance range (px)
    pub phantom_offset_min: f32,
    pub phantom_offset_max: f32,
    /// Fake ceiling distance above the gap center (fraction of gap size)
    pub ceiling_fraction: f32,
    /// Late spawn delay range (seconds)
    pub late_spawn_min: f32,
    pub late_spawn_max: f32,

    // === Magnet ===
    /// Horizontal reach of the pull (px) and strongest pull (px per 60 Hz frame)
    pub magnet_range: f32,
    pub magnet_pull: f32,

    // === Invisible gate (render hint) ===
    pub invisible_reveal_distance: f32,
    pub invisible_opacity: f32,
}

impl Default for GateTuning {
    fn default() -> Self {
        Self {
            speed_fraction: 0.26,
            width_fraction: 0.18,
            gap_fraction: 0.2,
            spacing_fraction: 0.52,
            spawn_margin_fraction: 0.15,

            troll_shift_distance: 90.0,
            max_shifts: 3,
            double_troll_delay: 0.15,

            teleport_distance: 120.0,
            drift_speed: 70.0,
            drift_bound: 50.0,

            snap_close_duration: 0.08,
            snap_close_min_gap: 5.0,

            shrink_factor: 0.98,
            shrink_floor: 0.4,

            collision_offset_x: 30.0,
            collision_offset_y: 40.0,
            phantom_offset_min: 30.0,
            phantom_offset_max: 70.0,
            ceiling_fraction: 0.3,
            late_spawn_min: 0.05,
            late_spawn_max: 0.15,

            magnet_range: 150.0,
            magnet_pull: 3.0,

            invisible_reveal_distance: 60.0,
            invisible_opacity: 0.15,
        }
    }
}

/// Weights of the base trap kinds outside the mercy window
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapWeights {
    pub reverse_zone: f32,
    pub snap_close: f32,
    pub fake_gap: f32,
    pub troll_shift: f32,
    pub normal: f32,
}

impl Default for TrapWeights {
    fn default() -> Self {
        Self {
            reverse_zone: 0.25,
            snap_close: 0.25,
            fake_gap: 0.25,
            troll_shift: 0.15,
            normal: 0.10,
        }
    }
}

/// Hazard selection tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosTuning {
    /// Gates below this spawn index are always plain
    pub mercy_gates: u32,
    /// Gates up to this index carry at most one hazard
    pub single_event_until: u32,
    /// From this index the full count table applies
    pub full_chaos_start: u32,
    /// Chance of one hazard before full chaos
    pub single_event_chance: f32,
    /// Chance of two hazards between `single_event_until` and `full_chaos_start`
    pub double_event_chance: f32,
    /// Weights for 0, 1, 2, ... simultaneous hazards once full chaos starts;
    /// the last entry also covers every larger count up to the catalog size
    pub count_weights: Vec<f32>,
    /// Chance the flyer receives a hazard on each pass
    pub flyer_hazard_chance: f32,
    /// Late-trigger window in front of a gate (px)
    pub late_trigger_distance: f32,
    /// Longest a triggered hazard may take to play out (seconds)
    pub max_reaction_time: f32,
    pub trap_weights: TrapWeights,
}

impl Default for ChaosTuning {
    fn default() -> Self {
        Self {
            mercy_gates: 3,
            single_event_until: 10,
            full_chaos_start: 20,
            single_event_chance: 0.5,
            double_event_chance: 0.2,
            count_weights: vec![0.4, 0.4, 0.15, 0.05, 0.0],
            flyer_hazard_chance: 0.2,
            late_trigger_distance: 100.0,
            max_reaction_time: 0.5,
            trap_weights: TrapWeights::default(),
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub flyer: FlyerTuning,
    pub gate: GateTuning,
    pub chaos: ChaosTuning,
}

impl Tuning {
    /// Parse tuning from JSON (missing fields fall back to defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every contract the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.flyer;
        let g = &self.gate;
        let c = &self.chaos;

        for (name, value) in [
            ("flyer.half_height_fraction", f.half_height_fraction),
            ("flyer.aspect", f.aspect),
            ("flyer.impulse_fraction", f.impulse_fraction),
            ("flyer.gravity_fraction", f.gravity_fraction),
            ("flyer.max_fall_fraction", f.max_fall_fraction),
            ("flyer.max_rise_fraction", f.max_rise_fraction),
            ("gate.speed_fraction", g.speed_fraction),
            ("gate.width_fraction", g.width_fraction),
            ("gate.gap_fraction", g.gap_fraction),
            ("gate.spacing_fraction", g.spacing_fraction),
            ("gate.snap_close_duration", g.snap_close_duration),
            ("gate.snap_close_min_gap", g.snap_close_min_gap),
            ("gate.drift_bound", g.drift_bound),
            ("gate.troll_shift_distance", g.troll_shift_distance),
            ("gate.teleport_distance", g.teleport_distance),
            ("gate.drift_speed", g.drift_speed),
            ("gate.double_troll_delay", g.double_troll_delay),
            ("gate.magnet_range", g.magnet_range),
            ("flyer.wind_max_force", f.wind_max_force),
            ("chaos.late_trigger_distance", c.late_trigger_distance),
            ("chaos.max_reaction_time", c.max_reaction_time),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        for (name, min, max) in [
            ("flyer.rotation", f.min_rotation, f.max_rotation),
            ("flyer.flap_delay", f.flap_delay_min, f.flap_delay_max),
            ("flyer.flap_random", f.flap_random_min, f.flap_random_max),
            ("flyer.gravity_shift", f.gravity_shift_min, f.gravity_shift_max),
            ("flyer.wind_duration", f.wind_min_duration, f.wind_max_duration),
            ("gate.phantom_offset", g.phantom_offset_min, g.phantom_offset_max),
            ("gate.late_spawn", g.late_spawn_min, g.late_spawn_max),
        ] {
            // Uniform sampling needs finite bounds
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(ConfigError::InvertedRange { name, min, max });
            }
        }

        for (name, value) in [
            ("flyer.input_lag_drop_chance", f.input_lag_drop_chance),
            ("flyer.air_burst_start_chance", f.air_burst_start_chance),
            ("flyer.sudden_drop_chance", f.sudden_drop_chance),
            ("flyer.gravity_shift_chance", f.gravity_shift_chance),
            ("flyer.wind_start_chance", f.wind_start_chance),
            ("gate.shrink_factor", g.shrink_factor),
            ("gate.shrink_floor", g.shrink_floor),
            ("gate.invisible_opacity", g.invisible_opacity),
            ("chaos.single_event_chance", c.single_event_chance),
            ("chaos.double_event_chance", c.double_event_chance),
            ("chaos.flyer_hazard_chance", c.flyer_hazard_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if c.single_event_chance + c.double_event_chance > 1.0 {
            return Err(ConfigError::InvalidProbability {
                name: "chaos.single_event_chance + chaos.double_event_chance",
                value: c.single_event_chance + c.double_event_chance,
            });
        }

        // The spawn band [margin, 1 - margin] must not collapse even with no floor
        let margin = g.spawn_margin_fraction;
        if !(0.0..0.5).contains(&margin) {
            return Err(ConfigError::EmptySpawnBand {
                min: margin,
                max: 1.0 - margin,
            });
        }

        let w = &c.trap_weights;
        for (name, value) in [
            ("chaos.trap_weights.reverse_zone", w.reverse_zone),
            ("chaos.trap_weights.snap_close", w.snap_close),
            ("chaos.trap_weights.fake_gap", w.fake_gap),
            ("chaos.trap_weights.troll_shift", w.troll_shift),
            ("chaos.trap_weights.normal", w.normal),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if c.count_weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || c.count_weights.iter().sum::<f32>() <= 0.0
        {
            return Err(ConfigError::EmptyCountWeights);
        }

        if g.snap_close_duration > c.max_reaction_time {
            return Err(ConfigError::SnapTooSlow {
                duration: g.snap_close_duration,
                max: c.max_reaction_time,
            });
        }

        Ok(())
    }
}
