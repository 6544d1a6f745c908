//! A single gate: a column with an open gap, a base trap and a hazard set
//!
//! All hazard randomness is rolled once in [`Gate::assign_hazards`]; the
//! per-tick logic in [`Gate::advance`] only reads those values, so a gate's
//! behavior is fixed the moment it spawns.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{GapBounds, column_overlap, outside_gap};
use super::hazard::{Hazard, HazardSet, TrapKind, troll_direction};
use super::state::Playfield;
use crate::consts::REFERENCE_HZ;
use crate::decay_per_tick;
use crate::tuning::GateTuning;

/// Invisible hitbox offset horizontally from the visible gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhantomBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

/// One obstacle instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gate {
    /// Spawn order (monotonic per run)
    pub index: u32,
    pub kind: TrapKind,
    pub hazards: HazardSet,
    /// Left edge of the column
    pub x: f32,
    /// Current gap center
    pub gap_y: f32,
    /// Gap center at spawn; drift, teleport and the fake ceiling are anchored here
    pub anchor_y: f32,
    /// Current full gap size
    pub gap: f32,
    /// Gap size before any snap-close
    pub base_gap: f32,
    /// Column width before any shrinking
    pub base_width: f32,
    /// Shrink multiplier applied to `base_width`, in `[shrink_floor, 1]`
    pub width_scale: f32,
    /// Leftward speed (px/s)
    pub speed: f32,
    /// The flyer crossed the center (set once)
    pub passed: bool,
    /// The gate's one-shot hazard has played out
    pub triggered: bool,

    shift_count: u32,
    /// Countdown to the double-troll second shift
    second_shift_in: Option<f32>,
    teleported: bool,
    teleport_offset: f32,
    drift_offset: f32,
    drift_direction: f32,
    snap_progress: f32,
    phantom_offset: f32,
    ceiling_offset: f32,
    shrink_started: bool,
    spawn_delay: f32,
    collision_offset: Vec2,
}

impl Gate {
    pub fn new(
        index: u32,
        kind: TrapKind,
        x: f32,
        gap_y: f32,
        gap: f32,
        width: f32,
        speed: f32,
    ) -> Self {
        Self {
            index,
            kind,
            hazards: HazardSet::new(),
            x,
            gap_y,
            anchor_y: gap_y,
            gap,
            base_gap: gap,
            base_width: width,
            width_scale: 1.0,
            speed,
            passed: false,
            triggered: false,
            shift_count: 0,
            second_shift_in: None,
            teleported: false,
            teleport_offset: 0.0,
            drift_offset: 0.0,
            drift_direction: 1.0,
            snap_progress: 0.0,
            phantom_offset: 0.0,
            ceiling_offset: 0.0,
            shrink_started: false,
            spawn_delay: 0.0,
            collision_offset: Vec2::ZERO,
        }
    }

    /// Create a gate sized for `playfield`
    pub fn spawn(
        index: u32,
        kind: TrapKind,
        x: f32,
        gap_y: f32,
        playfield: &Playfield,
        tuning: &GateTuning,
    ) -> Self {
        Self::new(
            index,
            kind,
            x,
            gap_y,
            playfield.gap_size(tuning),
            playfield.gate_width(tuning),
            playfield.gate_speed(tuning),
        )
    }

    /// Attach the hazard set and pre-roll every hazard-specific random value
    pub fn assign_hazards<R: Rng + ?Sized>(
        &mut self,
        hazards: HazardSet,
        tuning: &GateTuning,
        rng: &mut R,
    ) {
        self.hazards = hazards;

        if self.has(Hazard::GapDrift) {
            self.drift_direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        }

        if self.has(Hazard::GapTeleport) {
            self.teleport_offset = (rng.random::<f32>() - 0.5) * tuning.teleport_distance * 2.0;
        }

        if self.has(Hazard::CollisionShift) {
            self.collision_offset = Vec2::new(
                (rng.random::<f32>() - 0.5) * tuning.collision_offset_x,
                (rng.random::<f32>() - 0.5) * tuning.collision_offset_y,
            );
        }

        if self.has(Hazard::Phantom) {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let distance = rng.random_range(tuning.phantom_offset_min..=tuning.phantom_offset_max);
            self.phantom_offset = sign * distance;
        }

        if self.has(Hazard::FakeCeiling) {
            self.ceiling_offset = -self.base_gap * tuning.ceiling_fraction;
        }

        if self.has(Hazard::LateSpawn) {
            self.spawn_delay = rng.random_range(tuning.late_spawn_min..=tuning.late_spawn_max);
        }

        log::debug!(
            "Gate {} kind={:?} hazards={:?}",
            self.index,
            self.kind,
            self.hazards
        );
    }

    #[inline]
    pub fn has(&self, hazard: Hazard) -> bool {
        self.hazards.contains(hazard)
    }

    /// Current column width (shrinking gates narrow over time)
    #[inline]
    pub fn width(&self) -> f32 {
        self.base_width * self.width_scale
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width()
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width() / 2.0
    }

    pub fn shift_count(&self) -> u32 {
        self.shift_count
    }

    pub fn drift_offset(&self) -> f32 {
        self.drift_offset
    }

    pub fn snap_progress(&self) -> f32 {
        self.snap_progress
    }

    pub fn collision_offset(&self) -> Vec2 {
        self.collision_offset
    }

    /// Still held back by a late spawn
    pub fn is_delayed(&self) -> bool {
        self.spawn_delay > 0.0
    }

    /// Is the flyer in the narrow window just before the column?
    #[inline]
    pub fn in_late_trigger_window(&self, flyer_x: f32, distance: f32) -> bool {
        flyer_x >= self.x - distance && flyer_x < self.x
    }

    /// Advance the gate by `dt` seconds given the flyer's horizontal position
    pub fn advance(&mut self, dt: f32, flyer_x: f32, late_trigger: f32, tuning: &GateTuning) {
        if self.spawn_delay > 0.0 {
            self.spawn_delay -= dt;
            return;
        }

        self.x -= self.speed * dt;

        if let Some(remaining) = self.second_shift_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.second_shift_in = None;
                if !self.passed {
                    self.troll_shift(tuning);
                }
            } else {
                self.second_shift_in = Some(remaining);
            }
        }

        let in_window = self.in_late_trigger_window(flyer_x, late_trigger);

        if in_window {
            let trolls = self.kind == TrapKind::TrollShift || self.has(Hazard::DoubleTroll);
            if trolls && self.shift_count == 0 {
                self.troll_shift(tuning);
            }

            if self.has(Hazard::GapTeleport) && !self.teleported {
                self.gap_y = self.anchor_y + self.teleport_offset;
                self.teleported = true;
            }

            if self.kind == TrapKind::SnapClose {
                self.snap_close(dt, tuning);
            }
        }

        if in_window && self.has(Hazard::GapDrift) {
            self.drift(dt, tuning);
        }

        if self.has(Hazard::Shrinking) {
            if in_window {
                self.shrink_started = true;
            }
            if self.shrink_started && self.width_scale > tuning.shrink_floor {
                self.width_scale =
                    (self.width_scale * decay_per_tick(tuning.shrink_factor, dt)).max(tuning.shrink_floor);
            }
        }
    }

    fn troll_shift(&mut self, tuning: &GateTuning) {
        let double = self.has(Hazard::DoubleTroll);
        if double && self.shift_count >= tuning.max_shifts {
            return;
        }
        if !double && self.shift_count >= 1 {
            return;
        }

        let direction = troll_direction(self.index.wrapping_add(self.shift_count));
        let alternate = if self.shift_count.is_multiple_of(2) { 1.0 } else { -1.0 };
        self.gap_y += tuning.troll_shift_distance * direction * alternate;
        self.shift_count += 1;

        if double && self.shift_count == 1 {
            self.second_shift_in = Some(tuning.double_troll_delay);
        }
    }

    fn snap_close(&mut self, dt: f32, tuning: &GateTuning) {
        if self.snap_progress >= 1.0 {
            return;
        }

        self.snap_progress = (self.snap_progress + dt / tuning.snap_close_duration).min(1.0);
        self.gap = self.snapped_gap(tuning);

        if self.snap_progress >= 1.0 {
            self.triggered = true;
        }
    }

    fn snapped_gap(&self, tuning: &GateTuning) -> f32 {
        let min_gap = tuning.snap_close_min_gap.min(self.base_gap);
        self.base_gap - (self.base_gap - min_gap) * self.snap_progress
    }

    fn drift(&mut self, dt: f32, tuning: &GateTuning) {
        let bound = tuning.drift_bound;
        self.drift_offset =
            (self.drift_offset + self.drift_direction * tuning.drift_speed * dt).clamp(-bound, bound);

        // Reverse at the bound
        if self.drift_offset.abs() >= bound {
            self.drift_direction = -self.drift_offset.signum();
        }

        self.gap_y = self.anchor_y + self.drift_offset;
    }

    /// Gap geometry as the flyer's collision test must see it right now
    pub fn effective_gap_bounds(&self) -> GapBounds {
        let center = self.gap_y + self.collision_offset.y;

        if self.kind == TrapKind::FakeGap {
            return GapBounds {
                top: center,
                bottom: center,
                is_solid: true,
                has_ceiling: false,
                ceiling_y: 0.0,
            };
        }

        let half = self.gap / 2.0;
        GapBounds {
            top: center - half,
            bottom: center + half,
            is_solid: false,
            has_ceiling: self.has(Hazard::FakeCeiling),
            ceiling_y: self.anchor_y + self.ceiling_offset,
        }
    }

    /// Bait gates look real but never collide
    #[inline]
    pub fn has_collision(&self) -> bool {
        !self.has(Hazard::Bait)
    }

    /// Eviction predicate: the right edge is fully off the left of the playfield
    #[inline]
    pub fn is_past_playfield(&self) -> bool {
        self.x + self.width() < 0.0
    }

    /// Reopen a snap-closed gate once it has been passed
    pub fn reset_after_pass(&mut self) {
        if self.kind == TrapKind::SnapClose {
            self.gap = self.base_gap;
            self.snap_progress = 0.0;
            self.triggered = false;
        }
    }

    /// Hidden hitbox, if this gate has a phantom
    pub fn phantom_bounds(&self) -> Option<PhantomBounds> {
        if !self.has(Hazard::Phantom) {
            return None;
        }

        let center = self.center_x() + self.phantom_offset;
        let half_w = self.width() / 2.0;
        let half_gap = self.gap / 2.0;
        Some(PhantomBounds {
            left: center - half_w,
            right: center + half_w,
            top: self.gap_y - half_gap,
            bottom: self.gap_y + half_gap,
        })
    }

    /// Does a body at (`x`, `y`) with `reach` and `half_h` touch the phantom hitbox?
    pub fn phantom_hit(&self, x: f32, y: f32, reach: f32, half_h: f32) -> bool {
        let Some(b) = self.phantom_bounds() else {
            return false;
        };

        if ![b.left, b.right, b.top, b.bottom].iter().all(|v| v.is_finite()) {
            log::warn!("Gate {} phantom hitbox is not finite, skipping", self.index);
            return false;
        }

        column_overlap(b.left, b.right, x, reach) && outside_gap(y, half_h, b.top, b.bottom)
    }

    /// Is a body at (`x`, `y`) inside the gap of a reverse-zone gate?
    pub fn is_in_reverse_zone(&self, x: f32, y: f32, reach: f32) -> bool {
        if self.kind != TrapKind::ReverseZone {
            return false;
        }

        let center = self.center_x() + self.collision_offset.x;
        let half_w = self.width() / 2.0;
        if !column_overlap(center - half_w, center + half_w, x, reach) {
            return false;
        }

        let gap_center = self.gap_y + self.collision_offset.y;
        let half_gap = self.gap / 2.0;
        y >= gap_center - half_gap && y <= gap_center + half_gap
    }

    /// Vertical displacement a magnet gate applies to a body at (`x`, `y`) this tick
    pub fn magnet_pull(&self, x: f32, y: f32, dt: f32, tuning: &GateTuning) -> f32 {
        if !self.has(Hazard::Magnet) || self.is_delayed() {
            return 0.0;
        }

        let distance = (self.center_x() - x).abs();
        if distance >= tuning.magnet_range {
            return 0.0;
        }

        let strength = (tuning.magnet_range - distance) / tuning.magnet_range;
        let pull = strength * tuning.magnet_pull * dt * REFERENCE_HZ;
        let to_gap = self.gap_y - y;
        // Never pull past the gap center
        pull.min(to_gap.abs()) * to_gap.signum()
    }

    /// Render hint: how visible the gate is to the player (0 = hidden)
    pub fn opacity(&self, flyer_x: f32, tuning: &GateTuning) -> f32 {
        if self.is_delayed() {
            return 0.0;
        }
        if self.has(Hazard::Invisible) {
            let distance = (self.center_x() - flyer_x).abs();
            if distance > tuning.invisible_reveal_distance {
                return 0.0;
            }
            return tuning.invisible_opacity;
        }
        1.0
    }

    /// Rescale position and size proportionally to a new playfield
    pub fn resize(&mut self, from: &Playfield, to: &Playfield, tuning: &GateTuning) {
        let sx = to.width / from.width;
        let sy = to.height / from.height;

        self.x *= sx;
        self.gap_y *= sy;
        self.anchor_y *= sy;
        // The drift bound is in pixels and does not scale with the playfield
        let scaled = self.drift_offset * sy;
        self.drift_offset = scaled.clamp(-tuning.drift_bound, tuning.drift_bound);
        self.gap_y += self.drift_offset - scaled;
        self.teleport_offset *= sy;
        self.phantom_offset *= sx;
        self.collision_offset *= Vec2::new(sx, sy);

        self.base_width = to.gate_width(tuning);
        self.base_gap = to.gap_size(tuning);
        self.speed = to.gate_speed(tuning);
        if self.has(Hazard::FakeCeiling) {
            self.ceiling_offset = -self.base_gap * tuning.ceiling_fraction;
        }
        self.gap = self.snapped_gap(tuning);
    }
}
