//! The player-controlled flyer
//!
//! Motion integration, impulse handling under flyer hazards, and the
//! death/pass detection against the gate stream.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{DeathCause, horizontal_reach, rotated_half_extents};
use super::gate::Gate;
use super::hazard::{Hazard, HazardCatalog, HazardSet};
use super::state::Playfield;
use crate::chance_per_tick;
use crate::tuning::FlyerTuning;

/// Independent status flags (alive and grounded can both be true)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlyerStatus {
    pub alive: bool,
    /// The death animation has been started
    pub death_played: bool,
    /// Resting on the floor
    pub grounded: bool,
}

impl Default for FlyerStatus {
    fn default() -> Self {
        Self {
            alive: true,
            death_played: false,
            grounded: false,
        }
    }
}

/// What happened to an impulse request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpulseOutcome {
    /// Velocity was set
    Applied,
    /// Queued by flap delay
    Deferred,
    /// Swallowed by input lag
    Dropped,
    /// Dead, grounded or above the playfield
    Ignored,
}

/// Receives "a gate was passed" notifications (no payload)
pub trait PassObserver {
    fn on_pass(&mut self);
}

impl<F: FnMut()> PassObserver for F {
    fn on_pass(&mut self) {
        self()
    }
}

/// The player body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flyer {
    /// Body center (screen space, y down)
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees, positive is nose down
    pub rotation: f32,
    pub status: FlyerStatus,
    pub score: u32,
    /// Flyer hazards active until the next pass
    pub hazards: HazardSet,
    pub cause_of_death: Option<DeathCause>,
    /// Unrotated half extents of the body
    pub half_size: Vec2,

    in_reverse_zone: bool,
    /// Height of the last impulse; rotation tilts up while above it
    last_impulse_y: f32,
    /// Remaining flap-delay before a queued impulse fires
    pending_impulse: Option<f32>,
    air_burst_timer: f32,
    sudden_drop_cooldown: f32,
    gravity_multiplier: f32,
    wind_force: f32,
    wind_timer: f32,
    impulse_speed: f32,
    playfield: Playfield,
    tuning: FlyerTuning,
}

impl Flyer {
    pub fn new(playfield: Playfield, tuning: FlyerTuning) -> Self {
        let mut flyer = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            status: FlyerStatus::default(),
            score: 0,
            hazards: HazardSet::new(),
            cause_of_death: None,
            half_size: Vec2::ZERO,
            in_reverse_zone: false,
            last_impulse_y: 0.0,
            pending_impulse: None,
            air_burst_timer: 0.0,
            sudden_drop_cooldown: 0.0,
            gravity_multiplier: 1.0,
            wind_force: 0.0,
            wind_timer: 0.0,
            impulse_speed: 0.0,
            playfield,
            tuning,
        };
        flyer.reset();
        flyer
    }

    /// Restore run defaults in place
    pub fn reset(&mut self) {
        self.apply_scale();
        self.pos = self.rest_position();
        self.vel = Vec2::ZERO;
        self.rotation = 0.0;
        self.status = FlyerStatus::default();
        self.score = 0;
        self.hazards.clear();
        self.cause_of_death = None;
        self.in_reverse_zone = false;
        self.last_impulse_y = self.pos.y;
        self.pending_impulse = None;
        self.air_burst_timer = 0.0;
        self.sudden_drop_cooldown = 0.0;
        self.gravity_multiplier = 1.0;
        self.wind_force = 0.0;
        self.wind_timer = 0.0;
    }

    /// Follow a playfield resize, keeping the position proportional
    pub fn resize(&mut self, playfield: Playfield) {
        let scale = Vec2::new(
            playfield.width / self.playfield.width,
            playfield.height / self.playfield.height,
        );
        self.pos *= scale;
        self.vel.y *= scale.y;
        self.last_impulse_y *= scale.y;
        self.playfield = playfield;
        self.apply_scale();
    }

    fn apply_scale(&mut self) {
        let h = self.playfield.height;
        let half_h = h * self.tuning.half_height_fraction;
        self.half_size = Vec2::new(half_h * self.tuning.aspect, half_h);
        self.impulse_speed = h * self.tuning.impulse_fraction;
    }

    fn rest_position(&self) -> Vec2 {
        Vec2::new(
            self.playfield.width * self.tuning.x_fraction,
            self.playfield.height * self.tuning.hover_y_fraction,
        )
    }

    #[inline]
    pub fn has(&self, hazard: Hazard) -> bool {
        self.hazards.contains(hazard)
    }

    /// Half extents of the rotated body
    pub fn extent(&self) -> Vec2 {
        rotated_half_extents(self.half_size, self.rotation)
    }

    /// Horizontal collision reach of the rotated body
    pub fn reach(&self) -> f32 {
        horizontal_reach(self.extent())
    }

    pub fn touches_floor(&self) -> bool {
        self.pos.y + self.extent().y > self.playfield.floor_y()
    }

    pub fn in_reverse_zone(&self) -> bool {
        self.in_reverse_zone
    }

    pub fn set_reverse_zone(&mut self, inside: bool) {
        self.in_reverse_zone = inside;
    }

    pub fn gravity_multiplier(&self) -> f32 {
        self.gravity_multiplier
    }

    pub fn air_burst_active(&self) -> bool {
        self.air_burst_timer > 0.0
    }

    pub fn wind_active(&self) -> bool {
        self.wind_timer > 0.0
    }

    pub fn has_pending_impulse(&self) -> bool {
        self.pending_impulse.is_some()
    }

    /// Replace the flyer hazards (run start and every pass)
    pub fn reroll_hazards<R: Rng + ?Sized>(&mut self, catalog: &HazardCatalog, rng: &mut R) {
        self.hazards = catalog.pick_flyer_hazards(rng);
        if !self.hazards.is_empty() {
            log::debug!("Flyer hazards: {:?}", self.hazards);
        }
    }

    /// Idle bobbing while waiting for the first input
    pub fn hover(&mut self, time: f32) {
        let t = &self.tuning;
        let phase = time * t.hover_frequency * std::f32::consts::TAU;
        self.pos.y = self.playfield.height * t.hover_y_fraction + phase.sin() * t.hover_amplitude;
        self.last_impulse_y = self.pos.y;
    }

    /// Displace vertically (magnet pull)
    pub fn nudge_vertical(&mut self, dy: f32) {
        if self.status.alive && !self.status.grounded {
            self.pos.y += dy;
        }
    }

    /// Player-initiated upward impulse
    pub fn apply_impulse<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ImpulseOutcome {
        if !self.status.alive || self.status.grounded || self.pos.y < 0.0 {
            return ImpulseOutcome::Ignored;
        }

        if self.has(Hazard::InputLag)
            && rng.random_bool(self.tuning.input_lag_drop_chance.clamp(0.0, 1.0) as f64)
        {
            return ImpulseOutcome::Dropped;
        }

        if self.has(Hazard::FlapDelay) && self.pending_impulse.is_none() {
            let delay = rng.random_range(self.tuning.flap_delay_min..=self.tuning.flap_delay_max);
            self.pending_impulse = Some(delay);
            return ImpulseOutcome::Deferred;
        }

        self.execute_impulse(rng);
        ImpulseOutcome::Applied
    }

    fn execute_impulse<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let t = &self.tuning;
        let mut speed = self.impulse_speed;

        if self.has(Hazard::FlapRandom) {
            speed *= rng.random_range(t.flap_random_min..=t.flap_random_max);
        }
        if self.air_burst_active() {
            speed *= t.air_burst_lift;
        }

        self.vel.y = if self.in_reverse_zone { speed } else { -speed };
        self.last_impulse_y = self.pos.y;
        self.pending_impulse = None;
    }

    /// Advance motion by `dt` seconds
    pub fn integrate<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        if self.status.grounded || self.touches_floor() {
            self.status.grounded = true;
            self.rotate(dt);
            self.pos.y = self.playfield.floor_y() - self.extent().y;
            return;
        }

        if let Some(remaining) = self.pending_impulse {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.execute_impulse(rng);
            } else {
                self.pending_impulse = Some(remaining);
            }
        }

        self.update_hazards(dt, rng);

        let h = self.playfield.height;
        let mut gravity = h * self.tuning.gravity_fraction * self.gravity_multiplier;
        if self.air_burst_active() {
            gravity *= self.tuning.air_burst_gravity;
        }

        self.vel.y += gravity * dt;
        self.vel.y = self
            .vel
            .y
            .clamp(-h * self.tuning.max_rise_fraction, h * self.tuning.max_fall_fraction);
        self.pos.y += self.vel.y * dt;

        self.rotate(dt);
    }

    fn update_hazards<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        let h = self.playfield.height;

        // Sudden drop
        if self.sudden_drop_cooldown > 0.0 {
            self.sudden_drop_cooldown -= dt;
        }
        if self.has(Hazard::SuddenDrop)
            && self.sudden_drop_cooldown <= 0.0
            && rng.random_bool(chance_per_tick(self.tuning.sudden_drop_chance, dt))
        {
            self.vel.y += h * self.tuning.sudden_drop_fraction;
            self.sudden_drop_cooldown = self.tuning.sudden_drop_cooldown;
        }

        // Air burst
        if self.has(Hazard::AirBurst)
            && !self.air_burst_active()
            && rng.random_bool(chance_per_tick(self.tuning.air_burst_start_chance, dt))
        {
            self.air_burst_timer = self.tuning.air_burst_duration;
        } else if self.air_burst_timer > 0.0 {
            self.air_burst_timer -= dt;
        }

        // Gravity shift
        if self.has(Hazard::GravityShift) {
            if rng.random_bool(chance_per_tick(self.tuning.gravity_shift_chance, dt)) {
                self.gravity_multiplier =
                    rng.random_range(self.tuning.gravity_shift_min..=self.tuning.gravity_shift_max);
            }
        } else {
            self.gravity_multiplier = 1.0;
        }

        // Wind gust
        if self.has(Hazard::WindGust) {
            if self.wind_timer <= 0.0
                && rng.random_bool(chance_per_tick(self.tuning.wind_start_chance, dt))
            {
                self.wind_force = (rng.random::<f32>() - 0.5) * 2.0 * self.tuning.wind_max_force;
                self.wind_timer =
                    rng.random_range(self.tuning.wind_min_duration..=self.tuning.wind_max_duration);
            }
            if self.wind_timer > 0.0 {
                self.wind_timer -= dt;
                self.pos.x += self.wind_force * dt;
                let min_x = self.half_size.x;
                let max_x = self.playfield.width - self.half_size.x;
                self.pos.x = self.pos.x.max(min_x).min(max_x);
            }
        }
    }

    /// Nose follows height relative to the last impulse
    fn rotate(&mut self, dt: f32) {
        let t = &self.tuning;
        let rate = if self.pos.y < self.last_impulse_y {
            -t.rotation_up_rate
        } else {
            t.rotation_down_rate
        };
        self.rotation = (self.rotation + rate * dt * 48.0).clamp(t.min_rotation, t.max_rotation);
    }

    fn die(&mut self, cause: DeathCause) {
        if !self.status.alive {
            return;
        }
        self.status.alive = false;
        self.pending_impulse = None;
        self.cause_of_death = Some(cause);
        log::info!("Flyer died ({}) with score {}", cause, self.score);
    }

    /// Mark the death animation as started; true only the first time
    pub fn play_dead(&mut self) -> bool {
        if self.status.death_played {
            return false;
        }
        self.status.death_played = true;
        true
    }

    /// Floor, pass and gate collision detection. Returns true if the flyer is dead.
    ///
    /// Only the nearest relevant gate is examined: bait gates and gates already
    /// behind the flyer are skipped, and the scan stops after the first other
    /// gate whether or not it overlaps.
    pub fn check_collision<R, O>(
        &mut self,
        gates: &mut [Gate],
        catalog: &HazardCatalog,
        rng: &mut R,
        observer: &mut O,
    ) -> bool
    where
        R: Rng + ?Sized,
        O: PassObserver + ?Sized,
    {
        if !self.status.alive {
            return true;
        }

        if self.status.grounded || self.touches_floor() {
            self.die(DeathCause::Floor);
            return true;
        }

        let extent = self.extent();
        let reach = horizontal_reach(extent);
        let Vec2 { x, y } = self.pos;

        for gate in gates.iter_mut() {
            if !gate.has_collision() {
                continue;
            }

            if gate.right() < x - reach {
                continue;
            }

            if gate.x <= x + reach {
                if gate.center_x() < x && !gate.passed {
                    gate.passed = true;
                    self.score += 1;
                    self.reroll_hazards(catalog, rng);
                    observer.on_pass();
                    log::debug!("Passed gate {} (score {})", gate.index, self.score);
                }

                if gate.effective_gap_bounds().hits(y, extent.y) {
                    self.die(DeathCause::Gate);
                    break;
                }
            }

            if gate.phantom_hit(x, y, reach, extent.y) {
                self.die(DeathCause::Gate);
                break;
            }

            break;
        }

        !self.status.alive
    }
}
