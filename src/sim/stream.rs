//! Gate stream: spawning, gate-swap, advancing and eviction

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::gate::Gate;
use super::hazard::{Hazard, HazardCatalog};
use super::state::Playfield;
use crate::tuning::GateTuning;

/// Ordered collection of live gates (oldest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateStream {
    gates: Vec<Gate>,
    /// Gates spawned this run; also the next spawn index
    spawn_count: u32,
    /// Index of the last gate whose swap has been resolved
    swapped: Option<u32>,
    playfield: Playfield,
    tuning: GateTuning,
}

impl GateStream {
    pub fn new(playfield: Playfield, tuning: GateTuning) -> Self {
        Self {
            gates: Vec::new(),
            spawn_count: 0,
            swapped: None,
            playfield,
            tuning,
        }
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gates_mut(&mut self) -> &mut [Gate] {
        &mut self.gates
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    /// Where the next gate should spawn, if one is due
    pub fn next_spawn_x(&self) -> Option<f32> {
        let width = self.playfield.width;
        let gate_width = self.playfield.gate_width(&self.tuning);

        match self.gates.last() {
            None => Some(2.0 * (width + gate_width)),
            Some(last) if self.playfield.gate_spacing(&self.tuning) <= width - last.x => {
                Some(width + gate_width)
            }
            Some(_) => None,
        }
    }

    pub fn needs_spawn(&self) -> bool {
        self.next_spawn_x().is_some()
    }

    /// Advance the stream by `dt` seconds
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        flyer_x: f32,
        catalog: &HazardCatalog,
        rng: &mut R,
    ) {
        if let Some(x) = self.next_spawn_x() {
            self.spawn(x, catalog, rng);
            self.resolve_swap();
        }

        let late_trigger = catalog.late_trigger_distance();
        for gate in &mut self.gates {
            gate.advance(dt, flyer_x, late_trigger, &self.tuning);
            if gate.passed {
                gate.reset_after_pass();
            }
        }

        let before = self.gates.len();
        self.gates.retain(|g| !g.is_past_playfield());
        let evicted = before - self.gates.len();
        if evicted > 0 {
            log::trace!("Evicted {evicted} gate(s), {} live", self.gates.len());
        }
    }

    fn spawn<R: Rng + ?Sized>(&mut self, x: f32, catalog: &HazardCatalog, rng: &mut R) {
        let index = self.spawn_count;
        self.spawn_count += 1;

        let kind = catalog.pick_base_trap_kind(index, rng);
        let gap_y = match self.playfield.spawn_band(&self.tuning) {
            Ok((min, max)) => rng.random_range(min..=max),
            Err(err) => {
                log::warn!("{err}, spawning at mid-height");
                self.playfield.floor_y() / 2.0
            }
        };

        let mut gate = Gate::spawn(index, kind, x, gap_y, &self.playfield, &self.tuning);
        let hazards = catalog.pick_pipe_hazards(index, rng);
        gate.assign_hazards(hazards, &self.tuning, rng);
        self.gates.push(gate);
    }

    /// Exchange gap positions between the two newest gates when the older one
    /// carries a gate swap. Each gate swaps at most once.
    fn resolve_swap(&mut self) {
        let n = self.gates.len();
        if n < 2 {
            return;
        }

        let (older, newer) = self.gates.split_at_mut(n - 1);
        let previous = &mut older[n - 2];
        let current = &mut newer[0];

        if !previous.has(Hazard::GateSwap) || self.swapped == Some(previous.index) {
            return;
        }

        std::mem::swap(&mut previous.gap_y, &mut current.gap_y);
        std::mem::swap(&mut previous.anchor_y, &mut current.anchor_y);
        self.swapped = Some(previous.index);
        log::debug!("Gate {} swapped gap with gate {}", previous.index, current.index);
    }

    /// First reverse-zone gate containing a body at (`x`, `y`)
    pub fn reverse_zone_gate(&self, x: f32, y: f32, reach: f32) -> Option<&Gate> {
        self.gates.iter().find(|g| g.is_in_reverse_zone(x, y, reach))
    }

    /// Combined magnet displacement on a body at (`x`, `y`) this tick
    pub fn magnet_pull(&self, x: f32, y: f32, dt: f32) -> f32 {
        self.gates
            .iter()
            .map(|g| g.magnet_pull(x, y, dt, &self.tuning))
            .sum()
    }

    /// Rescale live gates to a new playfield
    pub fn resize(&mut self, playfield: Playfield) {
        for gate in &mut self.gates {
            gate.resize(&self.playfield, &playfield, &self.tuning);
        }
        self.playfield = playfield;
    }

    pub fn reset(&mut self) {
        self.gates.clear();
        self.spawn_count = 0;
        self.swapped = None;
    }
}
