//! Hazard catalog and selection engine
//!
//! Stateless tables plus the probability functions that decide, per gate and
//! per pass, which adversarial behaviors are active. All draws come from the
//! caller's RNG so a seeded run is reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::tuning::ChaosTuning;

/// Primary archetype of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrapKind {
    #[default]
    Normal,
    /// Gap jumps vertically once the flyer is in the late-trigger window
    TrollShift,
    /// Looks open, is solid
    FakeGap,
    /// Gap slams almost shut in the late-trigger window
    SnapClose,
    /// Impulses push downward while inside the gap
    ReverseZone,
}

/// Adversarial behavior attached to a gate or to the flyer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hazard {
    // Gate hazards
    DoubleTroll,
    GapTeleport,
    GapDrift,
    GateSwap,
    FakeCeiling,
    Phantom,
    LateSpawn,
    CollisionShift,
    Invisible,
    Magnet,
    Shrinking,
    Bait,
    // Flyer hazards
    FlapRandom,
    FlapDelay,
    SuddenDrop,
    AirBurst,
    InputLag,
    GravityShift,
    WindGust,
}

/// Hazards a gate can carry
pub const PIPE_HAZARDS: [Hazard; 12] = [
    Hazard::DoubleTroll,
    Hazard::GapTeleport,
    Hazard::GapDrift,
    Hazard::GateSwap,
    Hazard::FakeCeiling,
    Hazard::Phantom,
    Hazard::LateSpawn,
    Hazard::CollisionShift,
    Hazard::Invisible,
    Hazard::Magnet,
    Hazard::Shrinking,
    Hazard::Bait,
];

/// Hazards the flyer can carry between passes
pub const FLYER_HAZARDS: [Hazard; 7] = [
    Hazard::FlapRandom,
    Hazard::FlapDelay,
    Hazard::SuddenDrop,
    Hazard::AirBurst,
    Hazard::InputLag,
    Hazard::GravityShift,
    Hazard::WindGust,
];

/// Small ordered set of hazards (no duplicates)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardSet(Vec<Hazard>);

impl HazardSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a hazard; returns false if it was already present
    pub fn insert(&mut self, hazard: Hazard) -> bool {
        if self.contains(hazard) {
            return false;
        }
        self.0.push(hazard);
        true
    }

    #[inline]
    pub fn contains(&self, hazard: Hazard) -> bool {
        self.0.contains(&hazard)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = Hazard> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Hazard> for HazardSet {
    fn from_iter<I: IntoIterator<Item = Hazard>>(iter: I) -> Self {
        let mut set = HazardSet::new();
        for hazard in iter {
            set.insert(hazard);
        }
        set
    }
}

/// Troll shift sign for a gate index: even shifts down (+1), odd shifts up (-1)
#[inline]
pub fn troll_direction(index: u32) -> f32 {
    if index.is_multiple_of(2) { 1.0 } else { -1.0 }
}

/// Pick an index with probability proportional to its weight.
/// Returns `None` when no weight is positive.
fn pick_weighted<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }

    let roll = rng.random::<f32>() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        if roll < cumulative {
            return Some(i);
        }
    }

    // Float rounding can leave roll == total
    weights.iter().rposition(|w| *w > 0.0)
}

/// Hazard selection tables and the functions that sample them
#[derive(Debug, Clone, Default)]
pub struct HazardCatalog {
    tuning: ChaosTuning,
}

impl HazardCatalog {
    pub fn new(tuning: ChaosTuning) -> Self {
        Self { tuning }
    }

    pub fn tuning(&self) -> &ChaosTuning {
        &self.tuning
    }

    /// Horizontal size of the late-trigger window (px)
    #[inline]
    pub fn late_trigger_distance(&self) -> f32 {
        self.tuning.late_trigger_distance
    }

    /// Seconds the late-trigger window lasts for a gate moving at `gate_speed` px/s
    pub fn reaction_window(&self, gate_speed: f32) -> f32 {
        if gate_speed <= 0.0 {
            return f32::INFINITY;
        }
        self.tuning.late_trigger_distance / gate_speed
    }

    fn in_mercy_window(&self, index: u32) -> bool {
        index < self.tuning.mercy_gates
    }

    /// Base trap kind for the gate with spawn index `index`
    pub fn pick_base_trap_kind<R: Rng + ?Sized>(&self, index: u32, rng: &mut R) -> TrapKind {
        if self.in_mercy_window(index) {
            return TrapKind::Normal;
        }

        let w = &self.tuning.trap_weights;
        let kinds = [
            TrapKind::ReverseZone,
            TrapKind::SnapClose,
            TrapKind::FakeGap,
            TrapKind::TrollShift,
            TrapKind::Normal,
        ];
        let weights = [w.reverse_zone, w.snap_close, w.fake_gap, w.troll_shift, w.normal];

        pick_weighted(&weights, rng)
            .map(|i| kinds[i])
            .unwrap_or(TrapKind::Normal)
    }

    /// How many gate hazards the gate with spawn index `index` receives
    pub fn pick_pipe_hazard_count<R: Rng + ?Sized>(&self, index: u32, rng: &mut R) -> usize {
        let t = &self.tuning;
        if self.in_mercy_window(index) {
            return 0;
        }

        let count = if index < t.full_chaos_start {
            let roll = rng.random::<f32>();
            if roll < t.single_event_chance {
                1
            } else if index > t.single_event_until
                && roll < t.single_event_chance + t.double_event_chance
            {
                2
            } else {
                0
            }
        } else {
            match pick_weighted(&t.count_weights, rng) {
                // The last bucket is open-ended up to the catalog size
                Some(i) if i + 1 == t.count_weights.len() && i < PIPE_HAZARDS.len() => {
                    rng.random_range(i..=PIPE_HAZARDS.len())
                }
                Some(i) => i,
                None => 0,
            }
        };

        count.min(PIPE_HAZARDS.len())
    }

    /// Distinct gate hazards for the gate with spawn index `index`
    pub fn pick_pipe_hazards<R: Rng + ?Sized>(&self, index: u32, rng: &mut R) -> HazardSet {
        let count = self.pick_pipe_hazard_count(index, rng);

        // Sample without replacement
        let mut available = PIPE_HAZARDS.to_vec();
        let mut picked = HazardSet::new();
        for _ in 0..count {
            if available.is_empty() {
                break;
            }
            let i = rng.random_range(0..available.len());
            picked.insert(available.swap_remove(i));
        }
        picked
    }

    /// Zero or one flyer hazard, rolled on every pass and at run start
    pub fn pick_flyer_hazards<R: Rng + ?Sized>(&self, rng: &mut R) -> HazardSet {
        let mut picked = HazardSet::new();
        if rng.random_bool(self.tuning.flyer_hazard_chance.clamp(0.0, 1.0) as f64) {
            let i = rng.random_range(0..FLYER_HAZARDS.len());
            picked.insert(FLYER_HAZARDS[i]);
        }
        picked
    }
}
