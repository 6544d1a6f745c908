//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (gates oldest first)
//! - No rendering or platform dependencies

pub mod collision;
pub mod flyer;
pub mod gate;
pub mod hazard;
pub mod state;
pub mod stream;
pub mod tick;

pub use collision::{DeathCause, GapBounds};
pub use flyer::{Flyer, FlyerStatus, ImpulseOutcome, PassObserver};
pub use gate::{Gate, PhantomBounds};
pub use hazard::{FLYER_HAZARDS, Hazard, HazardCatalog, HazardSet, PIPE_HAZARDS, TrapKind, troll_direction};
pub use state::{GameEvent, GameState, Playfield, RunPhase};
pub use stream::GateStream;
pub use tick::{TickInput, tick};
