//! Main simulation tick function
//!
//! One call advances the whole run by a fixed timestep. Order inside a
//! playing tick: reverse-zone flag, impulse, magnet pull, gate stream,
//! flyer motion, collision and pass detection.

use super::collision::DeathCause;
use super::state::{GameEvent, GameState, RunPhase};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flap (click/tap/space)
    pub impulse: bool,
    /// Demo mode - a simple controller decides the impulse
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    let impulse = input.impulse || (input.autopilot && autopilot_wants_impulse(state));

    match state.phase {
        RunPhase::Waiting => {
            if impulse {
                state.start_run();
                apply_impulse(state);
            } else {
                let time = state.time_ticks as f32 * dt;
                state.flyer.hover(time);
            }
        }
        RunPhase::Playing => step_playing(state, impulse, dt),
        RunPhase::Dead => {
            // Gates are frozen, the flyer falls to the floor
            state.flyer.integrate(dt, &mut state.rng);
            if state.flyer.status.grounded && state.flyer.play_dead() {
                log::debug!("Flyer landed");
            }
        }
    }
}

fn step_playing(state: &mut GameState, impulse: bool, dt: f32) {
    let pos = state.flyer.pos;
    let reach = state.flyer.reach();

    let inside = state.stream.reverse_zone_gate(pos.x, pos.y, reach).is_some();
    if inside != state.flyer.in_reverse_zone() {
        log::debug!("Reverse zone {}", if inside { "entered" } else { "left" });
    }
    state.flyer.set_reverse_zone(inside);

    if impulse {
        apply_impulse(state);
    }

    let pull = state.stream.magnet_pull(pos.x, pos.y, dt);
    if pull != 0.0 {
        state.flyer.nudge_vertical(pull);
    }

    state
        .stream
        .advance(dt, state.flyer.pos.x, &state.catalog, &mut state.rng);
    state.flyer.integrate(dt, &mut state.rng);

    let mut passed = false;
    let dead = state.flyer.check_collision(
        state.stream.gates_mut(),
        &state.catalog,
        &mut state.rng,
        &mut || passed = true,
    );

    let score = state.flyer.score;
    if passed {
        state.events.push(GameEvent::GatePassed { score });
    }

    if dead {
        let cause = state.flyer.cause_of_death.unwrap_or(DeathCause::Floor);
        state.phase = RunPhase::Dead;
        state.events.push(GameEvent::Died { cause, score });
    }
}

fn apply_impulse(state: &mut GameState) {
    let outcome = state.flyer.apply_impulse(&mut state.rng);
    log::debug!("Impulse {outcome:?}");
    state.events.push(GameEvent::Impulse(outcome));
}

/// Flap while falling below the gap of the next gate ahead
fn autopilot_wants_impulse(state: &GameState) -> bool {
    let flyer = &state.flyer;
    if !flyer.status.alive {
        return false;
    }

    let behind = flyer.pos.x - flyer.reach();
    let target = state
        .stream
        .gates()
        .iter()
        .find(|g| g.has_collision() && g.right() >= behind)
        .map(|g| {
            let bounds = g.effective_gap_bounds();
            (bounds.top + bounds.bottom) / 2.0
        })
        .unwrap_or(state.playfield.floor_y() / 2.0);

    flyer.pos.y > target + flyer.half_size.y && flyer.vel.y >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::hazard::TrapKind;
    use crate::sim::state::Playfield;
    use crate::tuning::Tuning;

    fn playfield() -> Playfield {
        Playfield::new(480.0, 800.0, 112.0).unwrap()
    }

    /// Tuning without flyer hazards so single ticks are predictable
    fn calm_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.chaos.flyer_hazard_chance = 0.0;
        tuning
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(12345, calm_tuning(), playfield()).unwrap();
        let flap = TickInput {
            impulse: true,
            ..Default::default()
        };
        tick(&mut state, &flap, SIM_DT);
        state
    }

    #[test]
    fn test_tick_waiting_to_playing() {
        let mut state = GameState::new(12345, calm_tuning(), playfield()).unwrap();
        assert_eq!(state.phase, RunPhase::Waiting);

        // Tick without impulse - should stay waiting
        let input = TickInput::default();
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::Waiting);
        assert!(state.stream.gates().is_empty());

        let input = TickInput {
            impulse: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(state.flyer.vel.y < 0.0);

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::RunStarted);
        assert!(matches!(events[1], GameEvent::Impulse(_)));
    }

    #[test]
    fn test_waiting_hovers_in_place() {
        let mut state = GameState::new(1, Tuning::default(), playfield()).unwrap();
        let hover_y = 800.0 * state.tuning.flyer.hover_y_fraction;
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!((state.flyer.pos.y - hover_y).abs() <= state.tuning.flyer.hover_amplitude + 1e-3);
        }
        assert!(state.flyer.status.alive);
    }

    #[test]
    fn test_gates_spawn_once_playing() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.stream.gates().len(), 1);
    }

    #[test]
    fn test_pass_emits_event() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), SIM_DT);
        state.drain_events();

        let flyer = state.flyer.pos;
        let gate = &mut state.stream.gates_mut()[0];
        gate.x = flyer.x - gate.width() / 2.0 - 1.0;
        gate.gap_y = flyer.y;
        gate.anchor_y = flyer.y;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score(), 1);
        assert_eq!(state.drain_events(), vec![GameEvent::GatePassed { score: 1 }]);

        // The same gate never scores twice
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score(), 1);
    }

    #[test]
    fn test_gate_collision_ends_run() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), SIM_DT);

        let flyer = state.flyer.pos;
        let gate = &mut state.stream.gates_mut()[0];
        gate.x = flyer.x - 10.0;
        gate.gap_y = flyer.y + 300.0;
        gate.anchor_y = gate.gap_y;

        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, RunPhase::Dead);
        assert!(state.drain_events().contains(&GameEvent::Died {
            cause: DeathCause::Gate,
            score: 0
        }));

        // Gates freeze, the flyer falls and lands
        let frozen_x = state.stream.gates()[0].x;
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.stream.gates()[0].x, frozen_x);
        assert!(state.flyer.status.grounded);
        assert!(state.flyer.status.death_played);
    }

    #[test]
    fn test_impulse_ignored_after_death() {
        let mut state = playing_state();
        for _ in 0..2000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, RunPhase::Dead);
        state.drain_events();
        let flap = TickInput {
            impulse: true,
            ..Default::default()
        };
        tick(&mut state, &flap, SIM_DT);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_reverse_zone_flips_impulse() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), SIM_DT);

        let flyer = state.flyer.pos;
        let gate = &mut state.stream.gates_mut()[0];
        gate.kind = TrapKind::ReverseZone;
        gate.x = flyer.x - gate.width() / 2.0 + 10.0;
        gate.gap_y = flyer.y;
        gate.anchor_y = flyer.y;

        let flap = TickInput {
            impulse: true,
            ..Default::default()
        };
        tick(&mut state, &flap, SIM_DT);
        assert!(state.flyer.in_reverse_zone());
        assert!(state.flyer.vel.y > 0.0);

        // Leaving restores the normal direction on the next impulse
        state.stream.gates_mut()[0].x = 1000.0;
        tick(&mut state, &flap, SIM_DT);
        assert!(!state.flyer.in_reverse_zone());
        assert!(state.flyer.vel.y < 0.0);
    }

    #[test]
    fn test_reset_returns_to_waiting() {
        let mut state = playing_state();
        for _ in 0..300 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state.reset();
        assert_eq!(state.phase, RunPhase::Waiting);
        assert_eq!(state.score(), 0);
        assert!(state.flyer.status.alive);
        assert!(state.stream.gates().is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_determinism() {
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        let mut a = GameState::new(99999, Tuning::default(), playfield()).unwrap();
        let mut b = GameState::new(99999, Tuning::default(), playfield()).unwrap();

        for _ in 0..3000 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score(), b.score());
        assert_eq!(a.flyer.pos, b.flyer.pos);
        assert_eq!(a.stream.gates().len(), b.stream.gates().len());
        for (ga, gb) in a.stream.gates().iter().zip(b.stream.gates()) {
            assert_eq!(ga.index, gb.index);
            assert_eq!(ga.kind, gb.kind);
            assert_eq!(ga.hazards, gb.hazards);
            assert_eq!(ga.x, gb.x);
            assert_eq!(ga.gap_y, gb.gap_y);
        }
    }

    #[test]
    fn test_autopilot_starts_run() {
        let mut state = GameState::new(5, Tuning::default(), playfield()).unwrap();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_ne!(state.phase, RunPhase::Waiting);
    }
}
