use gauntlet::consts::SIM_DT;
use gauntlet::sim::*;
use gauntlet::{ChaosTuning, FlyerTuning, GateTuning, Tuning};
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn playfield() -> Playfield {
    Playfield::new(480.0, 800.0, 112.0).unwrap()
}

fn gate_with(kind: TrapKind, hazards: &[Hazard], seed: u64) -> Gate {
    let mut gate = Gate::new(4, kind, 300.0, 300.0, 160.0, 86.0, 0.0);
    let mut rng = Pcg32::seed_from_u64(seed);
    gate.assign_hazards(hazards.iter().copied().collect(), &GateTuning::default(), &mut rng);
    gate
}

proptest! {
    #[test]
    fn mercy_gates_are_plain(seed in any::<u64>(), mercy in 0u32..10) {
        let mut tuning = ChaosTuning::default();
        tuning.mercy_gates = mercy;
        let catalog = HazardCatalog::new(tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        for index in 0..mercy {
            prop_assert_eq!(catalog.pick_base_trap_kind(index, &mut rng), TrapKind::Normal);
            prop_assert!(catalog.pick_pipe_hazards(index, &mut rng).is_empty());
        }
    }

    #[test]
    fn score_counts_each_pass_once(seed in any::<u64>()) {
        let mut state = GameState::new(seed, Tuning::default(), playfield()).unwrap();
        let input = TickInput { autopilot: true, ..Default::default() };

        let mut passes = 0u32;
        let mut last_score = 0;
        for _ in 0..4000 {
            tick(&mut state, &input, SIM_DT);
            for event in state.drain_events() {
                if let GameEvent::GatePassed { score } = event {
                    passes += 1;
                    prop_assert_eq!(score, passes);
                }
            }
            prop_assert!(state.score() >= last_score);
            prop_assert!(state.score() <= last_score + 1);
            last_score = state.score();
        }
        prop_assert_eq!(state.score(), passes);
        prop_assert!(state.score() <= state.stream.spawn_count());
    }

    #[test]
    fn bait_never_kills(y in 10.0f32..640.0, x in 250.0f32..420.0, seed in any::<u64>()) {
        let mut gates = [gate_with(TrapKind::FakeGap, &[Hazard::Bait], seed)];
        let mut flyer = Flyer::new(playfield(), FlyerTuning::default());
        flyer.pos = Vec2::new(x, y);
        let catalog = HazardCatalog::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut on_hit = || {};
        prop_assert!(!flyer.check_collision(&mut gates, &catalog, &mut rng, &mut on_hit));
        prop_assert_eq!(flyer.score, 0);
    }

    #[test]
    fn snap_close_is_monotone_and_resets(gap in 10.0f32..300.0, dt in (1.0f32 / 240.0)..(1.0 / 30.0)) {
        let tuning = GateTuning::default();
        let mut gate = Gate::new(0, TrapKind::SnapClose, 300.0, 300.0, gap, 86.0, 0.0);
        let min = tuning.snap_close_min_gap.min(gap);
        let mut last = gate.gap;
        for _ in 0..100 {
            gate.advance(dt, 250.0, 100.0, &tuning);
            prop_assert!(gate.gap <= last);
            prop_assert!(gate.gap >= min - 1e-4);
            last = gate.gap;
        }
        prop_assert!(gate.triggered);
        gate.reset_after_pass();
        prop_assert_eq!(gate.gap, gap);
    }

    #[test]
    fn drift_stays_in_bound(seed in any::<u64>(), dt in (1.0f32 / 240.0)..(1.0 / 20.0)) {
        let tuning = GateTuning::default();
        let mut gate = gate_with(TrapKind::Normal, &[Hazard::GapDrift], seed);
        for _ in 0..2000 {
            gate.advance(dt, 250.0, 100.0, &tuning);
            prop_assert!(gate.drift_offset().abs() <= tuning.drift_bound);
            prop_assert!((gate.gap_y - gate.anchor_y).abs() <= tuning.drift_bound + 1e-3);
        }
    }

    #[test]
    fn reverse_zone_inverts_only_inside(offset in -60.0f32..60.0, seed in any::<u64>()) {
        let gate = gate_with(TrapKind::ReverseZone, &[], seed);
        let mut flyer = Flyer::new(playfield(), FlyerTuning::default());
        let mut rng = Pcg32::seed_from_u64(seed);
        let (x, y) = (gate.center_x(), gate.gap_y + offset);

        flyer.pos = Vec2::new(x, y);
        flyer.set_reverse_zone(gate.is_in_reverse_zone(x, y, flyer.reach()));
        prop_assert!(flyer.in_reverse_zone());
        flyer.apply_impulse(&mut rng);
        prop_assert!(flyer.vel.y > 0.0);

        // Leaving the zone: the very next impulse is normal again
        flyer.pos = Vec2::new(x, 40.0);
        flyer.set_reverse_zone(gate.is_in_reverse_zone(x, 40.0, flyer.reach()));
        prop_assert!(!flyer.in_reverse_zone());
        flyer.apply_impulse(&mut rng);
        prop_assert!(flyer.vel.y < 0.0);
    }

    #[test]
    fn evicted_gates_never_return(seed in any::<u64>()) {
        let mut stream = GateStream::new(playfield(), GateTuning::default());
        let catalog = HazardCatalog::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut highest_evicted: Option<u32> = None;
        for _ in 0..3000 {
            let before: Vec<u32> = stream.gates().iter().map(|g| g.index).collect();
            stream.advance(SIM_DT, 0.0, &catalog, &mut rng);
            for gate in stream.gates() {
                prop_assert!(!gate.is_past_playfield());
                if let Some(evicted) = highest_evicted {
                    prop_assert!(gate.index > evicted);
                }
            }
            for index in before {
                if !stream.gates().iter().any(|g| g.index == index) {
                    highest_evicted = Some(highest_evicted.map_or(index, |e| e.max(index)));
                }
            }
        }
    }

    #[test]
    fn flyer_hazards_zero_or_one(seed in any::<u64>(), chance in 0.0f32..=1.0) {
        let mut tuning = ChaosTuning::default();
        tuning.flyer_hazard_chance = chance;
        let catalog = HazardCatalog::new(tuning);
        let mut rng = Pcg32::seed_from_u64(seed);
        let set = catalog.pick_flyer_hazards(&mut rng);
        prop_assert!(set.len() <= 1);
        prop_assert!(set.iter().all(|h| FLYER_HAZARDS.contains(&h)));
    }
}
