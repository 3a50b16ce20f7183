//! Property fuzzing: arbitrary bounded host-command sequences must never
//! violate the world invariants.

use std::collections::BTreeSet;

use proptest::prelude::*;

use gridfall_core::*;

fn command_strategy() -> impl Strategy<Value = HostCommand> {
    let coord = (0..20_i32, 0..20_i32).prop_map(|(x, y)| Coord::new(x, y, 0));
    prop_oneof![
        coord.clone().prop_map(|to| HostCommand::QueueMove { to }),
        coord.prop_map(|at| HostCommand::QueueAttack { at }),
        Just(HostCommand::QueueClimb),
        Just(HostCommand::QueueWait),
        Just(HostCommand::CancelAction),
        Just(HostCommand::ToggleSneak),
        Just(HostCommand::ToggleDebugFow),
        (100_u32..6_000).prop_map(|millis| HostCommand::Tick { millis }),
    ]
}

fn assert_invariants(game: &Game, previous_explored: &BTreeSet<Coord>) {
    let world = game.state();
    for (_, unit) in &world.units {
        assert!(
            unit.status.hp >= 0 && unit.status.hp <= unit.status.max_hp,
            "hp out of range for {}",
            unit.name
        );
        assert!(unit.status.ap <= unit.status.max_ap, "ap over cap for {}", unit.name);
    }
    assert!(
        world.visible.iter().all(|pos| world.explored.contains(pos)),
        "explored must contain every visible tile"
    );
    assert!(
        previous_explored.iter().all(|pos| world.explored.contains(pos)),
        "explored must be monotone"
    );
    if let Some(player) = world.player() {
        assert!(world.visible.contains(&player.pos), "the player sees its own tile");
    }
    assert!(world.decision_timer >= 0.0);
    // The host adapter drains every expired window, so between commands the
    // world always rests at a Decision boundary.
    assert_eq!(world.phase, Phase::Decision);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn invariants_hold_across_random_host_sequences(
        seed in any::<u32>(),
        commands in prop::collection::vec(command_strategy(), 0..32)
    ) {
        let mut game = Game::new(seed, SimConfig::default());
        let mut explored_snapshot = game.state().explored.clone();
        for command in &commands {
            apply_command(&mut game, command).expect("command application");
            assert_invariants(&game, &explored_snapshot);
            explored_snapshot = game.state().explored.clone();
        }
    }

    #[test]
    fn enqueue_cancel_pairs_are_identities_for_any_reachable_target(
        seed in any::<u32>(),
        x in 0..20_i32,
        y in 0..20_i32,
    ) {
        let mut game = Game::new(seed, SimConfig::default());
        let hash_before = game.snapshot_hash();
        apply_command(&mut game, &HostCommand::QueueMove { to: Coord::new(x, y, 0) })
            .expect("queue");
        apply_command(&mut game, &HostCommand::CancelAction).expect("cancel");
        prop_assert_eq!(game.snapshot_hash(), hash_before);
    }
}
