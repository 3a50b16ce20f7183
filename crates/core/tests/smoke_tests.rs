//! End-to-end scenarios driven purely through the host-facing surface.

use gridfall_core::content::*;
use gridfall_core::*;

fn any_enemy_id(game: &Game) -> UnitId {
    game.state()
        .units
        .iter()
        .find(|(id, _)| *id != game.player_id())
        .map(|(id, _)| id)
        .expect("generated worlds always carry enemies")
}

fn stairs_up_on_floor_zero(game: &Game) -> Coord {
    let floors = &game.state().floors;
    for y in 0..floors.height() {
        for x in 0..floors.width() {
            let pos = Coord::new(x, y, 0);
            if floors.tile_at(pos).map(|tile| tile.kind) == Some(TileKind::StairsUp) {
                return pos;
            }
        }
    }
    panic!("no up-stairs on floor 0");
}

#[test]
fn seeded_init_produces_the_documented_opening_state() {
    let game = Game::new(42, SimConfig::default());
    let world = game.state();

    let player = world.player().expect("player exists");
    assert_eq!(player.pos, Coord::new(10, 10, 0), "player spawns at the plaza center");
    assert!(world.floors.is_walkable(player.pos));
    assert_eq!(player.status.hp, 100);
    assert_eq!(player.status.ap, 20);

    let enemy_count = world.units.iter().filter(|(id, _)| *id != game.player_id()).count();
    assert!((3..=5).contains(&enemy_count), "enemy pack size {enemy_count} out of range");

    let stairs = stairs_up_on_floor_zero(&game);
    assert!(
        chebyshev(stairs, player.pos) >= STAIR_MIN_PLAZA_CHEBYSHEV,
        "stairs {stairs:?} violate the plaza clearance rule"
    );

    assert!(world.visible.contains(&player.pos), "own tile is always visible");
    assert!(world.visible.iter().all(|pos| world.explored.contains(pos)));
    assert_eq!(world.phase, Phase::Decision);
    assert_eq!(world.decision_timer, DECISION_TIMER_SECONDS);
}

#[test]
fn queue_then_cancel_a_one_tile_move_restores_ap_exactly() {
    let mut game = Game::new(42, SimConfig::default());
    let player = game.player_id();
    let from = game.state().player().expect("player").pos;
    let to = Coord::new(11, 10, 0);

    let path = find_path(from, to, &game.state().floors, &game.state().units, player)
        .expect("one-step path inside the plaza");
    let cost = path_cost(&path, &game.state().units, player);
    assert_eq!(cost, STRAIGHT_STEP_COST, "a single straight step costs 1.0 AP");

    game.queue_action(ActionSpec {
        kind: ActionKind::Move,
        unit: player,
        target: Some(to),
        target_unit: None,
        cost,
    });
    assert_eq!(game.state().units[player].status.ap, 20 - STRAIGHT_STEP_COST);

    game.cancel_action();
    assert_eq!(game.state().units[player].status.ap, 20);
    assert!(game.state().action_queue.is_empty());
}

#[test]
fn adjacent_enemy_strikes_during_execution_and_leaves_a_damage_event() {
    let mut game = Game::new(42, SimConfig::default());
    let player = game.player_id();
    let enemy = any_enemy_id(&game);

    // Walk one enemy up next to the player; it will hear them on its own.
    game.update_unit_position(enemy, Coord::new(11, 10, 0));
    game.set_phase(Phase::Execution);
    let result = game.run_execution_to_completion();

    assert!(matches!(result.stop_reason, AdvanceStopReason::Drained));
    assert_eq!(game.state().units[player].status.hp, 99, "one strike lands for 1 damage");
    assert!(!game.state().damage_events.is_empty());
    assert!(game.state().action_queue.is_empty());
    assert_eq!(game.state().phase, Phase::Decision);
    assert_eq!(game.state().decision_timer, DECISION_TIMER_SECONDS);
}

#[test]
fn climbing_the_stairs_lands_on_the_upper_floor_with_fresh_sight() {
    let mut game = Game::new(42, SimConfig::default());
    let player = game.player_id();
    let stairs = stairs_up_on_floor_zero(&game);

    game.update_unit_position(player, stairs);
    game.queue_action(ActionSpec {
        kind: ActionKind::Climb,
        unit: player,
        target: None,
        target_unit: None,
        cost: CLIMB_COST,
    });
    game.set_phase(Phase::Execution);
    game.run_execution_to_completion();

    let pos = game.state().units[player].pos;
    assert_eq!(pos, Coord::new(stairs.x, stairs.y, 1), "climb keeps the column, raises the floor");
    assert!(game.state().visible.contains(&pos));
    assert!(
        game.state().visible.iter().all(|tile| tile.floor == 1),
        "sight is recomputed on the destination floor only"
    );
}

#[test]
fn a_full_timer_driven_turn_round_trips_back_to_decision() {
    let mut game = Game::new(7, SimConfig::default());
    let player = game.player_id();
    let from = game.state().player().expect("player").pos;
    let to = Coord::new(from.x, from.y - 1, 0);
    if let Some(path) = find_path(from, to, &game.state().floors, &game.state().units, player) {
        let cost = path_cost(&path, &game.state().units, player);
        game.queue_action(ActionSpec {
            kind: ActionKind::Move,
            unit: player,
            target: Some(to),
            target_unit: None,
            cost,
        });
    }

    // Frame ticks expire the window; the host then steps the resolver.
    for _ in 0..60 {
        game.update_timer(0.1);
    }
    assert_eq!(game.state().phase, Phase::Execution);
    loop {
        match game.advance(1).stop_reason {
            AdvanceStopReason::BudgetExhausted => {}
            AdvanceStopReason::Drained | AdvanceStopReason::NotInExecution => break,
        }
    }

    assert_eq!(game.state().phase, Phase::Decision);
    assert_eq!(game.state().decision_timer, DECISION_TIMER_SECONDS);
    assert!(game.state().action_queue.is_empty());
    let status = game.state().units[player].status;
    assert!(status.ap <= status.max_ap);
}

#[test]
fn debug_fow_reveals_every_tile_to_the_read_path_without_forgetting_the_truth() {
    let mut game = Game::new(42, SimConfig::default());
    let tracked = game.state().visible.clone();
    game.toggle_debug_fow();

    let floors = &game.state().floors;
    for y in 0..floors.height() {
        for x in 0..floors.width() {
            assert!(game.is_visible_to_player(Coord::new(x, y, 0)));
        }
    }
    assert_eq!(game.state().visible, tracked, "the true visible set is untouched");
}
