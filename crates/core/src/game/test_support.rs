//! Shared test fixtures for the `game` submodule test suites.
//! This module exists to avoid repeating floor and unit setup across tests.
//! It does not own production gameplay logic.

use slotmap::SlotMap;

use super::*;
use crate::state::Floors;

pub(crate) fn open_floors(width: i32, height: i32) -> Floors {
    Floors::new(width, height, 1, TileKind::Concrete)
}

pub(crate) fn open_floors_two_levels(width: i32, height: i32) -> Floors {
    Floors::new(width, height, 2, TileKind::Concrete)
}

pub(crate) fn open_arena(width: i32, height: i32) -> (Floors, SlotMap<UnitId, Unit>) {
    (open_floors(width, height), SlotMap::with_key())
}

/// A `width` x 3 grid of wall with the middle row (y = 1) carved open.
pub(crate) fn corridor_arena(width: i32) -> (Floors, SlotMap<UnitId, Unit>) {
    let mut floors = Floors::new(width, 3, 1, TileKind::Wall);
    for x in 0..width {
        floors.set_kind(Coord::new(x, 1, 0), TileKind::Concrete);
    }
    (floors, SlotMap::with_key())
}

pub(crate) fn insert_unit(
    units: &mut SlotMap<UnitId, Unit>,
    kind: UnitKind,
    pos: Coord,
) -> UnitId {
    let stats = match kind {
        UnitKind::Player => &PLAYER_STATS,
        UnitKind::Enemy => &ENEMY_STATS,
    };
    let id = units.insert(Unit {
        id: UnitId::default(),
        kind,
        name: "fixture".to_string(),
        pos,
        status: status_from(stats),
        facing: Facing::Down,
        memory: (kind == UnitKind::Enemy).then(EnemyMemory::default),
    });
    units[id].id = id;
    id
}

/// A generated game stripped down to its player, standing in custom floors.
pub(crate) fn blank_game(floors: Floors, player_pos: Coord) -> Game {
    let mut game = Game::new(0, SimConfig::default());
    game.state.floors = floors;
    let player = game.state.player_id;
    game.state.units.retain(|id, _| id == player);
    game.state.units[player].pos = player_pos;
    game.state.action_queue.clear();
    game.state.visible.clear();
    game.state.explored.clear();
    game.log.clear();
    game.refresh_player_fov();
    game
}

/// Open arena with a border wall, player parked at (2, 2).
pub(crate) fn walled_arena(width: i32, height: i32) -> Game {
    let mut floors = open_floors(width, height);
    for x in 0..width {
        floors.set_kind(Coord::new(x, 0, 0), TileKind::Wall);
        floors.set_kind(Coord::new(x, height - 1, 0), TileKind::Wall);
    }
    for y in 0..height {
        floors.set_kind(Coord::new(0, y, 0), TileKind::Wall);
        floors.set_kind(Coord::new(width - 1, y, 0), TileKind::Wall);
    }
    blank_game(floors, Coord::new(2, 2, 0))
}

pub(crate) fn add_enemy(game: &mut Game, pos: Coord) -> UnitId {
    insert_unit(&mut game.state.units, UnitKind::Enemy, pos)
}

pub(crate) fn set_enemy_memory(
    game: &mut Game,
    id: UnitId,
    state: AiState,
    last_known: Option<Coord>,
) {
    if let Some(unit) = game.state.units.get_mut(id) {
        unit.memory = Some(EnemyMemory { state, last_known_target_pos: last_known });
    }
}
