//! Weighted 8-way A* over a single floor, with live units as soft obstacles.
//! This module exists so navigation rules are shared by the planner, the
//! execution resolver and the host's path preview.
//! It does not own intent queueing or cross-floor movement (that is Climb).

use std::collections::{BTreeMap, BTreeSet};

use slotmap::SlotMap;

use super::*;
use crate::state::{Floors, Unit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Finds a start-to-goal walk on `start`'s floor, inclusive of both ends.
/// Step costs are half-AP units: 2 straight, 3 diagonal, 6 when a player
/// crosses a tile held by an enemy. A tile held by any other unit is
/// impassable, and no path may terminate on an occupied tile. Returns `None`
/// when the goal is out of bounds, statically blocked, or unreachable.
pub fn find_path(
    start: Coord,
    end: Coord,
    floors: &Floors,
    units: &SlotMap<UnitId, Unit>,
    mover: UnitId,
) -> Option<Vec<Coord>> {
    let goal = Coord::new(end.x, end.y, start.floor);
    if !floors.in_bounds(goal) || !floors.is_walkable(goal) {
        return None;
    }
    if start.same_column(goal) {
        return Some(vec![start]);
    }

    let mover_kind = units.get(mover).map(|unit| unit.kind);

    let mut open_set = BTreeSet::new();
    let mut closed: BTreeSet<(i32, i32)> = BTreeSet::new();
    let mut came_from: BTreeMap<(i32, i32), Coord> = BTreeMap::new();
    let mut g_score: BTreeMap<(i32, i32), u32> = BTreeMap::new();

    let start_h = octile(start, goal);
    open_set.insert(OpenNode { f: start_h, h: start_h, y: start.y, x: start.x });
    g_score.insert((start.x, start.y), 0);

    while let Some(current_node) = open_set.pop_first() {
        let current = Coord::new(current_node.x, current_node.y, start.floor);
        if !closed.insert((current.x, current.y)) {
            continue;
        }
        if current.same_column(goal) {
            return Some(reconstruct(&came_from, start, goal));
        }
        let current_g = *g_score.get(&(current.x, current.y)).expect("open node has a g-score");

        for (dx, dy) in NEIGHBOR_OFFSETS {
            let neighbor = Coord::new(current.x + dx, current.y + dy, start.floor);
            if !floors.in_bounds(neighbor)
                || !floors.is_walkable(neighbor)
                || closed.contains(&(neighbor.x, neighbor.y))
            {
                continue;
            }

            let base_cost =
                if dx != 0 && dy != 0 { DIAGONAL_STEP_COST } else { STRAIGHT_STEP_COST };
            let occupied = units
                .iter()
                .any(|(id, unit)| id != mover && unit.pos == neighbor);
            let step_cost = if occupied {
                if neighbor.same_column(goal) {
                    // A walk may not terminate on another unit.
                    continue;
                }
                let occupier_kind = units
                    .iter()
                    .find(|(id, unit)| *id != mover && unit.pos == neighbor)
                    .map(|(_, unit)| unit.kind);
                match (mover_kind, occupier_kind) {
                    (Some(UnitKind::Player), Some(UnitKind::Enemy)) => PASS_THROUGH_COST,
                    _ => continue,
                }
            } else {
                base_cost
            };

            let tentative_g = current_g + step_cost;
            let existing_g = g_score.get(&(neighbor.x, neighbor.y)).copied().unwrap_or(u32::MAX);
            if tentative_g >= existing_g {
                continue;
            }
            came_from.insert((neighbor.x, neighbor.y), current);
            g_score.insert((neighbor.x, neighbor.y), tentative_g);
            let h = octile(neighbor, goal);
            open_set.insert(OpenNode { f: tentative_g + h, h, y: neighbor.y, x: neighbor.x });
        }
    }
    None
}

/// What a given walk would cost its mover, re-deriving the pass-through
/// surcharge from current occupancy. This is the host's preview of the AP
/// debit it must supply when queueing a Move.
pub fn path_cost(path: &[Coord], units: &SlotMap<UnitId, Unit>, mover: UnitId) -> u32 {
    let mover_kind = units.get(mover).map(|unit| unit.kind);
    let mut total = 0;
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let diagonal = from.x != to.x && from.y != to.y;
        let occupier_kind = units
            .iter()
            .find(|(id, unit)| *id != mover && unit.pos == to)
            .map(|(_, unit)| unit.kind);
        total += match (mover_kind, occupier_kind) {
            (Some(UnitKind::Player), Some(UnitKind::Enemy)) => PASS_THROUGH_COST,
            _ if diagonal => DIAGONAL_STEP_COST,
            _ => STRAIGHT_STEP_COST,
        };
    }
    total
}

/// Octile heuristic in half-AP units: 2·(Δx+Δy) − min(Δx, Δy). Exact for
/// the 2/3 step weights on an empty floor, hence admissible.
fn octile(from: Coord, to: Coord) -> u32 {
    let dx = from.x.abs_diff(to.x);
    let dy = from.y.abs_diff(to.y);
    2 * (dx + dy) - dx.min(dy)
}

fn reconstruct(came_from: &BTreeMap<(i32, i32), Coord>, start: Coord, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while !current.same_column(start) {
        current = *came_from.get(&(current.x, current.y)).expect("path must be reconstructible");
        path.push(current);
    }
    path.reverse();
    path
}
