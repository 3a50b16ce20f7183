//! Enemy perception, state machine and intent planning.
//! This module exists to turn world observations into queued enemy intents
//! at the start of each Execution phase.
//! It does not own intent resolution or AP bookkeeping (queueing debits).

use std::collections::BTreeSet;

use super::*;
use crate::game::pathfinding::find_path;

struct TargetView {
    id: UnitId,
    pos: Coord,
    noise_level: u32,
}

impl Game {
    /// One planning pass over every living enemy, in unit-key order. Player
    /// positions are pre-reserved so no enemy picks a tile a player holds,
    /// and each chosen destination is reserved against the rest of the pack.
    pub(crate) fn plan_enemy_intents(&mut self) {
        let mut reserved: BTreeSet<Coord> = self
            .state
            .units
            .values()
            .filter(|unit| unit.kind == UnitKind::Player)
            .map(|unit| unit.pos)
            .collect();

        let enemy_ids: Vec<UnitId> = self
            .state
            .units
            .iter()
            .filter(|(_, unit)| unit.kind == UnitKind::Enemy && unit.status.hp > 0)
            .map(|(id, _)| id)
            .collect();

        for enemy_id in enemy_ids {
            self.plan_one_enemy(enemy_id, &mut reserved);
        }
    }

    fn plan_one_enemy(&mut self, enemy_id: UnitId, reserved: &mut BTreeSet<Coord>) {
        let Some(enemy) = self.state.units.get(enemy_id) else {
            return;
        };
        let enemy_pos = enemy.pos;
        let enemy_ap = enemy.status.ap;
        let enemy_hp = enemy.status.hp;
        let enemy_max_hp = enemy.status.max_hp;
        let enemy_sight = enemy.status.sight_range;
        let enemy_facing = enemy.facing;

        let Some(target) = self.closest_player_on_floor(enemy_pos) else {
            return;
        };
        let predicted = self.predicted_target_pos(&target);

        // A hurt sleeper stirs before its senses run.
        let mut memory = enemy.memory.unwrap_or_default();
        if memory.state == AiState::Sleep && enemy_hp < enemy_max_hp {
            self.transition(enemy_id, &mut memory, AiState::Wander);
        }

        let current_dist = manhattan(enemy_pos, target.pos);
        let mut is_visible = current_dist <= enemy_sight && memory.state != AiState::Sleep;
        if is_visible && self.config.enemy_vision_cone {
            is_visible = facing_cone_contains(enemy_facing, enemy_pos, target.pos);
        }
        let is_audible = current_dist <= target.noise_level;

        if is_visible || is_audible {
            memory.last_known_target_pos = Some(predicted);
            self.transition(enemy_id, &mut memory, AiState::Chase);
        } else if memory.state == AiState::Chase {
            self.transition(enemy_id, &mut memory, AiState::Search);
        } else if memory.state == AiState::Search
            && memory.last_known_target_pos.is_some_and(|last| last.same_column(enemy_pos))
        {
            memory.last_known_target_pos = None;
            self.transition(enemy_id, &mut memory, AiState::Wander);
        }
        self.store_memory(enemy_id, memory);

        // Already in reach: spend the turn on the strike alone.
        let dist_to_predicted = manhattan(enemy_pos, predicted);
        if current_dist == 1 && enemy_ap >= ATTACK_COST && dist_to_predicted <= 1 {
            self.queue_action(ActionSpec {
                kind: ActionKind::Attack,
                unit: enemy_id,
                target: None,
                target_unit: Some(target.id),
                cost: ATTACK_COST,
            });
            return;
        }

        let desired = match memory.state {
            AiState::Chase | AiState::Search => match memory.last_known_target_pos {
                Some(last_known) => Coord::new(last_known.x, last_known.y, enemy_pos.floor),
                None => return,
            },
            AiState::Wander => match self.roll_wander_step(enemy_pos) {
                Some(step) => step,
                None => return,
            },
            AiState::Sleep => return,
        };

        let Some(dest) = reserve_destination(&self.state.floors, reserved, desired) else {
            return;
        };

        let Some(path) = find_path(enemy_pos, dest, &self.state.floors, &self.state.units, enemy_id)
        else {
            return;
        };

        // Walk the path under the AP budget, never crossing the target's
        // current tile.
        let mut cost_accumulated = 0;
        let mut reach_index = 0;
        for index in 1..path.len() {
            let step = path[index];
            if step.same_column(target.pos) {
                break;
            }
            let previous = path[index - 1];
            let diagonal = step.x != previous.x && step.y != previous.y;
            let step_cost = if diagonal { DIAGONAL_STEP_COST } else { STRAIGHT_STEP_COST };
            if enemy_ap < cost_accumulated + step_cost {
                break;
            }
            cost_accumulated += step_cost;
            reach_index = index;
        }

        if reach_index == 0 {
            return;
        }
        let actual_dest = path[reach_index];
        if actual_dest == enemy_pos {
            return;
        }
        self.queue_action(ActionSpec {
            kind: ActionKind::Move,
            unit: enemy_id,
            target: Some(actual_dest),
            target_unit: None,
            cost: cost_accumulated,
        });

        // Move-plus-attack combo when the walk ends in reach with AP to spare.
        if enemy_ap - cost_accumulated >= ATTACK_COST && manhattan(actual_dest, predicted) <= 1 {
            self.queue_action(ActionSpec {
                kind: ActionKind::Attack,
                unit: enemy_id,
                target: None,
                target_unit: Some(target.id),
                cost: ATTACK_COST,
            });
        }
    }

    /// Closest same-floor player by Manhattan distance; ties go to the
    /// first unit in key order, which is stable.
    fn closest_player_on_floor(&self, from: Coord) -> Option<TargetView> {
        let mut best: Option<(u32, TargetView)> = None;
        for (id, unit) in &self.state.units {
            if unit.kind != UnitKind::Player || unit.pos.floor != from.floor {
                continue;
            }
            let distance = manhattan(from, unit.pos);
            let closer = match &best {
                None => true,
                Some((best_distance, _)) => distance < *best_distance,
            };
            if closer {
                let view = TargetView {
                    id,
                    pos: unit.pos,
                    noise_level: unit.status.noise_level_or_default(),
                };
                best = Some((distance, view));
            }
        }
        best.map(|(_, view)| view)
    }

    /// Where the player will stand once its queued movement resolves: the
    /// last queued Move target, unless some third unit already holds it.
    fn predicted_target_pos(&self, target: &TargetView) -> Coord {
        let queued_move_target = self
            .state
            .action_queue
            .iter()
            .rev()
            .find(|action| action.kind == ActionKind::Move && action.unit == target.id)
            .and_then(|action| action.target);
        match queued_move_target {
            Some(tile)
                if !self
                    .state
                    .units
                    .iter()
                    .any(|(id, unit)| id != target.id && unit.pos == tile) =>
            {
                tile
            }
            _ => target.pos,
        }
    }

    /// Up to three seeded rolls of a king-move delta; the first in-bounds
    /// walkable candidate wins.
    fn roll_wander_step(&mut self, from: Coord) -> Option<Coord> {
        for _ in 0..WANDER_ROLL_ATTEMPTS {
            let dx = self.rng.range(-1, 1);
            let dy = self.rng.range(-1, 1);
            if dx == 0 && dy == 0 {
                continue;
            }
            let candidate = Coord::new(from.x + dx, from.y + dy, from.floor);
            if self.state.floors.in_bounds(candidate) && self.state.floors.is_walkable(candidate) {
                return Some(candidate);
            }
        }
        None
    }

    fn transition(&mut self, enemy_id: UnitId, memory: &mut EnemyMemory, to: AiState) {
        if memory.state == to {
            return;
        }
        self.log.push(LogEvent::EnemyStateChanged { unit: enemy_id, from: memory.state, to });
        memory.state = to;
    }

    fn store_memory(&mut self, enemy_id: UnitId, memory: EnemyMemory) {
        if let Some(unit) = self.state.units.get_mut(enemy_id) {
            unit.memory = Some(memory);
        }
    }
}

/// Smallest spiral ring (radius 0..=2) around `desired` whose first
/// in-bounds walkable tile is unreserved; ring tiles scan in (dy, dx) order.
fn reserve_destination(
    floors: &Floors,
    reserved: &mut BTreeSet<Coord>,
    desired: Coord,
) -> Option<Coord> {
    for radius in 0..=RESERVATION_MAX_RADIUS {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let candidate = Coord::new(desired.x + dx, desired.y + dy, desired.floor);
                if !floors.in_bounds(candidate) || !floors.is_walkable(candidate) {
                    continue;
                }
                if reserved.contains(&candidate) {
                    continue;
                }
                reserved.insert(candidate);
                return Some(candidate);
            }
        }
    }
    None
}

fn facing_cone_contains(facing: Facing, from: Coord, to: Coord) -> bool {
    let (facing_x, facing_y) = match facing {
        Facing::Up => (0.0, -1.0),
        Facing::Down => (0.0, 1.0),
        Facing::Left => (-1.0, 0.0),
        Facing::Right => (1.0, 0.0),
    };
    let dx = (to.x - from.x) as f32;
    let dy = (to.y - from.y) as f32;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return true;
    }
    (dx / length) * facing_x + (dy / length) * facing_y >= VISION_CONE_MIN_DOT
}
