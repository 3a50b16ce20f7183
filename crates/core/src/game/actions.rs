//! Intent queueing and the per-action resolution rules.
//! This module exists to keep AP accounting and single-action semantics in
//! one place for both the host and the execution loop.
//! It does not own phase transitions or the step-by-step drain order.

use super::*;
use crate::game::engine::facing_from_step;

impl Game {
    /// Appends an intent, pre-debiting its cost from the acting unit. An
    /// unknown unit or an unaffordable cost rejects the intent (logged);
    /// affordability is the host's job to check up front.
    pub fn queue_action(&mut self, spec: ActionSpec) -> Option<ActionId> {
        let Some(unit) = self.state.units.get_mut(spec.unit) else {
            return None;
        };
        if spec.cost > 0 {
            if unit.status.ap < spec.cost {
                self.log.push(LogEvent::ActionRejected { unit: spec.unit, kind: spec.kind });
                return None;
            }
            unit.status.ap -= spec.cost;
        }
        let id = ActionId(self.next_action_id);
        self.next_action_id += 1;
        self.state.action_queue.push(Action {
            id,
            kind: spec.kind,
            unit: spec.unit,
            target: spec.target,
            target_unit: spec.target_unit,
            cost: spec.cost,
            status: ActionStatus::Queued,
        });
        Some(id)
    }

    /// Pops the most recent intent and refunds its cost. Only meaningful
    /// during Decision; once Execution starts the queue drains to the end.
    pub fn cancel_action(&mut self) {
        if self.state.phase != Phase::Decision {
            return;
        }
        let Some(action) = self.state.action_queue.pop() else {
            return;
        };
        if let Some(unit) = self.state.units.get_mut(action.unit) {
            unit.status.ap = (unit.status.ap + action.cost).min(unit.status.max_ap);
        }
    }

    /// Empties the queue without refunds.
    pub fn clear_action_queue(&mut self) {
        self.state.action_queue.clear();
        self.queue_cursor = 0;
        self.in_flight = None;
    }

    /// Melee strike: both units present, same floor, in reach. Anything
    /// else skips silently — ranges are re-checked at execution time, not
    /// trusted from planning.
    pub(super) fn resolve_attack(&mut self, action: Action) {
        let Some(target_id) = action.target_unit else {
            return;
        };
        let Some(attacker) = self.state.units.get(action.unit) else {
            return;
        };
        let Some(target) = self.state.units.get(target_id) else {
            return;
        };
        if attacker.pos.floor != target.pos.floor {
            return;
        }
        let attacker_pos = attacker.pos;
        let target_pos = target.pos;
        if manhattan(attacker_pos, target_pos) > ATTACK_RANGE {
            return;
        }
        if let Some(unit) = self.state.units.get_mut(action.unit) {
            unit.facing = facing_from_step(attacker_pos, target_pos);
        }
        self.log.push(LogEvent::AttackLanded {
            attacker: action.unit,
            target: target_id,
            amount: ATTACK_DAMAGE,
        });
        self.apply_damage(target_id, ATTACK_DAMAGE);
    }

    /// Stair traversal: the unit must stand on a stair tile whose direction
    /// stays inside the floor stack.
    pub(super) fn resolve_climb(&mut self, action: Action) {
        let Some(unit) = self.state.units.get(action.unit) else {
            return;
        };
        let pos = unit.pos;
        let target_floor = match self.state.floors.tile_at(pos).map(|tile| tile.kind) {
            Some(TileKind::StairsUp) => pos.floor.checked_add(1),
            Some(TileKind::StairsDown) => pos.floor.checked_sub(1),
            _ => None,
        };
        let Some(floor) = target_floor else {
            return;
        };
        if floor >= self.state.floors.floor_count() {
            return;
        }
        self.update_unit_position(action.unit, Coord::new(pos.x, pos.y, floor));
    }
}
