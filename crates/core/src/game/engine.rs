//! Phase control and the step-iterator execution loop.
//! This module exists to keep turn cadence, timing and drain order central.
//! It does not own per-action semantics (actions.rs) or enemy planning.

use super::*;
use crate::game::pathfinding::find_path;

impl Game {
    /// Phase transition entry points. Entering Decision regenerates AP for
    /// every unit; entering Execution runs the enemy planner so AI intents
    /// land behind whatever the player queued. Re-setting the current phase
    /// is a no-op.
    pub fn set_phase(&mut self, phase: Phase) {
        if self.state.phase == phase {
            return;
        }
        self.state.phase = phase;
        self.log.push(LogEvent::PhaseChanged { phase });
        match phase {
            Phase::Decision => {
                for (_, unit) in &mut self.state.units {
                    let recovery = unit.status.ap_recovery.unwrap_or(DEFAULT_AP_RECOVERY);
                    unit.status.ap = (unit.status.ap + recovery).min(unit.status.max_ap);
                }
            }
            Phase::Execution => {
                self.queue_cursor = 0;
                self.in_flight = None;
                self.plan_enemy_intents();
            }
        }
    }

    /// Host tick. Advances the damage-event clock, counts the Decision
    /// window down (clamped at zero) and flips into Execution on expiry.
    pub fn update_timer(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.clock_ms += (dt * 1000.0).round() as u64;
        let clock_ms = self.clock_ms;
        self.state
            .damage_events
            .retain(|event| event.timestamp_ms + DAMAGE_EVENT_TTL_MS > clock_ms);

        if self.state.phase != Phase::Decision {
            return;
        }
        self.state.decision_timer = (self.state.decision_timer - dt).max(0.0);
        if self.state.decision_timer <= 0.0 {
            self.set_phase(Phase::Execution);
        }
    }

    /// Performs up to `max_steps` discrete mutations of the execution
    /// drain: one waypoint commit, one attack, one climb, or one skipped
    /// action per step. A real-time host calls this on its animation timer
    /// (one step per 300 ms frame); tests drain synchronously.
    pub fn advance(&mut self, max_steps: u32) -> AdvanceResult {
        if self.state.phase != Phase::Execution {
            return AdvanceResult { executed_steps: 0, stop_reason: AdvanceStopReason::NotInExecution };
        }
        let mut steps = 0;
        while steps < max_steps {
            if !self.step_once() {
                self.finish_execution();
                return AdvanceResult { executed_steps: steps, stop_reason: AdvanceStopReason::Drained };
            }
            steps += 1;
        }
        AdvanceResult { executed_steps: steps, stop_reason: AdvanceStopReason::BudgetExhausted }
    }

    /// Synchronous drain to the Decision boundary. Termination is
    /// structural: every step retires a waypoint or an action.
    pub fn run_execution_to_completion(&mut self) -> AdvanceResult {
        const BATCH: u32 = 1024;
        let mut total = 0;
        loop {
            let result = self.advance(BATCH);
            total += result.executed_steps;
            match result.stop_reason {
                AdvanceStopReason::BudgetExhausted => {}
                stop_reason => {
                    return AdvanceResult { executed_steps: total, stop_reason };
                }
            }
        }
    }

    /// One discrete mutation. Returns false when the queue is spent.
    fn step_once(&mut self) -> bool {
        if self.in_flight.is_some() {
            self.commit_move_step();
            return true;
        }
        let Some(action) = self.state.action_queue.get(self.queue_cursor).copied() else {
            return false;
        };
        self.mark_action(action.id, ActionStatus::Executing);
        match action.kind {
            ActionKind::Move => {
                if self.begin_move(action) {
                    self.commit_move_step();
                }
            }
            ActionKind::Attack => {
                self.resolve_attack(action);
                self.complete_action(action.id);
            }
            ActionKind::Climb => {
                self.resolve_climb(action);
                self.complete_action(action.id);
            }
            ActionKind::Wait => {
                self.complete_action(action.id);
            }
        }
        true
    }

    /// Re-plans the move against live world state. The path is fixed for
    /// the duration of this action; occupancy stays live per waypoint.
    fn begin_move(&mut self, action: Action) -> bool {
        let Some(target) = action.target else {
            self.complete_action(action.id);
            return false;
        };
        let Some(unit) = self.state.units.get(action.unit) else {
            self.complete_action(action.id);
            return false;
        };
        match find_path(unit.pos, target, &self.state.floors, &self.state.units, action.unit) {
            Some(path) if path.len() > 1 => {
                self.in_flight =
                    Some(InFlightMove { action: action.id, unit: action.unit, path, next_index: 1 });
                true
            }
            Some(_) => {
                // Already standing on the target.
                self.complete_action(action.id);
                false
            }
            None => {
                self.log.push(LogEvent::MovePathMissing { unit: action.unit, target });
                self.complete_action(action.id);
                false
            }
        }
    }

    fn commit_move_step(&mut self) {
        let Some(mut flight) = self.in_flight.take() else {
            return;
        };
        let Some(unit) = self.state.units.get(flight.unit) else {
            self.complete_action(flight.action);
            return;
        };
        let mover_kind = unit.kind;
        let current = unit.pos;
        let waypoint = flight.path[flight.next_index];
        let is_final = flight.next_index + 1 == flight.path.len();

        if let Some(blocker_id) = self.state.occupant_other_than(waypoint, flight.unit) {
            let blocker_kind = self.state.units[blocker_id].kind;
            let passes_through =
                !is_final && mover_kind == UnitKind::Player && blocker_kind == UnitKind::Enemy;
            if !passes_through {
                self.log.push(LogEvent::MoveBlocked { unit: flight.unit, at: waypoint });
                self.complete_action(flight.action);
                return;
            }
        }

        if let Some(unit) = self.state.units.get_mut(flight.unit) {
            unit.facing = facing_from_step(current, waypoint);
        }
        self.update_unit_position(flight.unit, waypoint);
        flight.next_index += 1;
        if flight.next_index < flight.path.len() {
            self.in_flight = Some(flight);
        } else {
            self.complete_action(flight.action);
        }
    }

    fn complete_action(&mut self, id: ActionId) {
        self.mark_action(id, ActionStatus::Completed);
        self.queue_cursor += 1;
    }

    fn mark_action(&mut self, id: ActionId, status: ActionStatus) {
        if let Some(action) = self.state.action_queue.iter_mut().find(|action| action.id == id) {
            action.status = status;
        }
    }

    fn finish_execution(&mut self) {
        self.state.action_queue.clear();
        self.queue_cursor = 0;
        self.in_flight = None;
        self.set_phase(Phase::Decision);
        self.state.decision_timer = DECISION_TIMER_SECONDS;
    }
}

pub(super) fn facing_from_step(from: Coord, to: Coord) -> Facing {
    let dy = to.y - from.y;
    let dx = to.x - from.x;
    if dy < 0 {
        Facing::Up
    } else if dy > 0 {
        Facing::Down
    } else if dx < 0 {
        Facing::Left
    } else {
        Facing::Right
    }
}
