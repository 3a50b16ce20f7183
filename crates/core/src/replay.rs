//! Journal replay: a thin host emulation over the core mutators.
//! This module exists so determinism is testable end to end — seed plus
//! recorded inputs must reconstruct a run bit for bit.
//! It does not own any simulation rules; costs are derived the way a real
//! input layer would derive them.

use crate::content::{ATTACK_COST, CLIMB_COST, SimConfig};
use crate::game::Game;
use crate::game::pathfinding::{find_path, path_cost};
use crate::journal::{HostCommand, InputJournal};
use crate::types::{ActionKind, ActionSpec, AdvanceStopReason, Phase};

#[derive(Debug, PartialEq, Eq)]
pub enum ReplayError {
    /// The execution drain failed to reach a Decision boundary within the
    /// batch budget. Indicates a core bug, not bad input.
    SimulationStalled,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_snapshot_hash: u64,
    pub final_phase: Phase,
    pub commands_applied: usize,
}

const MAX_DRAIN_BATCHES: u32 = 512;
const DRAIN_BATCH_STEPS: u32 = 256;

pub fn replay_to_end(journal: &InputJournal, config: SimConfig) -> Result<ReplayResult, ReplayError> {
    let mut game = Game::new(journal.seed, config);
    let mut commands_applied = 0;
    for record in &journal.inputs {
        apply_command(&mut game, &record.command)?;
        commands_applied += 1;
    }
    Ok(ReplayResult {
        final_snapshot_hash: game.snapshot_hash(),
        final_phase: game.state().phase,
        commands_applied,
    })
}

/// Translates one host command into core calls. Unresolvable commands (no
/// path, nobody at the attack tile, dead player) degrade to no-ops, matching
/// the tolerant-mutator policy.
pub fn apply_command(game: &mut Game, command: &HostCommand) -> Result<(), ReplayError> {
    let player = game.player_id();
    match command {
        HostCommand::QueueMove { to } => {
            let Some(unit) = game.state().units.get(player) else {
                return Ok(());
            };
            let from = unit.pos;
            if let Some(path) =
                find_path(from, *to, &game.state().floors, &game.state().units, player)
            {
                let cost = path_cost(&path, &game.state().units, player);
                game.queue_action(ActionSpec {
                    kind: ActionKind::Move,
                    unit: player,
                    target: Some(*to),
                    target_unit: None,
                    cost,
                });
            }
        }
        HostCommand::QueueAttack { at } => {
            if let Some(target) = game.state().unit_at(*at) {
                game.queue_action(ActionSpec {
                    kind: ActionKind::Attack,
                    unit: player,
                    target: None,
                    target_unit: Some(target),
                    cost: ATTACK_COST,
                });
            }
        }
        HostCommand::QueueClimb => {
            game.queue_action(ActionSpec {
                kind: ActionKind::Climb,
                unit: player,
                target: None,
                target_unit: None,
                cost: CLIMB_COST,
            });
        }
        HostCommand::QueueWait => {
            game.queue_action(ActionSpec {
                kind: ActionKind::Wait,
                unit: player,
                target: None,
                target_unit: None,
                cost: 0,
            });
        }
        HostCommand::CancelAction => game.cancel_action(),
        HostCommand::ToggleSneak => game.toggle_sneak(player),
        HostCommand::ToggleDebugFow => game.toggle_debug_fow(),
        HostCommand::Tick { millis } => {
            game.update_timer(*millis as f32 / 1000.0);
            if game.state().phase == Phase::Execution {
                drain_execution(game)?;
            }
        }
    }
    Ok(())
}

fn drain_execution(game: &mut Game) -> Result<(), ReplayError> {
    for _ in 0..MAX_DRAIN_BATCHES {
        match game.advance(DRAIN_BATCH_STEPS).stop_reason {
            AdvanceStopReason::BudgetExhausted => {}
            AdvanceStopReason::Drained | AdvanceStopReason::NotInExecution => return Ok(()),
        }
    }
    Err(ReplayError::SimulationStalled)
}
