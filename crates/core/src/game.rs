pub mod actions;
pub mod engine;
pub mod pathfinding;
pub mod planner;
pub mod visibility;

#[cfg(test)]
pub mod test_support;

use std::collections::BTreeSet;

use slotmap::SlotMap;

use crate::content::*;
use crate::mapgen;
use crate::rng::Lcg;
use crate::state::*;
use crate::types::*;

/// A move intent mid-resolution: the path was fixed when the action started
/// executing, occupancy is re-checked as each waypoint commits.
#[derive(Clone, Debug)]
pub(crate) struct InFlightMove {
    pub(crate) action: ActionId,
    pub(crate) unit: UnitId,
    pub(crate) path: Vec<Coord>,
    pub(crate) next_index: usize,
}

/// The simulation facade. Owns the world, the seeded RNG, the event log and
/// the execution cursor; every mutation funnels through its operations.
/// Hosts hold one `Game` and pass nothing else around.
pub struct Game {
    seed: u32,
    rng: Lcg,
    config: SimConfig,
    state: World,
    log: Vec<LogEvent>,
    next_action_id: u64,
    next_damage_event_id: u64,
    /// Milliseconds of host ticks accumulated since init; timestamps and
    /// expiry of damage events are measured on this clock.
    clock_ms: u64,
    queue_cursor: usize,
    in_flight: Option<InFlightMove>,
}

impl Game {
    pub fn new(seed: u32, config: SimConfig) -> Self {
        let mut rng = Lcg::new(seed);
        let generated = mapgen::generate(&mut rng);

        let mut units: SlotMap<UnitId, Unit> = SlotMap::with_key();
        let player_id = units.insert(Unit {
            id: UnitId::default(),
            kind: UnitKind::Player,
            name: "player".to_string(),
            pos: generated.player_spawn,
            status: status_from(&PLAYER_STATS),
            facing: Facing::Down,
            memory: None,
        });
        units[player_id].id = player_id;

        for (index, &spawn) in generated.enemy_spawns.iter().enumerate() {
            let enemy_id = units.insert(Unit {
                id: UnitId::default(),
                kind: UnitKind::Enemy,
                name: format!("enemy-{}", index + 1),
                pos: spawn,
                status: status_from(&ENEMY_STATS),
                facing: Facing::Down,
                memory: Some(EnemyMemory::default()),
            });
            units[enemy_id].id = enemy_id;
        }

        let mut game = Self {
            seed,
            rng,
            config,
            state: World {
                floors: generated.floors,
                units,
                player_id,
                phase: Phase::Decision,
                decision_timer: DECISION_TIMER_SECONDS,
                action_queue: Vec::new(),
                seed,
                visible: BTreeSet::new(),
                explored: BTreeSet::new(),
                debug_fow: false,
                damage_events: Vec::new(),
            },
            log: Vec::new(),
            next_action_id: 0,
            next_damage_event_id: 0,
            clock_ms: 0,
            queue_cursor: 0,
            in_flight: None,
        };
        game.refresh_player_fov();
        game
    }

    /// Regenerates everything from a new seed; all fields return to their
    /// initial-game defaults.
    pub fn reset(&mut self, seed: u32) {
        *self = Self::new(seed, self.config);
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &World {
        &self.state
    }

    pub fn player_id(&self) -> UnitId {
        self.state.player_id
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    /// Merges a partial status update into a unit; hp/ap are clamped into
    /// range and the injury flag is re-derived. Missing unit is a no-op.
    pub fn update_unit_status(&mut self, id: UnitId, patch: StatusPatch) {
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        if let Some(hp) = patch.hp {
            unit.status.hp = hp.clamp(0, unit.status.max_hp);
        }
        if let Some(ap) = patch.ap {
            unit.status.ap = ap.min(unit.status.max_ap);
        }
        if let Some(mode) = patch.movement_mode {
            unit.status.movement_mode = mode;
        }
        if let Some(noise_level) = patch.noise_level {
            unit.status.noise_level = noise_level;
        }
        unit.status.is_injured = unit.status.hp < unit.status.max_hp / 2;
    }

    /// Subtracts hp and records a damage event at the victim's tile. A unit
    /// dropping to zero is removed from the world and its death logged.
    pub fn apply_damage(&mut self, id: UnitId, amount: i32) {
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        unit.status.hp -= amount;
        let pos = unit.pos;
        if unit.status.hp <= 0 {
            self.state.units.remove(id);
            self.log.push(LogEvent::UnitDied { unit: id, pos });
        } else {
            unit.status.is_injured = unit.status.hp < unit.status.max_hp / 2;
        }
        let event_id = DamageEventId(self.next_damage_event_id);
        self.next_damage_event_id += 1;
        self.state.damage_events.push(DamageEvent {
            id: event_id,
            pos,
            amount,
            timestamp_ms: self.clock_ms,
        });
    }

    pub fn remove_damage_event(&mut self, id: DamageEventId) {
        self.state.damage_events.retain(|event| event.id != id);
    }

    /// Renderer escape hatch: everything reads as visible while set. The
    /// true visible set keeps tracking underneath.
    pub fn toggle_debug_fow(&mut self) {
        self.state.debug_fow = !self.state.debug_fow;
    }

    pub fn toggle_sneak(&mut self, id: UnitId) {
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        unit.status.movement_mode = match unit.status.movement_mode {
            MovementMode::Run => MovementMode::Sneak,
            MovementMode::Sneak => MovementMode::Run,
        };
    }

    /// Canonical digest of the observable world, for determinism checks.
    pub fn snapshot_hash(&self) -> u64 {
        use std::hash::Hasher;
        use xxhash_rust::xxh3::Xxh3;

        let mut hasher = Xxh3::new();
        hasher.write_u32(self.seed);
        hasher.write_u64(self.clock_ms);
        hasher.write_u8(phase_code(self.state.phase));
        hasher.write_u32(self.state.decision_timer.to_bits());

        for (_, unit) in &self.state.units {
            hasher.write_u8(match unit.kind {
                UnitKind::Player => 0,
                UnitKind::Enemy => 1,
            });
            write_coord(&mut hasher, unit.pos);
            hasher.write_i32(unit.status.hp);
            hasher.write_u32(unit.status.ap);
            hasher.write_u8(unit.status.is_injured as u8);
            hasher.write_u8(match unit.status.movement_mode {
                MovementMode::Run => 0,
                MovementMode::Sneak => 1,
            });
            if let Some(memory) = unit.memory {
                hasher.write_u8(match memory.state {
                    AiState::Sleep => 0,
                    AiState::Wander => 1,
                    AiState::Chase => 2,
                    AiState::Search => 3,
                });
                if let Some(last_known) = memory.last_known_target_pos {
                    write_coord(&mut hasher, last_known);
                }
            }
        }

        hasher.write_usize(self.state.action_queue.len());
        for action in &self.state.action_queue {
            hasher.write_u8(match action.kind {
                ActionKind::Move => 0,
                ActionKind::Attack => 1,
                ActionKind::Climb => 2,
                ActionKind::Wait => 3,
            });
            hasher.write_u32(action.cost);
            if let Some(target) = action.target {
                write_coord(&mut hasher, target);
            }
        }

        hasher.write_usize(self.state.visible.len());
        hasher.write_usize(self.state.explored.len());
        hasher.write_usize(self.state.damage_events.len());
        hasher.finish()
    }
}

/// Partial status merge for `update_unit_status`. Absent fields keep their
/// current values; `noise_level: Some(None)` clears the override.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatusPatch {
    pub hp: Option<i32>,
    pub ap: Option<u32>,
    pub movement_mode: Option<MovementMode>,
    pub noise_level: Option<Option<u32>>,
}

fn status_from(stats: &StatBlock) -> UnitStatus {
    UnitStatus {
        hp: stats.hp,
        max_hp: stats.hp,
        ap: stats.ap,
        max_ap: stats.ap,
        ap_recovery: Some(stats.ap_recovery),
        sight_range: stats.sight_range,
        is_injured: false,
        noise_level: stats.noise_level,
        movement_mode: MovementMode::Run,
    }
}

fn phase_code(phase: Phase) -> u8 {
    match phase {
        Phase::Decision => 0,
        Phase::Execution => 1,
    }
}

fn write_coord<H: std::hash::Hasher>(hasher: &mut H, pos: Coord) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
    hasher.write_u8(pos.floor);
}
