use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct UnitId;
}

/// Tile-grid position. `x`/`y` address a tile on one floor of the stack;
/// `floor` selects the level. Equality and ordering are component-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub floor: u8,
}

impl Coord {
    pub fn new(x: i32, y: i32, floor: u8) -> Self {
        Self { x, y, floor }
    }

    /// Same (x, y) column, possibly on a different floor.
    pub fn same_column(self, other: Coord) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Manhattan distance on the (x, y) plane. Floor membership is checked
/// separately wherever it matters (attack range, target selection).
pub fn manhattan(a: Coord, b: Coord) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

/// Chebyshev distance on the (x, y) plane.
pub fn chebyshev(a: Coord, b: Coord) -> u32 {
    a.x.abs_diff(b.x).max(a.y.abs_diff(b.y))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TileKind {
    Empty,
    Concrete,
    Mud,
    StairsUp,
    StairsDown,
    Wall,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UnitKind {
    Player,
    Enemy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MovementMode {
    Run,
    Sneak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Decision,
    Execution,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AiState {
    Sleep,
    Wander,
    Chase,
    Search,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionKind {
    Move,
    Attack,
    Climb,
    Wait,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionStatus {
    Queued,
    Executing,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DamageEventId(pub u64);

/// Host-side description of an intent to enqueue. Costs are half-AP units
/// (see `content`); the host computes them from the same path/constant data
/// the core exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub unit: UnitId,
    pub target: Option<Coord>,
    pub target_unit: Option<UnitId>,
    pub cost: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogEvent {
    PhaseChanged { phase: Phase },
    ActionRejected { unit: UnitId, kind: ActionKind },
    MovePathMissing { unit: UnitId, target: Coord },
    MoveBlocked { unit: UnitId, at: Coord },
    AttackLanded { attacker: UnitId, target: UnitId, amount: i32 },
    UnitDied { unit: UnitId, pos: Coord },
    EnemyStateChanged { unit: UnitId, from: AiState, to: AiState },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvanceStopReason {
    /// The queue drained; the world is back in Decision with a fresh timer.
    Drained,
    /// `max_steps` discrete mutations were performed; more remain.
    BudgetExhausted,
    /// `advance` was called outside the Execution phase.
    NotInExecution,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceResult {
    pub executed_steps: u32,
    pub stop_reason: AdvanceStopReason,
}
