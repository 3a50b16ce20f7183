//! Locked tuning constants and spawn stat blocks.
//! Centralizing these keeps the simulation rules auditable in one place.

/// AP bookkeeping uses integer half-points so that every cost the game
/// charges (1.0 straight, 1.5 diagonal, 3.0 attack/climb/pass-through) is
/// exact and totally ordered. 2 half-points = 1.0 AP.
pub const AP_HALF_POINTS_PER_POINT: u32 = 2;

pub const MAP_WIDTH: i32 = 20;
pub const MAP_HEIGHT: i32 = 20;
pub const FLOOR_COUNT: u8 = 2;
pub const WALL_DENSITY: f64 = 0.2;
pub const PLAZA_HALF_EXTENT: i32 = 2;
pub const STAIR_MIN_PLAZA_CHEBYSHEV: u32 = 5;
pub const STAIR_SAMPLE_ATTEMPTS: u32 = 100;

pub const ENEMY_COUNT_BASE: i32 = 3;
pub const ENEMY_COUNT_SPREAD: f64 = 3.0;
pub const ENEMY_SPAWN_MIN_PLAZA_MANHATTAN: u32 = 6;
pub const ENEMY_SPAWN_ATTEMPTS: u32 = 100;

pub const STRAIGHT_STEP_COST: u32 = 2;
pub const DIAGONAL_STEP_COST: u32 = 3;
pub const PASS_THROUGH_COST: u32 = 6;
pub const ATTACK_COST: u32 = 6;
pub const ATTACK_DAMAGE: i32 = 1;
pub const ATTACK_RANGE: u32 = 1;
pub const CLIMB_COST: u32 = 6;

pub const DECISION_TIMER_SECONDS: f32 = 5.0;
pub const DAMAGE_EVENT_TTL_MS: u64 = 1500;

pub const DEFAULT_AP_RECOVERY: u32 = 10;
pub const DEFAULT_NOISE_LEVEL: u32 = 3;

pub const FOV_ANGLE_STEP_DEGREES: usize = 2;
pub const FOV_RAY_STEP: f32 = 0.5;

pub const WANDER_ROLL_ATTEMPTS: u32 = 3;
pub const RESERVATION_MAX_RADIUS: i32 = 2;
pub const VISION_CONE_MIN_DOT: f32 = 0.3;

pub struct StatBlock {
    pub hp: i32,
    pub ap: u32,
    pub ap_recovery: u32,
    pub sight_range: u32,
    pub noise_level: Option<u32>,
}

pub const PLAYER_STATS: StatBlock =
    StatBlock { hp: 100, ap: 20, ap_recovery: 10, sight_range: 10, noise_level: Some(3) };

pub const ENEMY_STATS: StatBlock =
    StatBlock { hp: 3, ap: 16, ap_recovery: 8, sight_range: 7, noise_level: None };

/// Optional behavior switches. The defaults match the shipped rule set;
/// the cone restricts enemy sight to a 120-degree arc along facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimConfig {
    pub enemy_vision_cone: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { enemy_vision_cone: false }
    }
}
