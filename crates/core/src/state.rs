use std::collections::BTreeSet;

use slotmap::SlotMap;

use crate::content::DEFAULT_NOISE_LEVEL;
use crate::types::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMeta {
    /// Movement-sound multiplier applied by host-side audio cues.
    pub noise_coefficient: f32,
    pub spawn_weight: f32,
    pub interactable: bool,
    /// In [0, 1]; >= 1 blocks vision.
    pub opacity: f32,
    pub walkable: bool,
}

impl TileMeta {
    pub fn for_kind(kind: TileKind) -> Self {
        match kind {
            TileKind::Empty => Self {
                noise_coefficient: 1.0,
                spawn_weight: 0.0,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileKind::Concrete => Self {
                noise_coefficient: 1.0,
                spawn_weight: 1.0,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileKind::Mud => Self {
                noise_coefficient: 0.5,
                spawn_weight: 1.0,
                interactable: false,
                opacity: 0.0,
                walkable: true,
            },
            TileKind::StairsUp | TileKind::StairsDown => Self {
                noise_coefficient: 1.0,
                spawn_weight: 0.0,
                interactable: true,
                opacity: 0.0,
                walkable: true,
            },
            TileKind::Wall => Self {
                noise_coefficient: 0.0,
                spawn_weight: 0.0,
                interactable: false,
                opacity: 1.0,
                walkable: false,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub meta: TileMeta,
}

impl Tile {
    pub fn new(kind: TileKind) -> Self {
        Self { kind, meta: TileMeta::for_kind(kind) }
    }
}

/// The full floor stack. All floors share one width and height, fixed at
/// creation; tiles are stored row-major per floor.
#[derive(Clone, Debug)]
pub struct Floors {
    width: i32,
    height: i32,
    levels: Vec<Vec<Tile>>,
}

impl Floors {
    pub fn new(width: i32, height: i32, floor_count: u8, fill: TileKind) -> Self {
        let per_floor = (width as usize) * (height as usize);
        let levels = (0..floor_count).map(|_| vec![Tile::new(fill); per_floor]).collect();
        Self { width, height, levels }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn floor_count(&self) -> u8 {
        self.levels.len() as u8
    }

    pub fn in_bounds(&self, pos: Coord) -> bool {
        (pos.floor as usize) < self.levels.len()
            && pos.x >= 0
            && pos.y >= 0
            && pos.x < self.width
            && pos.y < self.height
    }

    pub fn tile_at(&self, pos: Coord) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(&self.levels[pos.floor as usize][self.index(pos)])
    }

    /// No-op out of bounds. Metadata is re-derived from the new kind.
    pub fn set_kind(&mut self, pos: Coord, kind: TileKind) {
        if !self.in_bounds(pos) {
            return;
        }
        let idx = self.index(pos);
        self.levels[pos.floor as usize][idx] = Tile::new(kind);
    }

    /// Static walkability; out-of-bounds reads as blocked.
    pub fn is_walkable(&self, pos: Coord) -> bool {
        self.tile_at(pos).is_some_and(|tile| tile.meta.walkable)
    }

    /// Out-of-bounds reads as fully opaque.
    pub fn opacity(&self, pos: Coord) -> f32 {
        self.tile_at(pos).map_or(1.0, |tile| tile.meta.opacity)
    }

    fn index(&self, pos: Coord) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitStatus {
    pub hp: i32,
    pub max_hp: i32,
    /// Half-AP units; 2 half-points = 1.0 AP.
    pub ap: u32,
    pub max_ap: u32,
    pub ap_recovery: Option<u32>,
    pub sight_range: u32,
    pub is_injured: bool,
    pub noise_level: Option<u32>,
    pub movement_mode: MovementMode,
}

impl UnitStatus {
    /// Audible radius used by enemy perception; hosts clamp this to zero
    /// while sneaking before it reaches the planner.
    pub fn noise_level_or_default(&self) -> u32 {
        self.noise_level.unwrap_or(DEFAULT_NOISE_LEVEL)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyMemory {
    pub state: AiState,
    pub last_known_target_pos: Option<Coord>,
}

impl Default for EnemyMemory {
    fn default() -> Self {
        Self { state: AiState::Sleep, last_known_target_pos: None }
    }
}

#[derive(Clone, Debug)]
pub struct Unit {
    pub id: UnitId,
    pub kind: UnitKind,
    pub name: String,
    pub pos: Coord,
    pub status: UnitStatus,
    pub facing: Facing,
    /// Present iff kind == Enemy.
    pub memory: Option<EnemyMemory>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    pub unit: UnitId,
    pub target: Option<Coord>,
    pub target_unit: Option<UnitId>,
    pub cost: u32,
    pub status: ActionStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageEvent {
    pub id: DamageEventId,
    pub pos: Coord,
    pub amount: i32,
    /// Milliseconds on the host-tick clock at creation time; events expire
    /// 1500 ms later.
    pub timestamp_ms: u64,
}

/// Central mutable snapshot. The world owns the floor stack, every unit and
/// the intent queue; units refer to each other by id only. Hosts read this
/// freely but mutate exclusively through the `Game` operations.
#[derive(Clone, Debug)]
pub struct World {
    pub floors: Floors,
    pub units: SlotMap<UnitId, Unit>,
    pub player_id: UnitId,
    pub phase: Phase,
    /// Seconds remaining in the Decision window.
    pub decision_timer: f32,
    pub action_queue: Vec<Action>,
    pub seed: u32,
    /// The player's current field of view.
    pub visible: BTreeSet<Coord>,
    /// Monotone union of every field of view the player has had.
    pub explored: BTreeSet<Coord>,
    pub debug_fow: bool,
    pub damage_events: Vec<DamageEvent>,
}

impl World {
    pub fn player(&self) -> Option<&Unit> {
        self.units.get(self.player_id)
    }

    /// First unit standing on `pos`, in key order.
    pub fn unit_at(&self, pos: Coord) -> Option<UnitId> {
        self.units.iter().find(|(_, unit)| unit.pos == pos).map(|(id, _)| id)
    }

    /// A unit other than `mover` standing on `pos`, if any.
    pub fn occupant_other_than(&self, pos: Coord, mover: UnitId) -> Option<UnitId> {
        self.units
            .iter()
            .find(|(id, unit)| *id != mover && unit.pos == pos)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_metadata_blocks_movement_and_vision() {
        let meta = TileMeta::for_kind(TileKind::Wall);
        assert!(!meta.walkable);
        assert!(meta.opacity >= 1.0);
    }

    #[test]
    fn stair_metadata_is_walkable_transparent_and_interactable() {
        for kind in [TileKind::StairsUp, TileKind::StairsDown] {
            let meta = TileMeta::for_kind(kind);
            assert!(meta.walkable, "{kind:?} must be walkable");
            assert_eq!(meta.opacity, 0.0, "{kind:?} must be transparent");
            assert!(meta.interactable);
        }
    }

    #[test]
    fn floors_out_of_bounds_reads_are_tolerant() {
        let floors = Floors::new(4, 4, 2, TileKind::Concrete);
        let outside = Coord::new(-1, 0, 0);
        let above = Coord::new(1, 1, 2);
        assert!(floors.tile_at(outside).is_none());
        assert!(floors.tile_at(above).is_none());
        assert!(!floors.is_walkable(outside));
        assert_eq!(floors.opacity(above), 1.0);
    }

    #[test]
    fn set_kind_rederives_metadata() {
        let mut floors = Floors::new(4, 4, 1, TileKind::Concrete);
        let pos = Coord::new(2, 2, 0);
        floors.set_kind(pos, TileKind::Wall);
        assert!(!floors.is_walkable(pos));
        floors.set_kind(pos, TileKind::StairsUp);
        assert!(floors.is_walkable(pos));
        assert_eq!(floors.tile_at(pos).map(|tile| tile.kind), Some(TileKind::StairsUp));
    }
}
