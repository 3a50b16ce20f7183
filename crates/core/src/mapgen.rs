//! Seeded generation of the floor stack and starting spawns.
//! This module exists so world layout is a pure function of the RNG stream.
//! It does not own unit stat blocks or any post-spawn simulation state.

use crate::content::*;
use crate::rng::Lcg;
use crate::state::Floors;
use crate::types::{Coord, TileKind, chebyshev, manhattan};

#[derive(Clone, Debug)]
pub struct GeneratedWorld {
    pub floors: Floors,
    pub player_spawn: Coord,
    pub enemy_spawns: Vec<Coord>,
}

impl GeneratedWorld {
    /// Byte-exact encoding of the generated layout for bit-identity checks.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(self.floors.width().to_le_bytes());
        bytes.extend(self.floors.height().to_le_bytes());
        bytes.push(self.floors.floor_count());
        for floor in 0..self.floors.floor_count() {
            for y in 0..self.floors.height() {
                for x in 0..self.floors.width() {
                    let tile = self
                        .floors
                        .tile_at(Coord::new(x, y, floor))
                        .expect("iterated coordinate is in bounds");
                    bytes.push(match tile.kind {
                        TileKind::Empty => 0,
                        TileKind::Concrete => 1,
                        TileKind::Mud => 2,
                        TileKind::StairsUp => 3,
                        TileKind::StairsDown => 4,
                        TileKind::Wall => 5,
                    });
                }
            }
        }
        push_coord(&mut bytes, self.player_spawn);
        bytes.extend((self.enemy_spawns.len() as u32).to_le_bytes());
        for &spawn in &self.enemy_spawns {
            push_coord(&mut bytes, spawn);
        }
        bytes
    }
}

fn push_coord(bytes: &mut Vec<u8>, pos: Coord) {
    bytes.extend(pos.x.to_le_bytes());
    bytes.extend(pos.y.to_le_bytes());
    bytes.push(pos.floor);
}

/// Generates the default-sized world from the shared RNG stream.
pub fn generate(rng: &mut Lcg) -> GeneratedWorld {
    generate_with_dims(rng, MAP_WIDTH, MAP_HEIGHT, FLOOR_COUNT)
}

/// Same pipeline with explicit dimensions. Small grids still terminate:
/// every rejection-sampling loop is attempt-capped with a deterministic
/// fallback (stairs) or abandonment (enemies).
pub fn generate_with_dims(rng: &mut Lcg, width: i32, height: i32, floor_count: u8) -> GeneratedWorld {
    let mut floors = Floors::new(width, height, floor_count, TileKind::Concrete);

    // Noise fill: row-major per floor, one roll per tile.
    for floor in 0..floor_count {
        for y in 0..height {
            for x in 0..width {
                if rng.next() < WALL_DENSITY {
                    floors.set_kind(Coord::new(x, y, floor), TileKind::Wall);
                }
            }
        }
    }

    let center = Coord::new(width / 2, height / 2, 0);
    carve_plaza(&mut floors, center);
    place_stairs(&mut floors, rng, center);

    let enemy_count = ENEMY_COUNT_BASE + (rng.next() * ENEMY_COUNT_SPREAD).floor() as i32;
    let mut enemy_spawns = Vec::with_capacity(enemy_count as usize);
    for _ in 0..enemy_count {
        if let Some(spawn) = sample_enemy_spawn(&floors, rng, center, &enemy_spawns) {
            enemy_spawns.push(spawn);
        }
    }

    GeneratedWorld { floors, player_spawn: center, enemy_spawns }
}

fn carve_plaza(floors: &mut Floors, center: Coord) {
    for dy in -PLAZA_HALF_EXTENT..=PLAZA_HALF_EXTENT {
        for dx in -PLAZA_HALF_EXTENT..=PLAZA_HALF_EXTENT {
            let pos = Coord::new(center.x + dx, center.y + dy, 0);
            if floors.in_bounds(pos) {
                floors.set_kind(pos, TileKind::Concrete);
            }
        }
    }
}

/// Rejection-samples a stair column in the inner bounds until it clears the
/// plaza by Chebyshev distance, then stamps the connected pair. On grids too
/// small to satisfy the rule the fallback scan keeps generation total.
fn place_stairs(floors: &mut Floors, rng: &mut Lcg, center: Coord) {
    let width = floors.width();
    let height = floors.height();
    if width < 3 || height < 3 {
        return;
    }

    let mut column = None;
    for _ in 0..STAIR_SAMPLE_ATTEMPTS {
        let sx = rng.range(1, width - 2);
        let sy = rng.range(1, height - 2);
        let candidate = Coord::new(sx, sy, 0);
        if chebyshev(candidate, center) >= STAIR_MIN_PLAZA_CHEBYSHEV {
            column = Some(candidate);
            break;
        }
    }
    let column = column.unwrap_or_else(|| farthest_inner_tile(width, height, center));

    floors.set_kind(column, TileKind::StairsUp);
    if floors.floor_count() > 1 {
        floors.set_kind(Coord::new(column.x, column.y, 1), TileKind::StairsDown);
    }
}

fn farthest_inner_tile(width: i32, height: i32, center: Coord) -> Coord {
    let mut best = Coord::new(1, 1, 0);
    let mut best_distance = 0;
    for y in 1..(height - 1) {
        for x in 1..(width - 1) {
            let pos = Coord::new(x, y, 0);
            let distance = chebyshev(pos, center);
            if distance > best_distance {
                best = pos;
                best_distance = distance;
            }
        }
    }
    best
}

fn sample_enemy_spawn(
    floors: &Floors,
    rng: &mut Lcg,
    center: Coord,
    taken: &[Coord],
) -> Option<Coord> {
    for _ in 0..ENEMY_SPAWN_ATTEMPTS {
        let x = rng.range(0, floors.width() - 1);
        let y = rng.range(0, floors.height() - 1);
        let pos = Coord::new(x, y, 0);
        if !floors.is_walkable(pos) {
            continue;
        }
        if manhattan(pos, center) <= ENEMY_SPAWN_MIN_PLAZA_MANHATTAN {
            continue;
        }
        if pos == center || taken.contains(&pos) {
            continue;
        }
        return Some(pos);
    }
    None
}
