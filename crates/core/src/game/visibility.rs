//! Field-of-view ray casting and the player's sight bookkeeping.
//! This module exists to keep vision rules deterministic and isolated.
//! It does not own movement resolution or enemy perception policy.

use std::collections::BTreeSet;

use super::*;
use crate::state::Floors;

/// 360-degree ray cast from `origin`, one ray every two degrees, sampled in
/// half-tile steps. An opaque tile is revealed before it terminates its ray,
/// so walls are visible while everything behind them stays dark. Vision
/// never crosses floors.
pub fn compute_fov(floors: &Floors, origin: Coord, range: u32) -> BTreeSet<Coord> {
    let mut visible = BTreeSet::new();
    if !floors.in_bounds(origin) {
        return visible;
    }
    visible.insert(origin);

    let steps_per_ray = range * 2;
    for angle in (0..360).step_by(FOV_ANGLE_STEP_DEGREES) {
        let radians = (angle as f32).to_radians();
        let (dir_x, dir_y) = (radians.cos(), radians.sin());
        let mut ray_x = origin.x as f32 + 0.5;
        let mut ray_y = origin.y as f32 + 0.5;
        for _ in 0..steps_per_ray {
            ray_x += dir_x * FOV_RAY_STEP;
            ray_y += dir_y * FOV_RAY_STEP;
            let tile = Coord::new(ray_x.floor() as i32, ray_y.floor() as i32, origin.floor);
            if !floors.in_bounds(tile) {
                break;
            }
            visible.insert(tile);
            if floors.opacity(tile) >= 1.0 {
                break;
            }
        }
    }
    visible
}

impl Game {
    /// Moves a unit. A player move synchronously recomputes the visible set
    /// at the new position and folds it into the explored set.
    pub fn update_unit_position(&mut self, id: UnitId, pos: Coord) {
        let Some(unit) = self.state.units.get_mut(id) else {
            return;
        };
        unit.pos = pos;
        if unit.kind == UnitKind::Player {
            self.refresh_player_fov();
        }
    }

    /// Host read path for fog of war; the debug switch makes every tile read
    /// as visible without touching the tracked set.
    pub fn is_visible_to_player(&self, pos: Coord) -> bool {
        self.state.debug_fow || self.state.visible.contains(&pos)
    }

    pub(crate) fn refresh_player_fov(&mut self) {
        let Some(player) = self.state.player() else {
            return;
        };
        let visible = compute_fov(&self.state.floors, player.pos, player.status.sight_range);
        self.state.explored.extend(visible.iter().copied());
        self.state.visible = visible;
    }
}

/// Test-only floor sketch used in assertion messages.
#[allow(dead_code)]
pub(crate) fn draw_floor_diag(game: &Game, floor: u8) -> String {
    let floors = &game.state().floors;
    let mut text = String::new();
    for y in 0..floors.height() {
        for x in 0..floors.width() {
            let pos = Coord::new(x, y, floor);
            let glyph = if game.state().units.values().any(|unit| unit.pos == pos) {
                '@'
            } else {
                match floors.tile_at(pos).map(|tile| tile.kind) {
                    Some(TileKind::Wall) => '#',
                    Some(TileKind::StairsUp) => '<',
                    Some(TileKind::StairsDown) => '>',
                    Some(TileKind::Mud) => '~',
                    _ => '.',
                }
            };
            text.push(glyph);
            text.push(if game.state().visible.contains(&pos) { 'v' } else { ' ' });
        }
        text.push('\n');
    }
    text
}
