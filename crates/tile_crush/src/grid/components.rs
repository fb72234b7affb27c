use core::time::Duration;

use bevy::prelude::*;
use bevy::utils::HashMap;

use super::board::{TileId, TileKind, COLS, ROWS};

pub const TILE_SIZE: f32 = 70.0;
// slightly under the cell so the grid reads as separate tiles
pub const TILE_SPRITE_SIZE: f32 = 66.0;
pub const SWIPE_THRESHOLD: f32 = 20.0;
pub const PRESSED_SCALE: f32 = 0.9;

pub const SWAP_DURATION: Duration = Duration::from_millis(250);
pub const REMOVE_DURATION: Duration = Duration::from_millis(300);
pub const FALL_DURATION: Duration = Duration::from_millis(300);
pub const SPAWN_DURATION: Duration = Duration::from_millis(500);

// pacing between the refill sub-phases
pub const SPAWN_DELAY: Duration = Duration::from_millis(300);
pub const RECHECK_DELAY: Duration = Duration::from_millis(600);

#[derive(Component)]
pub struct GridTile {
    pub id: TileId,
}

/// Maps arena ids to the sprites representing them.
#[derive(Resource, Default)]
pub struct VisibleBoard(pub HashMap<TileId, Entity>);

/// The tile currently held down, with the press position the release offset
/// is measured against. Cleared after every resolved gesture.
#[derive(Resource, Default)]
pub struct Selection(pub Option<PressedTile>);

#[derive(Clone, Copy)]
pub struct PressedTile {
    pub pos: (usize, usize),
    pub world: Vec2,
}

#[derive(Resource)]
pub struct BoardRng(pub fastrand::Rng);

impl Default for BoardRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

/// The cascade state machine. Doubles as the movement lock: gestures are only
/// accepted while it sits in `Idle`, and `Idle` is only re-entered once a
/// swap has been reverted or a cascade has stabilized.
#[derive(Resource, Default)]
pub enum Resolver {
    #[default]
    Idle,
    Swapping {
        a: (usize, usize),
        b: (usize, usize),
    },
    Reverting,
    Removing {
        matched: Vec<TileId>,
    },
    Falling {
        timer: Timer,
    },
    Spawning {
        timer: Timer,
    },
}

impl Resolver {
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

pub const fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::Red => Color::srgb(1.0, 0.0, 0.0),
        TileKind::Green => Color::srgb(0.0, 1.0, 0.0),
        TileKind::Blue => Color::srgb(0.0, 0.0, 1.0),
        TileKind::Yellow => Color::srgb(1.0, 1.0, 0.0),
        TileKind::Magenta => Color::srgb(1.0, 0.0, 1.0),
        TileKind::Cyan => Color::srgb(0.0, 1.0, 1.0),
    }
}

/// Center of a cell in world space; the board is centered on the origin with
/// row 0 on top.
pub fn cell_to_world(row: usize, col: usize) -> Vec2 {
    Vec2::new(
        col as f32 * TILE_SIZE - (COLS as f32 - 1.0) * TILE_SIZE / 2.0,
        (ROWS as f32 - 1.0) * TILE_SIZE / 2.0 - row as f32 * TILE_SIZE,
    )
}

/// Spawn point for refill tiles: two cell heights above the column's top.
pub fn spawn_origin(col: usize) -> Vec2 {
    let top = cell_to_world(0, col);
    Vec2::new(top.x, top.y + 2.0 * TILE_SIZE)
}

/// Maps a world position back to a cell, or `None` off the grid.
pub fn world_to_cell(position: Vec2) -> Option<(usize, usize)> {
    let col = ((position.x + COLS as f32 * TILE_SIZE / 2.0) / TILE_SIZE).floor() as i32;
    let row = ((ROWS as f32 * TILE_SIZE / 2.0 - position.y) / TILE_SIZE).floor() as i32;
    if row < 0 || row >= ROWS as i32 || col < 0 || col >= COLS as i32 {
        return None;
    }
    Some((row as usize, col as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_centers_round_trip() {
        for row in 0..ROWS {
            for col in 0..COLS {
                assert_eq!(
                    world_to_cell(cell_to_world(row, col)),
                    Some((row, col)),
                    "center of ({row}, {col}) must map back"
                );
            }
        }
    }

    #[test]
    fn positions_off_the_grid_map_to_none() {
        let half = COLS as f32 * TILE_SIZE / 2.0;
        assert_eq!(world_to_cell(Vec2::new(-half - 1.0, 0.0)), None);
        assert_eq!(world_to_cell(Vec2::new(half + 1.0, 0.0)), None);
        assert_eq!(world_to_cell(Vec2::new(0.0, half + 1.0)), None);
        assert_eq!(world_to_cell(Vec2::new(0.0, -half - 1.0)), None);
    }

    #[test]
    fn cell_edges_stay_inside_their_cell() {
        let center = cell_to_world(4, 4);
        let nudge = TILE_SIZE / 2.0 - 0.5;
        for offset in [
            Vec2::new(nudge, 0.0),
            Vec2::new(-nudge, 0.0),
            Vec2::new(0.0, nudge),
            Vec2::new(0.0, -nudge),
        ] {
            assert_eq!(world_to_cell(center + offset), Some((4, 4)));
        }
    }

    #[test]
    fn spawn_origin_sits_above_the_board() {
        for col in 0..COLS {
            assert_eq!(world_to_cell(spawn_origin(col)), None, "column {col}");
            assert!(spawn_origin(col).y > cell_to_world(0, col).y);
        }
    }

    #[test]
    fn resolver_lock_is_held_outside_idle() {
        assert!(Resolver::Idle.is_idle());
        assert!(!Resolver::Reverting.is_idle());
        assert!(!Resolver::Swapping { a: (0, 0), b: (0, 1) }.is_idle());
    }
}
