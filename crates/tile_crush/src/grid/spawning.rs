use bevy::prelude::*;
use bevy::utils::HashMap;

use super::board::Board;
use super::components::{cell_to_world, tile_color, BoardRng, GridTile, VisibleBoard, TILE_SPRITE_SIZE};

/// Builds the initial match-free board and one sprite per tile.
pub fn spawn_board(mut commands: Commands, mut rng: ResMut<BoardRng>) {
    let board = Board::filled(&mut rng.0);
    let mut sprites = HashMap::default();

    for (id, tile) in board.tiles() {
        let entity = commands
            .spawn((
                Sprite::from_color(tile_color(tile.kind), Vec2::splat(TILE_SPRITE_SIZE)),
                Transform::from_translation(cell_to_world(tile.row, tile.col).extend(0.0)),
                GridTile { id },
                Name::new(format!("{};{}", tile.row, tile.col)),
            ))
            .id();
        sprites.insert(id, entity);
    }

    commands.insert_resource(board);
    commands.insert_resource(VisibleBoard(sprites));
}
