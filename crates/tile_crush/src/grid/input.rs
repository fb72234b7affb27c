use bevy::prelude::*;
use game_helpers::input::{just_pressed_world_position, just_released, just_released_world_position};
use game_helpers::tween::MoveTo;

use super::board::{Board, COLS, ROWS};
use super::components::{
    cell_to_world, world_to_cell, PressedTile, Resolver, Selection, VisibleBoard, PRESSED_SCALE,
    SWAP_DURATION, SWIPE_THRESHOLD,
};

/// Turns a press/release pair into a one-cell swap. Runs only while the
/// resolver is idle; anything delivered mid-sequence is dropped.
pub fn handle_input(
    mut commands: Commands,
    mut selection: ResMut<Selection>,
    mut resolver: ResMut<Resolver>,
    mut board: ResMut<Board>,
    visible: Res<VisibleBoard>,
    buttons: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
    mut transforms: Query<&mut Transform>,
) {
    if !resolver.is_idle() {
        return;
    }

    if let Some(world_pos) = just_pressed_world_position(&buttons, &touch_input, &windows, &camera)
    {
        let Some((row, col)) = world_to_cell(world_pos) else {
            return;
        };
        if board.tile_id(row, col).is_some() {
            set_tile_scale(&board, &visible, &mut transforms, (row, col), PRESSED_SCALE);
            selection.0 = Some(PressedTile {
                pos: (row, col),
                world: world_pos,
            });
        }
        return;
    }

    if just_released(&buttons, &touch_input) {
        let Some(pressed) = selection.0.take() else {
            return;
        };
        set_tile_scale(&board, &visible, &mut transforms, pressed.pos, 1.0);

        // A release outside the window carries no position to measure a
        // swipe against, so the gesture just ends.
        let Some(release) =
            just_released_world_position(&buttons, &touch_input, &windows, &camera)
        else {
            return;
        };

        let Some(target) = swipe_target(pressed.pos, release - pressed.world) else {
            return;
        };
        if board.tile_id(target.0, target.1).is_none() {
            return;
        }

        let id_a = board.tile_id(pressed.pos.0, pressed.pos.1);
        let id_b = board.tile_id(target.0, target.1);
        match board.swap(pressed.pos, target) {
            Err(err) => info!("swap rejected: {err}"),
            Ok(()) => {
                for (id, dest) in [(id_a, target), (id_b, pressed.pos)] {
                    let Some(entity) = id.and_then(|id| visible.0.get(&id).copied()) else {
                        continue;
                    };
                    let to = cell_to_world(dest.0, dest.1);
                    let from = transforms
                        .get(entity)
                        .map_or(to, |transform| transform.translation.truncate());
                    commands.entity(entity).insert(MoveTo::new(from, to, SWAP_DURATION));
                }
                *resolver = Resolver::Swapping {
                    a: pressed.pos,
                    b: target,
                };
            }
        }
    }
}

/// One cell along the dominant axis of the release offset, in its sign
/// direction. Horizontal wins only when `|dx| > |dy|`; below the swipe
/// threshold or off the grid there is no target.
fn swipe_target(origin: (usize, usize), delta: Vec2) -> Option<(usize, usize)> {
    let (mut row, mut col) = (origin.0 as i32, origin.1 as i32);

    if delta.x.abs() > delta.y.abs() {
        if delta.x.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        col += if delta.x > 0.0 { 1 } else { -1 };
    } else {
        if delta.y.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        // world y points up, so a downward swipe has negative y
        row += if delta.y > 0.0 { -1 } else { 1 };
    }

    if row < 0 || row >= ROWS as i32 || col < 0 || col >= COLS as i32 {
        return None;
    }
    Some((row as usize, col as usize))
}

fn set_tile_scale(
    board: &Board,
    visible: &VisibleBoard,
    transforms: &mut Query<&mut Transform>,
    (row, col): (usize, usize),
    scale: f32,
) {
    let Some(entity) = board
        .tile_id(row, col)
        .and_then(|id| visible.0.get(&id).copied())
    else {
        return;
    };
    if let Ok(mut transform) = transforms.get_mut(entity) {
        transform.scale = Vec3::new(scale, scale, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_drags_are_not_swipes() {
        assert_eq!(swipe_target((4, 4), Vec2::new(10.0, 0.0)), None);
        assert_eq!(swipe_target((4, 4), Vec2::new(0.0, -19.0)), None);
        assert_eq!(swipe_target((4, 4), Vec2::ZERO), None);
    }

    #[test]
    fn dominant_axis_wins() {
        assert_eq!(swipe_target((4, 4), Vec2::new(50.0, 10.0)), Some((4, 5)));
        assert_eq!(swipe_target((4, 4), Vec2::new(-50.0, 10.0)), Some((4, 3)));
        assert_eq!(swipe_target((4, 4), Vec2::new(10.0, 50.0)), Some((3, 4)));
        assert_eq!(swipe_target((4, 4), Vec2::new(10.0, -50.0)), Some((5, 4)));
    }

    #[test]
    fn exact_ties_go_to_the_vertical_branch() {
        assert_eq!(swipe_target((4, 4), Vec2::new(30.0, 30.0)), Some((3, 4)));
        assert_eq!(swipe_target((4, 4), Vec2::new(30.0, -30.0)), Some((5, 4)));
    }

    #[test]
    fn swipes_off_the_edge_have_no_target() {
        assert_eq!(swipe_target((0, 0), Vec2::new(-50.0, 0.0)), None);
        assert_eq!(swipe_target((0, 0), Vec2::new(10.0, 50.0)), None);
        assert_eq!(swipe_target((ROWS - 1, COLS - 1), Vec2::new(50.0, 0.0)), None);
        assert_eq!(
            swipe_target((ROWS - 1, COLS - 1), Vec2::new(10.0, -50.0)),
            None
        );
    }
}
