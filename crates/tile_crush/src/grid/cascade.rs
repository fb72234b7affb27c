use bevy::prelude::*;
use game_helpers::tween::{Ease, MoveTo, ScaleTo};

use super::board::{Board, TileId};
use super::components::{
    cell_to_world, spawn_origin, tile_color, BoardRng, GridTile, Resolver, VisibleBoard,
    FALL_DURATION, RECHECK_DELAY, REMOVE_DURATION, SPAWN_DELAY, SPAWN_DURATION, SWAP_DURATION,
    TILE_SPRITE_SIZE,
};

/// Steps the cascade state machine. A phase only advances once every tween it
/// scheduled has finished and its pacing timer has elapsed, which serializes
/// swap -> check -> (revert | remove -> fall -> spawn -> check ...) exactly
/// like the gesture that started it expects.
pub fn advance_resolver(
    mut commands: Commands,
    time: Res<Time>,
    mut resolver: ResMut<Resolver>,
    mut board: ResMut<Board>,
    mut visible: ResMut<VisibleBoard>,
    mut rng: ResMut<BoardRng>,
    tweens: Query<(), Or<(With<MoveTo>, With<ScaleTo>)>>,
    tiles: Query<(Entity, &GridTile)>,
    transforms: Query<&Transform>,
) {
    match &mut *resolver {
        Resolver::Falling { timer } | Resolver::Spawning { timer } => {
            timer.tick(time.delta());
        }
        _ => {}
    }

    if !tweens.is_empty() {
        return;
    }

    match core::mem::take(&mut *resolver) {
        Resolver::Idle => {}

        Resolver::Swapping { a, b } => {
            let matches = board.find_matches();
            if matches.is_empty() {
                // No match: same exchange again, animated back.
                if let Err(err) = board.swap(a, b) {
                    error!("revert failed: {err}");
                }
                for pos in [a, b] {
                    move_tile_to_cell(&mut commands, &board, &visible, &transforms, pos);
                }
                *resolver = Resolver::Reverting;
            } else {
                *resolver = begin_removal(&mut commands, &visible, matches);
            }
        }

        Resolver::Reverting => {
            // Reverse interpolation done, the board is back untouched.
            *resolver = Resolver::Idle;
        }

        Resolver::Removing { matched } => {
            board.clear_matched(&matched);
            for (entity, tile) in &tiles {
                if matched.contains(&tile.id) {
                    visible.0.remove(&tile.id);
                    commands.entity(entity).despawn_recursive();
                }
            }

            for fall in board.apply_gravity() {
                let Some(&entity) = visible.0.get(&fall.id) else {
                    warn!("no sprite for falling tile in column {}", fall.col);
                    continue;
                };
                let to = cell_to_world(fall.to_row, fall.col);
                let from = transforms
                    .get(entity)
                    .map_or(to, |transform| transform.translation.truncate());
                commands
                    .entity(entity)
                    .insert(MoveTo::new(from, to, FALL_DURATION));
            }

            *resolver = Resolver::Falling {
                timer: Timer::new(SPAWN_DELAY, TimerMode::Once),
            };
        }

        Resolver::Falling { timer } => {
            if !timer.finished() {
                *resolver = Resolver::Falling { timer };
                return;
            }

            let spawns = board.spawn_missing(&mut rng.0);
            if spawns.is_empty() {
                // Nothing was missing; degenerate stabilization.
                *resolver = Resolver::Idle;
                return;
            }

            for spawn in spawns {
                let from = spawn_origin(spawn.col);
                let to = cell_to_world(spawn.row, spawn.col);
                let entity = commands
                    .spawn((
                        Sprite::from_color(tile_color(spawn.kind), Vec2::splat(TILE_SPRITE_SIZE)),
                        Transform::from_translation(from.extend(0.0)),
                        GridTile { id: spawn.id },
                        Name::new(format!("{};{}", spawn.row, spawn.col)),
                        MoveTo::new(from, to, SPAWN_DURATION).with_ease(Ease::BounceOut),
                    ))
                    .id();
                visible.0.insert(spawn.id, entity);
            }

            *resolver = Resolver::Spawning {
                timer: Timer::new(RECHECK_DELAY, TimerMode::Once),
            };
        }

        Resolver::Spawning { timer } => {
            if !timer.finished() {
                *resolver = Resolver::Spawning { timer };
                return;
            }

            let matches = board.find_matches();
            if matches.is_empty() {
                // Stable: this is the success-path lock release.
                *resolver = Resolver::Idle;
            } else {
                *resolver = begin_removal(&mut commands, &visible, matches);
            }
        }
    }
}

/// De-duplicates the detector output and starts the shrink-out animation on
/// every matched sprite.
fn begin_removal(
    commands: &mut Commands,
    visible: &VisibleBoard,
    matches: Vec<TileId>,
) -> Resolver {
    let mut matched: Vec<TileId> = Vec::new();
    for id in matches {
        if !matched.contains(&id) {
            matched.push(id);
        }
    }

    for id in &matched {
        if let Some(&entity) = visible.0.get(id) {
            commands
                .entity(entity)
                .insert(ScaleTo::new(1.0, 0.0, REMOVE_DURATION));
        }
    }

    Resolver::Removing { matched }
}

fn move_tile_to_cell(
    commands: &mut Commands,
    board: &Board,
    visible: &VisibleBoard,
    transforms: &Query<&Transform>,
    (row, col): (usize, usize),
) {
    let Some(entity) = board
        .tile_id(row, col)
        .and_then(|id| visible.0.get(&id).copied())
    else {
        return;
    };
    let to = cell_to_world(row, col);
    let from = transforms
        .get(entity)
        .map_or(to, |transform| transform.translation.truncate());
    commands
        .entity(entity)
        .insert(MoveTo::new(from, to, SWAP_DURATION));
}
