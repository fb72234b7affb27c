use bevy::prelude::*;
use game_helpers::input::just_pressed_world_position;
use game_helpers::welcome_screen::{despawn_welcome_screen, spawn_welcome_screen};

use crate::game::GameState;

pub struct ScreenPlugin;

impl Plugin for ScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Welcome), welcome_enter)
            .add_systems(
                Update,
                handle_welcome_input.run_if(in_state(GameState::Welcome)),
            )
            .add_systems(OnExit(GameState::Welcome), despawn_welcome_screen);
    }
}

fn welcome_enter(mut commands: Commands) {
    spawn_welcome_screen(
        &mut commands,
        "Tile Crush",
        "Swipe a tile to line up\nthree or more of a color",
    );
}

fn handle_welcome_input(
    mut next_state: ResMut<NextState<GameState>>,
    buttons: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window>,
    camera: Query<(&Camera, &GlobalTransform)>,
) {
    if just_pressed_world_position(&buttons, &touch_input, &windows, &camera).is_some() {
        next_state.set(GameState::Playing);
    }
}
