use bevy::prelude::*;
use game_helpers::tween::TweenPlugin;

mod game;
mod grid;
mod screen;

use grid::GridPlugin;
use screen::ScreenPlugin;

pub fn run() {
    game_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .add_plugins(TweenPlugin)
        .add_plugins(GridPlugin)
        .add_plugins(ScreenPlugin)
        .init_state::<game::GameState>()
        .add_systems(Startup, setup)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}
