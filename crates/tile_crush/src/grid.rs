use bevy::prelude::*;

mod board;
mod cascade;
mod components;
mod input;
mod spawning;

use cascade::advance_resolver;
use components::{BoardRng, Resolver, Selection};
use input::handle_input;
use spawning::spawn_board;

use crate::game::GameState;

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Selection>()
            .init_resource::<Resolver>()
            .init_resource::<BoardRng>()
            .add_systems(OnEnter(GameState::Playing), spawn_board)
            .add_systems(
                Update,
                (handle_input, advance_resolver)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
