use bevy::prelude::*;

use crate::{WINDOW_HEIGHT, WINDOW_WIDTH};

#[derive(Component)]
pub struct WelcomeScreenElement;

/// Spawns the shared title / instructions / "tap to start" layout every game
/// in this workspace opens with. Uses Bevy's built-in default font.
pub fn spawn_welcome_screen(commands: &mut Commands, title: &str, instructions: &str) {
    // Background
    commands.spawn((
        Sprite::from_color(Color::BLACK, Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
        WelcomeScreenElement,
    ));

    commands
        .spawn((
            WelcomeScreenElement,
            Transform::from_xyz(0.0, 0.0, 1.0),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text2d::new(title),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, 120.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new(instructions),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, 0.0, 0.0)),
            ));

            parent.spawn((
                Text2d::new("Tap to start"),
                TextFont {
                    font_size: 30.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 1.0, 0.0)),
                TextLayout::new_with_justify(JustifyText::Center),
                Transform::from_translation(Vec3::new(0.0, -140.0, 0.0)),
            ));
        });
}

pub fn despawn_welcome_screen(
    mut commands: Commands,
    welcome_elements: Query<Entity, With<WelcomeScreenElement>>,
) {
    for entity in welcome_elements.iter() {
        commands.entity(entity).despawn_recursive();
    }
}
