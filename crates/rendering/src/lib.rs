// Rendering crate: camera, the bubble container, and per-bubble circle visuals.

use bevy::prelude::*;
use bf_core::BubbleContainer;

mod circles;

pub use circles::CirclesPlugin;

/// Page-like backdrop behind the bubbles.
pub const BACKGROUND: Color = Color::srgb(0.05, 0.12, 0.22);

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(any(test, feature = "headless")))]
        app.insert_resource(ClearColor(BACKGROUND));
        app.add_systems(Startup, setup_scene)
            .add_plugins(CirclesPlugin);
    }
}

/// System: spawn the 2D camera and the single bubble container at the world origin.
fn setup_scene(mut commands: Commands, existing: Query<(), With<BubbleContainer>>) {
    #[cfg(not(any(test, feature = "headless")))]
    commands.spawn(Camera2d);
    if existing.is_empty() {
        commands.spawn((
            Name::new("BubbleContainer"),
            BubbleContainer,
            Transform::default(),
            Visibility::default(),
        ));
    }
}
