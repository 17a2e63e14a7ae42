use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bf_core::{PointerPosition, ViewportSize};

/// System: snapshot the primary window size. Spawns read it; in-flight bubbles keep their path.
pub fn track_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<ViewportSize>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let next = ViewportSize {
        width: window.width(),
        height: window.height(),
    };
    if *viewport != next {
        *viewport = next;
    }
}

fn cursor_world_pos(
    camera_q: &Query<(&Camera, &GlobalTransform)>,
    screen_pos: Vec2,
) -> Option<Vec2> {
    let (camera, cam_tf) = camera_q.iter().next()?;
    camera.viewport_to_world_2d(cam_tf, screen_pos).ok()
}

/// System: first touch wins over the mouse cursor. Without a window the resource is left alone.
pub fn track_pointer(
    windows: Query<&Window, With<PrimaryWindow>>,
    touches: Option<Res<Touches>>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    mut pointer: ResMut<PointerPosition>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let screen = touches
        .as_deref()
        .and_then(|t| t.iter().next().map(|touch| touch.position()))
        .or_else(|| window.cursor_position());
    let world = screen.and_then(|s| cursor_world_pos(&camera_q, s));
    if pointer.0 != world {
        pointer.0 = world;
    }
}
