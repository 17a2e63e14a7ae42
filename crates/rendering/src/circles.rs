//! Bubble circle rendering.
//!
//! Spawns a 2D mesh child (unit circle scaled by radius * 2) for every new bubble and keeps its
//! scale and alpha in sync with `BubbleRadius` / `BubbleOpacity` (hover fade).

use bevy::prelude::*;
#[cfg(not(any(test, feature = "headless")))]
use bevy::math::primitives::Circle;
#[cfg(not(any(test, feature = "headless")))]
use bevy::prelude::Mesh2d;
#[cfg(not(any(test, feature = "headless")))]
use bevy::sprite::{ColorMaterial, MeshMaterial2d};
#[cfg(not(any(test, feature = "headless")))]
use bf_core::BubbleConfigRes;
use bf_core::{Bubble, BubbleCircleVisual, BubbleOpacity, BubbleRadius, BubbleSet};

#[cfg(not(any(test, feature = "headless")))]
// Resource storing shared unit circle mesh handle
#[derive(Resource)]
struct CircleMeshHandle(Handle<Mesh>);

pub struct CirclesPlugin;

#[cfg(not(any(test, feature = "headless")))]
impl Plugin for CirclesPlugin {
    fn build(&self, app: &mut App) {
        // After Animate so bubbles spawned this frame get their circle before the frame renders.
        app.add_systems(Startup, prepare_circle_mesh).add_systems(
            Update,
            (spawn_bubble_circles, sync_circle_scale, sync_circle_alpha)
                .chain()
                .after(BubbleSet::Animate),
        );
    }
}

#[cfg(any(test, feature = "headless"))]
impl Plugin for CirclesPlugin {
    fn build(&self, app: &mut App) {
        // Test variant: no render / materials; marker child carrying the scale only.
        app.add_systems(
            Update,
            (spawn_marker_circles, sync_circle_scale)
                .chain()
                .after(BubbleSet::Animate),
        );
    }
}

#[cfg(any(test, feature = "headless"))]
fn spawn_marker_circles(
    mut commands: Commands,
    q_new: Query<(Entity, &BubbleRadius), Added<Bubble>>,
) {
    for (e, radius) in &q_new {
        let child = commands
            .spawn((
                BubbleCircleVisual,
                Transform::from_scale(Vec3::splat(radius.0 * 2.0)),
            ))
            .id();
        commands.entity(e).add_child(child);
    }
}

#[cfg(not(any(test, feature = "headless")))]
fn prepare_circle_mesh(mut meshes: ResMut<Assets<Mesh>>, mut commands: Commands) {
    let mesh = meshes.add(Mesh::from(Circle::new(0.5)));
    commands.insert_resource(CircleMeshHandle(mesh));
}

#[cfg(not(any(test, feature = "headless")))]
fn spawn_bubble_circles(
    mut commands: Commands,
    circle_mesh: Option<Res<CircleMeshHandle>>,
    cfg: Res<BubbleConfigRes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    q_new: Query<(Entity, &BubbleRadius), Added<Bubble>>,
) {
    let Some(circle_mesh) = circle_mesh else {
        return;
    };
    let c = cfg.0.field.color;
    for (entity, radius) in q_new.iter() {
        // One material per bubble so the hover fade can change its alpha alone.
        let mat_handle = materials.add(ColorMaterial::from(Color::srgba(c.r, c.g, c.b, c.a)));
        let child = commands
            .spawn((
                Mesh2d::from(circle_mesh.0.clone()),
                MeshMaterial2d(mat_handle),
                Transform::from_scale(Vec3::splat(radius.0 * 2.0)),
                Visibility::Visible,
                BubbleCircleVisual,
            ))
            .id();
        commands.entity(entity).add_child(child);
    }
}

fn sync_circle_scale(
    q: Query<(&BubbleRadius, &Children), (With<Bubble>, Changed<BubbleRadius>)>,
    mut q_vis: Query<&mut Transform, With<BubbleCircleVisual>>,
) {
    for (radius, children) in q.iter() {
        for child in children.iter() {
            if let Ok(mut tf) = q_vis.get_mut(child) {
                tf.scale = Vec3::splat(radius.0.max(0.0) * 2.0);
            }
        }
    }
}

#[cfg(not(any(test, feature = "headless")))]
fn sync_circle_alpha(
    cfg: Res<BubbleConfigRes>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    q: Query<(&BubbleOpacity, &Children), (With<Bubble>, Changed<BubbleOpacity>)>,
    q_vis: Query<&MeshMaterial2d<ColorMaterial>, With<BubbleCircleVisual>>,
) {
    let base_alpha = cfg.0.field.color.a;
    for (opacity, children) in q.iter() {
        for child in children.iter() {
            let Ok(mesh_mat) = q_vis.get(child) else {
                continue;
            };
            if let Some(mat) = materials.get_mut(&mesh_mat.0) {
                mat.color.set_alpha((base_alpha * opacity.0).clamp(0.0, 1.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_core::{BubbleState, ChainId};

    #[test]
    fn marker_child_follows_radius() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(CirclesPlugin);
        let bubble = app
            .world_mut()
            .spawn((
                Bubble {
                    chain: ChainId {
                        generation: 0,
                        index: 0,
                    },
                },
                BubbleRadius(4.0),
                BubbleOpacity(1.0),
                BubbleState::Rising,
                Transform::default(),
            ))
            .id();
        app.update();
        app.update();

        let children: Vec<Entity> = app
            .world()
            .get::<Children>(bubble)
            .expect("visual child")
            .iter()
            .collect();
        assert_eq!(children.len(), 1);
        let scale = app.world().get::<Transform>(children[0]).expect("tf").scale;
        assert_eq!(scale, Vec3::splat(8.0));

        app.world_mut()
            .get_mut::<BubbleRadius>(bubble)
            .expect("radius")
            .0 = 1.5;
        app.update();
        let scale = app.world().get::<Transform>(children[0]).expect("tf").scale;
        assert_eq!(scale, Vec3::splat(3.0));
    }
}
