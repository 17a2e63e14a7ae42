// Integration tests: compose the published plugins in a headless Bevy app and drive them with a
// manual clock.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use bf_config::AppConfig;
use bf_core::{BubbleConfigRes, CorePlugin, RngSeed};
use bf_rendering::RenderingPlugin;
use bf_spawner::BubbleSpawnerPlugin;

/// Fixed frame step used by `build_minimal_app` (kept under the virtual clock's max delta).
pub const STEP: Duration = Duration::from_millis(100);

pub fn build_minimal_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app
}

/// Minimal app with every bubble field plugin and the given config.
pub fn build_field_app(cfg: AppConfig, seed: u64) -> App {
    let mut app = build_minimal_app();
    app.insert_resource(RngSeed(seed));
    app.insert_resource(BubbleConfigRes(cfg));
    app.add_plugins((CorePlugin, RenderingPlugin, BubbleSpawnerPlugin));
    app
}

pub fn run_frames(app: &mut App, frames: u32) {
    for _ in 0..frames {
        app.update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bf_core::{
        Bubble, BubbleCircleVisual, BubbleContainer, FieldControl, PointerPosition, ViewportSize,
    };
    use bf_spawner::{BubbleField, BubbleStats};

    fn field_cfg(chains: usize) -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.field.chain_count = chains;
        cfg.field.start_delay_max = 2.0;
        cfg.field.duration_min = 2;
        cfg.field.duration_range = 2;
        cfg.logging.stats_interval = 0.0;
        cfg
    }

    fn bubble_entities(app: &mut App) -> Vec<Entity> {
        let world = app.world_mut();
        let mut q = world.query_filtered::<Entity, With<Bubble>>();
        q.iter(world).collect()
    }

    fn visual_count(app: &mut App) -> usize {
        let world = app.world_mut();
        let mut q = world.query_filtered::<(), With<BubbleCircleVisual>>();
        q.iter(world).count()
    }

    #[test]
    fn compose_core_plugins() {
        let mut app = build_field_app(AppConfig::default(), 1);
        app.update();
        assert!(app.world().get_resource::<BubbleField>().is_some());
        let world = app.world_mut();
        let mut q = world.query_filtered::<(), With<BubbleContainer>>();
        assert_eq!(q.iter(world).count(), 1);
    }

    #[cfg(feature = "hot-reload")]
    #[test]
    fn compose_with_hot_reload() {
        use bf_hot_reload::{ConfigReloadSettings, HotReloadPlugin};
        let mut app = build_field_app(AppConfig::default(), 1);
        app.insert_resource(ConfigReloadSettings {
            paths: vec!["no/such/bubbles.ron".into()],
            interval_secs: 0.1,
        });
        app.add_plugins(HotReloadPlugin);
        run_frames(&mut app, 5);
        assert_eq!(app.world().resource::<BubbleConfigRes>().0.field.chain_count, 10);
    }

    #[test]
    fn ten_chains_stay_ten_bubbles_with_visuals() {
        let mut app = build_field_app(field_cfg(10), 42);
        // Past the largest start delay.
        run_frames(&mut app, 30);
        assert_eq!(bubble_entities(&mut app).len(), 10);
        run_frames(&mut app, 1);
        assert_eq!(visual_count(&mut app), 10);

        // Several full rise cycles later the field is still exactly ten strong.
        for _ in 0..100 {
            run_frames(&mut app, 1);
            assert_eq!(bubble_entities(&mut app).len(), 10);
        }
        let stats = app.world().resource::<BubbleStats>().clone();
        assert!(stats.retired_animation >= 10);
        assert_eq!(stats.spawned, 10 + stats.retired());
        assert_eq!(stats.in_flight, 10);
    }

    #[test]
    fn bubbles_rise_from_below_the_viewport() {
        let mut app = build_field_app(field_cfg(5), 3);
        run_frames(&mut app, 30);
        let half_h = app.world().resource::<ViewportSize>().height * 0.5;
        let world = app.world_mut();
        let mut q = world.query_filtered::<&Transform, With<Bubble>>();
        for tf in q.iter(world) {
            assert!(tf.translation.y >= -half_h - 10.0);
            assert!(tf.translation.y <= half_h + 10.0);
        }
    }

    #[test]
    fn pointer_hover_replaces_bubble() {
        let mut cfg = field_cfg(4);
        cfg.field.start_delay_max = 0.0;
        cfg.field.duration_min = 20;
        let mut app = build_field_app(cfg, 9);
        run_frames(&mut app, 2);
        let target = bubble_entities(&mut app)[0];
        let pos = app
            .world()
            .get::<Transform>(target)
            .expect("bubble transform")
            .translation
            .truncate();
        app.world_mut().resource_mut::<PointerPosition>().0 = Some(pos);
        run_frames(&mut app, 1);
        app.world_mut().resource_mut::<PointerPosition>().0 = None;

        // Default hover fade lasts 0.4s.
        run_frames(&mut app, 6);
        assert!(!app.world().entities().contains(target));
        assert_eq!(bubble_entities(&mut app).len(), 4);
        let stats = app.world().resource::<BubbleStats>().clone();
        assert!(stats.retired_hover >= 1);
    }

    #[test]
    fn stop_then_start_with_new_count() {
        let mut cfg = field_cfg(6);
        cfg.field.start_delay_max = 0.0;
        let mut app = build_field_app(cfg, 5);
        run_frames(&mut app, 2);
        assert_eq!(bubble_entities(&mut app).len(), 6);

        app.world_mut().send_event(FieldControl::Stop);
        run_frames(&mut app, 2);
        assert!(bubble_entities(&mut app).is_empty());
        assert!(!app.world().resource::<BubbleField>().is_running());

        app.world_mut().send_event(FieldControl::Start { chains: 3 });
        run_frames(&mut app, 2);
        assert_eq!(bubble_entities(&mut app).len(), 3);
    }
}
