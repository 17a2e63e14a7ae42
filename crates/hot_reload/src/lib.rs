// Config hot reload: polls config file modification times and re-applies the layered config.
// Native only; on wasm the plugin is inert.

use bevy::prelude::*;
use bf_config::{AppConfig, DEFAULT_CONFIG_PATHS};
use bf_core::{BubbleConfigRes, ConfigOverridesRes, FieldControl};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::SystemTime,
};

#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings {
    pub paths: Vec<PathBuf>,
    pub interval_secs: f32,
}
impl Default for ConfigReloadSettings {
    fn default() -> Self {
        Self {
            paths: DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect(),
            interval_secs: 0.5,
        }
    }
}

#[derive(Resource, Debug)]
struct ConfigReloadState {
    last_mod: HashMap<PathBuf, SystemTime>,
    timer: Timer,
}
impl FromWorld for ConfigReloadState {
    fn from_world(world: &mut World) -> Self {
        let interval = world
            .get_resource::<ConfigReloadSettings>()
            .map(|s| s.interval_secs)
            .unwrap_or(0.5)
            .max(0.05);
        Self {
            last_mod: HashMap::new(),
            timer: Timer::from_seconds(interval, TimerMode::Repeating),
        }
    }
}

pub struct HotReloadPlugin;

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            app.init_resource::<ConfigReloadSettings>()
                .init_resource::<ConfigReloadState>()
                .add_systems(Startup, record_initial_mtimes)
                .add_systems(Update, poll_and_reload_config);
        }
        #[cfg(target_arch = "wasm32")]
        let _ = app;
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.modified().ok()
}

// The config was loaded once at startup; only later edits count as changes.
fn record_initial_mtimes(settings: Res<ConfigReloadSettings>, mut state: ResMut<ConfigReloadState>) {
    for path in &settings.paths {
        if let Some(t) = modified(path) {
            state.last_mod.insert(path.clone(), t);
        }
    }
}

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<BubbleConfigRes>,
    overrides: Option<Res<ConfigOverridesRes>>,
    mut windows: Query<&mut Window>,
    mut control: EventWriter<FieldControl>,
) {
    let wanted = settings.interval_secs.max(0.05);
    if (state.timer.duration().as_secs_f32() - wanted).abs() > f32::EPSILON {
        state
            .timer
            .set_duration(std::time::Duration::from_secs_f32(wanted));
    }
    if !state.timer.tick(time.delta()).finished() {
        return;
    }

    let mut dirty = false;
    for path in &settings.paths {
        let Some(mod_time) = modified(path) else {
            continue;
        };
        let entry = state
            .last_mod
            .entry(path.clone())
            .or_insert(SystemTime::UNIX_EPOCH);
        if mod_time > *entry {
            *entry = mod_time;
            dirty = true;
        }
    }
    if !dirty {
        return;
    }

    let (mut new_cfg, _used, errors) = AppConfig::load_layered(settings.paths.iter());
    if let Some(o) = overrides {
        o.0.apply(&mut new_cfg);
    }
    for e in errors {
        warn!("CONFIG HOT-RELOAD issue: {e}");
    }
    for w in new_cfg.validate() {
        warn!("CONFIG HOT-RELOAD warning: {w}");
    }
    if cfg_res.0 == new_cfg {
        return;
    }
    info!("Config hot-reload applied");
    apply_config_update(&mut cfg_res.0, new_cfg, &mut windows, &mut control);
}

/// Replace the live config. The window follows size/title; a changed chain count restarts the
/// field, everything else is picked up by the next spawn.
pub fn apply_config_update(
    current: &mut AppConfig,
    new_cfg: AppConfig,
    windows: &mut Query<&mut Window>,
    control: &mut EventWriter<FieldControl>,
) {
    if current.field.chain_count != new_cfg.field.chain_count && new_cfg.field.autostart {
        info!(
            from = current.field.chain_count,
            to = new_cfg.field.chain_count,
            "chain count changed; restarting bubble field"
        );
        control.write(FieldControl::Start {
            chains: new_cfg.field.chain_count,
        });
    }
    if let Ok(mut window) = windows.single_mut() {
        if window.width() != new_cfg.window.width || window.height() != new_cfg.window.height {
            window
                .resolution
                .set(new_cfg.window.width, new_cfg.window.height);
        }
        if window.title != new_cfg.window.title {
            window.title = new_cfg.window.title.clone();
        }
    }
    *current = new_cfg;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn advance(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(secs));
        app.update();
    }

    fn sent_controls(app: &App) -> Vec<FieldControl> {
        let events = app.world().resource::<Events<FieldControl>>();
        let mut cursor = events.get_cursor();
        cursor.read(events).cloned().collect()
    }

    fn app_watching(path: PathBuf) -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_event::<FieldControl>();
        app.insert_resource(BubbleConfigRes::default());
        app.insert_resource(ConfigReloadSettings {
            paths: vec![path],
            interval_secs: 0.1,
        });
        app.add_plugins(HotReloadPlugin);
        app
    }

    // Force a strictly newer mtime regardless of filesystem timestamp granularity.
    fn rewrite_newer(path: &Path, contents: &str) {
        std::fs::write(path, contents).expect("write");
        let later = SystemTime::now() + Duration::from_secs(5);
        std::fs::File::options()
            .write(true)
            .open(path)
            .and_then(|f| f.set_modified(later))
            .expect("touch");
    }

    #[test]
    fn plugin_adds() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(HotReloadPlugin);
        assert!(app.world().get_resource::<ConfigReloadSettings>().is_some());
    }

    #[test]
    fn edited_file_is_applied_and_restarts_field() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("bubbles.ron");
        std::fs::write(&path, "(field: (chain_count: 10))").expect("write");

        let mut app = app_watching(path.clone());
        advance(&mut app, 0.0);
        advance(&mut app, 0.2);
        // Unchanged file: nothing applied.
        assert_eq!(app.world().resource::<BubbleConfigRes>().0.field.chain_count, 10);

        rewrite_newer(&path, "(field: (chain_count: 4, max_radius: 6.0))");
        advance(&mut app, 0.2);
        let cfg = &app.world().resource::<BubbleConfigRes>().0;
        assert_eq!(cfg.field.chain_count, 4);
        assert_eq!(cfg.field.max_radius, 6.0);
        assert!(sent_controls(&app).contains(&FieldControl::Start { chains: 4 }));
    }

    #[test]
    fn command_line_overrides_survive_reload() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("bubbles.ron");
        std::fs::write(&path, "(field: (max_radius: 10.0))").expect("write");

        let mut app = app_watching(path.clone());
        let overrides = bf_config::ConfigOverrides {
            chain_count: Some(25),
            auto_close: Some(30.0),
            ..Default::default()
        };
        {
            let mut cfg = app.world_mut().resource_mut::<BubbleConfigRes>();
            overrides.apply(&mut cfg.0);
        }
        app.insert_resource(ConfigOverridesRes(overrides));
        advance(&mut app, 0.0);
        advance(&mut app, 0.2);

        rewrite_newer(&path, "(field: (max_radius: 6.0, chain_count: 3))");
        advance(&mut app, 0.2);
        let cfg = &app.world().resource::<BubbleConfigRes>().0;
        assert_eq!(cfg.field.max_radius, 6.0, "file edit applied");
        assert_eq!(cfg.field.chain_count, 25, "--chains still wins");
        assert_eq!(cfg.window.auto_close, 30.0);
        assert!(
            sent_controls(&app).is_empty(),
            "chain count unchanged, no restart"
        );
    }

    #[test]
    fn missing_file_is_ignored() {
        let mut app = app_watching(PathBuf::from("no/such/bubbles.ron"));
        for _ in 0..5 {
            advance(&mut app, 0.2);
        }
        assert_eq!(
            app.world().resource::<BubbleConfigRes>().0,
            AppConfig::default()
        );
        assert!(sent_controls(&app).is_empty());
    }
}
