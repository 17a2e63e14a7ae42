//! Timed exit for unattended runs (`window.autoClose` / `--auto-close`).
//!
//! The limit follows the live config, so a hot reload can extend, shorten or disable it. Before
//! exiting the field is stopped and the run's bubble totals are logged once.

use std::time::Duration;

use bevy::prelude::*;
use bf_core::{BubbleConfigRes, FieldControl};
use bf_spawner::BubbleStats;

#[derive(Resource, Debug, Default)]
struct AutoClose {
    // `None` while disabled. Elapsed time survives limit changes.
    timer: Option<Timer>,
}

pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutoClose>().add_systems(
            Update,
            (
                sync_limit.run_if(resource_changed::<BubbleConfigRes>),
                tick_and_exit,
            )
                .chain(),
        );
    }
}

fn sync_limit(cfg: Res<BubbleConfigRes>, mut auto_close: ResMut<AutoClose>) {
    let secs = cfg.0.window.auto_close;
    if !(secs > 0.0 && secs.is_finite()) {
        if auto_close.timer.take().is_some() {
            info!("auto close disabled");
        }
        return;
    }
    let limit = Duration::from_secs_f32(secs);
    match auto_close.timer.as_mut() {
        Some(timer) if timer.duration() == limit => {}
        Some(timer) => {
            timer.set_duration(limit);
            info!(seconds = secs, "auto close limit changed");
        }
        None => {
            auto_close.timer = Some(Timer::new(limit, TimerMode::Once));
            info!(seconds = secs, "auto close armed");
        }
    }
}

fn tick_and_exit(
    time: Res<Time>,
    mut auto_close: ResMut<AutoClose>,
    stats: Option<Res<BubbleStats>>,
    mut control: EventWriter<FieldControl>,
    mut exit: EventWriter<AppExit>,
) {
    let Some(timer) = auto_close.timer.as_mut() else {
        return;
    };
    if !timer.tick(time.delta()).just_finished() {
        return;
    }
    if let Some(s) = stats {
        info!(
            spawned = s.spawned,
            retired_animation = s.retired_animation,
            retired_hover = s.retired_hover,
            retired_orphaned = s.retired_orphaned,
            "auto close: run summary"
        );
    }
    control.write(FieldControl::Stop);
    exit.write(AppExit::Success);
}
