//! Bubble spawner: keeps a fixed number of independent, self-renewing bubble chains alive.
//!
//! `BubbleField` owns the chains; the systems here fill ready chains, rise bubbles, run hover
//! fades, and replace every removed bubble with exactly one new one on the same chain.

use bevy::prelude::*;
use bf_core::{BubbleConfigRes, BubbleSet};

mod field;
mod lifecycle;
mod sampling;
mod spawn;
mod stats;
mod tracking;

pub use field::{BubbleField, ChainState};
pub use lifecycle::HoverFade;
pub use sampling::{sample_bubble, sample_start_delay, BubbleSample};
pub use spawn::{Spawner, SpawnerRng};
pub use stats::BubbleStats;

pub struct BubbleSpawnerPlugin;

impl Plugin for BubbleSpawnerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BubbleConfigRes>()
            .init_resource::<BubbleField>()
            .init_resource::<BubbleStats>()
            .add_systems(
                Startup,
                (spawn::init_spawner_rng, spawn::autostart_field).chain(),
            )
            .add_systems(
                Update,
                (tracking::track_viewport, tracking::track_pointer).in_set(BubbleSet::Track),
            )
            .add_systems(
                Update,
                (
                    spawn::handle_field_control,
                    spawn::repair_orphans,
                    spawn::drive_field,
                )
                    .chain()
                    .in_set(BubbleSet::Schedule),
            )
            .add_systems(
                Update,
                (
                    lifecycle::detect_hover,
                    lifecycle::advance_rise,
                    lifecycle::advance_hover_fade,
                )
                    .chain()
                    .in_set(BubbleSet::Animate),
            )
            .add_systems(
                Update,
                (stats::collect_stats, stats::log_stats)
                    .chain()
                    .in_set(BubbleSet::Retire),
            );
    }
}
