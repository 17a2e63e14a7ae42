use bevy::prelude::*;
use bf_core::{BubbleConfigRes, BubbleRetired, BubbleSpawned, RetireCause};

use crate::field::BubbleField;

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct BubbleStats {
    pub spawned: u64,
    pub retired_animation: u64,
    pub retired_hover: u64,
    pub retired_orphaned: u64,
    pub in_flight: usize,
    pub chains: usize,
}
impl BubbleStats {
    pub fn retired(&self) -> u64 {
        self.retired_animation + self.retired_hover + self.retired_orphaned
    }
}

pub fn collect_stats(
    mut spawned: EventReader<BubbleSpawned>,
    mut retired: EventReader<BubbleRetired>,
    field: Res<BubbleField>,
    mut stats: ResMut<BubbleStats>,
) {
    stats.spawned += spawned.read().count() as u64;
    for ev in retired.read() {
        match ev.cause {
            RetireCause::AnimationEnd => stats.retired_animation += 1,
            RetireCause::Hover => stats.retired_hover += 1,
            RetireCause::Orphaned => stats.retired_orphaned += 1,
        }
    }
    stats.in_flight = field.in_flight_count();
    stats.chains = field.chain_count();
}

pub fn log_stats(
    time: Res<Time>,
    cfg: Res<BubbleConfigRes>,
    stats: Res<BubbleStats>,
    mut accum: Local<f32>,
) {
    let interval = cfg.0.logging.stats_interval;
    if interval <= 0.0 {
        return;
    }
    *accum += time.delta_secs();
    if *accum < interval {
        return;
    }
    *accum = 0.0;
    info!(
        "BUBBLES t={:.1}s chains={} in_flight={} spawned={} retired(anim/hover/orphan)={}/{}/{}",
        time.elapsed_secs(),
        stats.chains,
        stats.in_flight,
        stats.spawned,
        stats.retired_animation,
        stats.retired_hover,
        stats.retired_orphaned
    );
}
