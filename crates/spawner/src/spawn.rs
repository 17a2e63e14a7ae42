//! Spawning and the one-in-one-out replacement path.
//!
//! Every removal (animation end, hover fade end, orphaned entity) goes through
//! [`Spawner::retire_and_replace`], which despawns the bubble and spawns the chain's next bubble
//! in the same system run. There is no recursion: a removal handler calls `spawn_one` once.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bf_core::{
    Bubble, BubbleConfigRes, BubbleContainer, BubbleOpacity, BubbleRadius, BubbleRetired,
    BubbleSpawned, BubbleState, ChainId, FieldControl, RetireCause, RightOffset, RiseAnimation,
    RngSeed, ViewportSize,
};
use rand::SeedableRng;

use crate::field::BubbleField;
use crate::sampling::sample_bubble;

// Domain separation so the spawner stream differs from any other use of the same seed.
const SPAWNER_SEED_SALT: u64 = 0xB0BB_1E5E_ED00_0001;

/// Deterministic RNG dedicated to bubble sampling.
#[derive(Resource)]
pub struct SpawnerRng(pub rand::rngs::StdRng);

#[derive(SystemParam)]
pub struct Spawner<'w, 's> {
    commands: Commands<'w, 's>,
    field: ResMut<'w, BubbleField>,
    rng: ResMut<'w, SpawnerRng>,
    cfg: Res<'w, BubbleConfigRes>,
    viewport: Res<'w, ViewportSize>,
    containers: Query<'w, 's, Entity, With<BubbleContainer>>,
    spawned: EventWriter<'w, BubbleSpawned>,
    retired: EventWriter<'w, BubbleRetired>,
}

impl Spawner<'_, '_> {
    /// Spawn one bubble for `chain` at the front of the container.
    /// Returns `None` (chain stays ready) when there is no container to insert into.
    pub fn spawn_one(&mut self, chain: ChainId) -> Option<Entity> {
        let container = self.containers.iter().next()?;
        let field_cfg = &self.cfg.0.field;
        let vp = *self.viewport;
        let sample = sample_bubble(&mut self.rng.0, field_cfg, vp.width);

        let x = vp.width * 0.5 - sample.right_offset;
        let start_y = -vp.height * 0.5 - sample.radius;
        let end_y = vp.height * 0.5 + sample.radius;
        let entity = self
            .commands
            .spawn((
                Bubble { chain },
                BubbleRadius(sample.radius),
                RightOffset(sample.right_offset),
                BubbleOpacity(1.0),
                BubbleState::Rising,
                RiseAnimation {
                    elapsed: 0.0,
                    duration_secs: sample.duration_secs,
                    start_y,
                    end_y,
                },
                Transform::from_xyz(x, start_y, 0.0),
                Visibility::default(),
            ))
            .id();
        self.commands.entity(container).insert_children(0, &[entity]);

        if !self.field.mark_in_flight(chain, entity) {
            // Chain was retired by a stop/restart earlier this frame.
            self.despawn(entity);
            return None;
        }
        debug!(
            chain = chain.index,
            radius = sample.radius,
            offset = sample.right_offset,
            duration = sample.duration_secs,
            "bubble spawned"
        );
        self.spawned.write(BubbleSpawned {
            entity,
            chain,
            radius: sample.radius,
            right_offset: sample.right_offset,
            duration_secs: sample.duration_secs,
        });
        Some(entity)
    }

    /// Remove `entity` exactly once and spawn its chain's replacement.
    pub fn retire_and_replace(
        &mut self,
        entity: Entity,
        bubble: &Bubble,
        state: &mut BubbleState,
        cause: RetireCause,
    ) -> Option<Entity> {
        if *state == BubbleState::Removed {
            return None;
        }
        *state = BubbleState::Removed;
        self.despawn(entity);
        self.retired.write(BubbleRetired {
            entity,
            chain: bubble.chain,
            cause,
        });
        debug!(chain = bubble.chain.index, ?cause, "bubble retired");
        if self.field.retire(bubble.chain, entity) {
            self.spawn_one(bubble.chain)
        } else {
            None
        }
    }

    pub fn start_field(&mut self, chains: usize) {
        let max_delay = self.cfg.0.field.start_delay_max;
        let stale = self.field.start(chains, &mut self.rng.0, max_delay);
        for e in stale {
            self.despawn(e);
        }
        info!(
            chains,
            generation = self.field.generation(),
            "bubble field started"
        );
    }

    pub fn stop_field(&mut self) {
        let stale = self.field.stop();
        let count = stale.len();
        for e in stale {
            self.despawn(e);
        }
        info!(despawned = count, "bubble field stopped");
    }

    fn despawn(&mut self, entity: Entity) {
        if let Ok(mut ec) = self.commands.get_entity(entity) {
            ec.despawn();
        }
    }
}

/// System: seed the spawner RNG once (explicit `RngSeed`, then config seed, else entropy).
pub fn init_spawner_rng(
    mut commands: Commands,
    seed: Option<Res<RngSeed>>,
    cfg: Option<Res<BubbleConfigRes>>,
    existing: Option<Res<SpawnerRng>>,
) {
    if existing.is_some() {
        return;
    }
    let seed = seed
        .map(|s| s.0)
        .or_else(|| cfg.and_then(|c| c.0.rng_seed));
    let rng = match seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s.wrapping_add(SPAWNER_SEED_SALT)),
        None => rand::rngs::StdRng::from_entropy(),
    };
    commands.insert_resource(SpawnerRng(rng));
}

/// System: request a field start at launch when configured to.
pub fn autostart_field(cfg: Res<BubbleConfigRes>, mut control: EventWriter<FieldControl>) {
    let field = &cfg.0.field;
    if field.autostart {
        control.write(FieldControl::Start {
            chains: field.chain_count,
        });
    }
}

pub fn handle_field_control(mut events: EventReader<FieldControl>, mut spawner: Spawner) {
    for ev in events.read() {
        match ev {
            FieldControl::Start { chains } => spawner.start_field(*chains),
            FieldControl::Stop => spawner.stop_field(),
        }
    }
}

/// System: advance initial delays and fill every ready chain.
pub fn drive_field(time: Res<Time>, mut spawner: Spawner) {
    let due = spawner.field.tick(time.delta());
    if spawner.containers.is_empty() {
        // Ready chains stay ready until a container exists.
        return;
    }
    for chain in due {
        spawner.spawn_one(chain);
    }
}

/// System: a bubble despawned outside the retire path still gets its replacement.
pub fn repair_orphans(mut removed: RemovedComponents<Bubble>, mut spawner: Spawner) {
    for entity in removed.read() {
        let Some(chain) = spawner.field.chain_of(entity) else {
            continue;
        };
        if spawner.field.retire(chain, entity) {
            warn!(chain = chain.index, "bubble vanished outside the field; replacing");
            spawner.retired.write(BubbleRetired {
                entity,
                chain,
                cause: RetireCause::Orphaned,
            });
            spawner.spawn_one(chain);
        }
    }
}
