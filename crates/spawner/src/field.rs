//! `BubbleField`: owned bookkeeping for N independent spawn chains.
//!
//! Each chain is in exactly one state at a time:
//! `Scheduled` (initial delay pending) -> `Ready` (waiting for a container to spawn into)
//! -> `InFlight(entity)` -> back to `Ready` on retire, then immediately `InFlight` again.
//! The one-in-one-out cycle keeps the number of bubbles in flight equal to the chain count.

use bevy::prelude::*;
use bf_core::ChainId;
use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ChainState {
    Scheduled(Timer),
    Ready,
    InFlight(Entity),
}

#[derive(Resource, Debug, Default)]
pub struct BubbleField {
    generation: u32,
    running: bool,
    chains: Vec<ChainState>,
}

impl BubbleField {
    /// (Re)start with `chain_count` chains, each delayed uniformly in `[0, max_delay)` seconds.
    /// Bubbles of a previous run stay in their old generation and are never replaced; callers
    /// despawn them via the entities returned here.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        chain_count: usize,
        rng: &mut R,
        max_delay: f32,
    ) -> Vec<Entity> {
        let stale = self.stop();
        self.running = true;
        self.chains = (0..chain_count)
            .map(|_| {
                let delay = crate::sampling::sample_start_delay(rng, max_delay);
                ChainState::Scheduled(Timer::from_seconds(delay, TimerMode::Once))
            })
            .collect();
        stale
    }

    /// Stop the field. Returns the entities still in flight; they will not be replaced.
    pub fn stop(&mut self) -> Vec<Entity> {
        let in_flight = self.in_flight_entities().collect();
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        self.chains.clear();
        in_flight
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn chain_state(&self, index: usize) -> Option<&ChainState> {
        self.chains.get(index)
    }

    pub fn chain_id(&self, index: usize) -> ChainId {
        ChainId {
            generation: self.generation,
            index,
        }
    }

    /// Advance initial delays; returns every chain that wants a bubble now (newly elapsed delays
    /// plus chains still waiting from earlier frames).
    pub fn tick(&mut self, delta: Duration) -> Vec<ChainId> {
        if !self.running {
            return Vec::new();
        }
        let generation = self.generation;
        let mut ready = Vec::new();
        for (index, state) in self.chains.iter_mut().enumerate() {
            if let ChainState::Scheduled(timer) = state {
                if timer.tick(delta).finished() {
                    *state = ChainState::Ready;
                }
            }
            if matches!(state, ChainState::Ready) {
                ready.push(ChainId { generation, index });
            }
        }
        ready
    }

    pub fn mark_in_flight(&mut self, chain: ChainId, entity: Entity) -> bool {
        if !self.owns(chain) {
            return false;
        }
        match self.chains.get_mut(chain.index) {
            Some(state) if matches!(state, ChainState::Ready) => {
                *state = ChainState::InFlight(entity);
                true
            }
            _ => false,
        }
    }

    /// Release `entity` from its chain. Returns `true` exactly once per in-flight bubble of the
    /// current generation; the chain is then `Ready` and the caller spawns the replacement.
    pub fn retire(&mut self, chain: ChainId, entity: Entity) -> bool {
        if !self.owns(chain) {
            return false;
        }
        match self.chains.get_mut(chain.index) {
            Some(state) if *state == ChainState::InFlight(entity) => {
                *state = ChainState::Ready;
                true
            }
            _ => false,
        }
    }

    /// Chain currently holding `entity`, if any.
    pub fn chain_of(&self, entity: Entity) -> Option<ChainId> {
        self.chains
            .iter()
            .position(|s| *s == ChainState::InFlight(entity))
            .map(|index| self.chain_id(index))
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight_entities().count()
    }

    fn in_flight_entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.chains.iter().filter_map(|s| match s {
            ChainState::InFlight(e) => Some(*e),
            _ => None,
        })
    }

    fn owns(&self, chain: ChainId) -> bool {
        self.running && chain.generation == self.generation && chain.index < self.chains.len()
    }
}
