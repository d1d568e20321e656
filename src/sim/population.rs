//! Population management
//!
//! Keeps a fixed number of animals on screen. New animals prefer species
//! that are not already visible, and every spawn uses the same placement
//! policy: an interior position and a random per-axis speed and sign.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use rand::seq::index;

use super::state::{ActiveInstance, AnimalState, InstanceId, SimEvent, World};
use crate::catalog::AnimalDef;
use crate::consts::{SPAWN_MIN_FRACTION, SPAWN_SPAN_FRACTION};

impl World {
    /// Replace the whole population with `count` freshly spawned animals
    ///
    /// Species are distinct when the catalog is large enough; otherwise they
    /// are drawn with replacement.
    pub fn initialize(&mut self, count: usize) {
        let len = self.catalog.len();
        let picks: Vec<usize> = if len >= count {
            index::sample(&mut self.rng, len, count).into_vec()
        } else {
            (0..count).map(|_| self.rng.random_range(0..len)).collect()
        };

        self.instances.clear();
        for pick in picks {
            let Some(animal) = self.catalog.get(pick).cloned() else {
                continue;
            };
            let inst = self.spawn(animal);
            self.instances.push(inst);
        }

        log::info!(
            "Population started: {}",
            self.instances
                .iter()
                .map(|i| i.animal.id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.mark_changed();
    }

    /// Remove an instance and spawn its successor in the same slot
    ///
    /// Returns the new instance id, or None if `removed` is not active.
    pub fn replace(&mut self, removed: &InstanceId) -> Option<InstanceId> {
        let Some(slot) = self.index_of(removed.as_str()) else {
            log::debug!("Replace ignored for stale instance {removed}");
            return None;
        };

        let animal = {
            let remaining: Vec<String> = self
                .instances
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != slot)
                .map(|(_, inst)| inst.animal.id.clone())
                .collect();
            self.pick_species(&remaining)
        };

        let inst = self.spawn(animal);
        let added = inst.id.clone();
        log::info!("Replaced {} with {}", removed, added);

        self.instances[slot] = inst;
        self.events.push(SimEvent::Replaced {
            removed: removed.clone(),
            added: added.clone(),
        });
        self.mark_changed();
        Some(added)
    }

    /// Uniformly pick a species not in `exclude`, or from the full catalog
    /// when every species is excluded
    fn pick_species(&mut self, exclude: &[String]) -> Arc<AnimalDef> {
        let mut candidates: Vec<&Arc<AnimalDef>> = self
            .catalog
            .iter()
            .filter(|a| !exclude.contains(&a.id))
            .collect();

        if candidates.is_empty() {
            log::debug!("Every species is on screen, sampling the full catalog");
            candidates = self.catalog.iter().collect();
        }

        // Catalog is non-empty (checked in World::new)
        let idx = self.rng.random_range(0..candidates.len());
        Arc::clone(candidates[idx])
    }

    /// Build a new moving instance with the spawn policy
    fn spawn(&mut self, animal: Arc<AnimalDef>) -> ActiveInstance {
        let span = self.arena().max_corner();
        let fx = SPAWN_MIN_FRACTION + self.rng.random::<f32>() * SPAWN_SPAN_FRACTION;
        let fy = SPAWN_MIN_FRACTION + self.rng.random::<f32>() * SPAWN_SPAN_FRACTION;
        let pos = Vec2::new(fx * span.x, fy * span.y);
        let vel = Vec2::new(self.random_speed(), self.random_speed());

        let id = self.next_instance_id(&animal.id);
        self.events.push(SimEvent::Spawned {
            instance_id: id.clone(),
            species_id: animal.id.clone(),
        });
        log::debug!("Spawned {} at ({:.1}, {:.1}) vel ({:.2}, {:.2})", id, pos.x, pos.y, vel.x, vel.y);

        ActiveInstance {
            id,
            animal,
            state: AnimalState::Moving,
            pos,
            vel,
            spawned_at: self.now,
        }
    }

    /// Speed magnitude in the configured range, random sign
    fn random_speed(&mut self) -> f32 {
        let (min, max) = (self.config.speed_min, self.config.speed_max);
        let magnitude = min + self.rng.random::<f32>() * (max - min);
        if self.rng.random_bool(0.5) {
            magnitude
        } else {
            -magnitude
        }
    }
}
