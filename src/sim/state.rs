//! World state and core simulation types
//!
//! The world owns the active instance list exclusively. Motion and lifecycle
//! code mutate instance fields in place; only the population code adds or
//! removes instances.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::motion::Arena;
use crate::catalog::{AnimalDef, Catalog};
use crate::consts::SIM_DT;
use crate::settings::{ConfigError, SimConfig};

/// Lifecycle stage of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Roaming, bouncing and tappable
    Moving,
    /// Tapped; wobbling in place while its sound plays
    Shaking,
    /// Running off screen, about to be replaced
    Escaping,
}

/// Phase plus the timer data that phase needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimalState {
    Moving,
    Shaking {
        since: Duration,
        until: Duration,
    },
    Escaping {
        /// Direction of travel (radians, [0, 2π))
        angle: f32,
        /// Position when the escape started
        origin: Vec2,
        since: Duration,
        until: Duration,
    },
}

impl AnimalState {
    pub fn phase(&self) -> Phase {
        match self {
            AnimalState::Moving => Phase::Moving,
            AnimalState::Shaking { .. } => Phase::Shaking,
            AnimalState::Escaping { .. } => Phase::Escaping,
        }
    }

    /// When the current phase's timer fires (None while moving)
    pub fn deadline(&self) -> Option<Duration> {
        match *self {
            AnimalState::Moving => None,
            AnimalState::Shaking { until, .. } | AnimalState::Escaping { until, .. } => Some(until),
        }
    }
}

/// Unique id of one spawned instance, never reused within a world
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for InstanceId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// One animal currently on screen
#[derive(Debug, Clone)]
pub struct ActiveInstance {
    pub id: InstanceId,
    pub animal: Arc<AnimalDef>,
    pub state: AnimalState,
    /// Top-left corner of the sprite (px)
    pub pos: Vec2,
    /// px/tick; ignored unless moving
    pub vel: Vec2,
    pub spawned_at: Duration,
}

impl ActiveInstance {
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, AnimalState::Moving)
    }

    pub fn escape_angle(&self) -> Option<f32> {
        match self.state {
            AnimalState::Escaping { angle, .. } => Some(angle),
            _ => None,
        }
    }

    /// Sprite center for a given sprite size
    pub fn center(&self, sprite_size: f32) -> Vec2 {
        self.pos + Vec2::splat(sprite_size / 2.0)
    }

    pub fn view(&self) -> InstanceView {
        InstanceView {
            instance_id: self.id.clone(),
            species_id: self.animal.id.clone(),
            phase: self.phase(),
            position: self.pos,
            escape_angle: self.escape_angle(),
        }
    }
}

/// Read-only snapshot of an instance for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceView {
    pub instance_id: InstanceId,
    pub species_id: String,
    pub phase: Phase,
    pub position: Vec2,
    pub escape_angle: Option<f32>,
}

/// Viewport size in px
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn max_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// Something the host may want to react to (sound, UI refresh, logging)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    Spawned {
        instance_id: InstanceId,
        species_id: String,
    },
    Tapped {
        instance_id: InstanceId,
    },
    /// Fire-and-forget request for the species' sound
    SoundRequested {
        species_id: String,
    },
    EscapeStarted {
        instance_id: InstanceId,
        angle: f32,
    },
    /// An escaped instance was removed and `added` took its slot
    Replaced {
        removed: InstanceId,
        added: InstanceId,
    },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) catalog: Catalog,
    pub(crate) viewport: Viewport,
    pub(crate) rng: Pcg32,
    seed: u64,
    /// Simulation clock
    pub(crate) now: Duration,
    /// When the next motion tick is due
    pub(crate) next_tick_at: Duration,
    /// Motion ticks run so far
    pub(crate) time_ticks: u64,
    /// Active instances in slot order
    pub(crate) instances: Vec<ActiveInstance>,
    pub(crate) events: Vec<SimEvent>,
    next_ordinal: u64,
    revision: u64,
    moving_ids: Vec<InstanceId>,
    moving_revision: u64,
}

impl World {
    /// Create a world and spawn the initial population
    pub fn new(
        config: SimConfig,
        catalog: Catalog,
        viewport: Viewport,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }

        let count = config.population_size;
        let mut world = Self {
            config,
            catalog,
            viewport,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            now: Duration::ZERO,
            next_tick_at: SIM_DT,
            time_ticks: 0,
            instances: Vec::with_capacity(count),
            events: Vec::new(),
            next_ordinal: 0,
            revision: 0,
            moving_ids: Vec::new(),
            moving_revision: 0,
        };
        world.initialize(count);
        Ok(world)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Active instances in slot order
    pub fn instances(&self) -> &[ActiveInstance] {
        &self.instances
    }

    pub fn instance(&self, id: &str) -> Option<&ActiveInstance> {
        self.instances.iter().find(|i| i.id == *id)
    }

    /// Snapshot of every active instance, in slot order
    pub fn active_instances(&self) -> Vec<InstanceView> {
        self.instances.iter().map(ActiveInstance::view).collect()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bumped on every spawn, removal or phase change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Ids currently in the moving phase, in slot order
    pub fn moving_ids(&self) -> &[InstanceId] {
        &self.moving_ids
    }

    /// Bumped only when the set of moving ids changes
    pub fn moving_revision(&self) -> u64 {
        self.moving_revision
    }

    /// Collision arena for the current viewport
    pub fn arena(&self) -> Arena {
        Arena::new(self.viewport.extent(), self.config.sprite_size)
    }

    /// Change the viewport and pull moving instances back inside it
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let max = self.arena().max_corner();
        for inst in self.instances.iter_mut().filter(|i| i.is_moving()) {
            inst.pos = inst.pos.clamp(Vec2::ZERO, max);
        }
        log::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.id == *id)
    }

    /// Allocate an instance id: species, spawn time, global ordinal
    pub(crate) fn next_instance_id(&mut self, species_id: &str) -> InstanceId {
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;
        InstanceId(format!("{}_{}_{}", species_id, self.now.as_millis(), ordinal))
    }

    /// Record an observable change and re-key the moving set
    pub(crate) fn mark_changed(&mut self) {
        self.revision += 1;
        let moving: Vec<InstanceId> = self
            .instances
            .iter()
            .filter(|i| i.is_moving())
            .map(|i| i.id.clone())
            .collect();
        if moving != self.moving_ids {
            self.moving_ids = moving;
            self.moving_revision += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        World::new(
            SimConfig::default(),
            Catalog::builtin(),
            Viewport::new(400.0, 800.0),
            7,
        )
        .unwrap()
    }

    #[test]
    fn test_new_world_rejects_empty_catalog() {
        let err = World::new(
            SimConfig::default(),
            Catalog::default(),
            Viewport::new(400.0, 800.0),
            1,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyCatalog);
    }

    #[test]
    fn test_new_world_is_all_moving() {
        let world = world();
        assert_eq!(world.instances().len(), 3);
        assert!(world.instances().iter().all(|i| i.is_moving()));
        assert_eq!(world.moving_ids().len(), 3);
        assert!(world.moving_revision() > 0);
    }

    #[test]
    fn test_instance_ids_embed_species_and_are_unique() {
        let mut world = world();
        let a = world.next_instance_id("dog");
        let b = world.next_instance_id("dog");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("dog_0_"));
    }

    #[test]
    fn test_lookup_and_views() {
        let world = world();
        let first = &world.instances()[0];
        assert!(world.instance(first.id.as_str()).is_some());
        assert!(world.instance("nobody").is_none());

        let views = world.active_instances();
        assert_eq!(views.len(), 3);
        assert_eq!(views[0].species_id, first.animal.id);
        assert_eq!(views[0].phase, Phase::Moving);
        assert_eq!(views[0].escape_angle, None);
    }

    #[test]
    fn test_resize_clamps_moving_instances() {
        let mut world = world();
        world.instances[0].pos = Vec2::new(290.0, 690.0);
        world.resize(Viewport::new(200.0, 300.0));
        let max = world.arena().max_corner();
        assert_eq!(max, Vec2::new(90.0, 190.0));
        for inst in world.instances() {
            assert!(inst.pos.x <= max.x && inst.pos.y <= max.y);
        }
    }

    #[test]
    fn test_moving_revision_only_changes_with_set() {
        let mut world = world();
        let before = world.moving_revision();
        world.mark_changed();
        assert_eq!(world.moving_revision(), before);

        world.instances[1].state = AnimalState::Shaking {
            since: Duration::ZERO,
            until: Duration::from_millis(1500),
        };
        world.mark_changed();
        assert_eq!(world.moving_revision(), before + 1);
        assert_eq!(world.moving_ids().len(), 2);
    }
}
