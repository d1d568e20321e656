//! Animal sounds
//!
//! The simulation only ever says "play the sound for species X". This module
//! turns that into a call on an opaque sound handle, resolved once when the
//! catalog is loaded. Missing or still-loading sounds are skipped silently.

use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;
use crate::sim::SimEvent;

/// Opaque handle issued by an audio backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// Audio backend failure
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("sound asset not found: {0}")]
    AssetNotFound(String),
    #[error("audio playback failed: {0}")]
    PlaybackFailed(String),
    #[error("audio output unavailable")]
    Unavailable,
}

/// Platform audio (sound pool, Web Audio, ...)
pub trait AudioBackend {
    /// Start loading an asset; the handle becomes playable once loaded
    fn load(&mut self, sound_ref: &str) -> Result<SoundHandle, AudioError>;
    fn play(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError>;
}

/// Fire-and-forget sound call-out used by the host loop
pub trait SoundPlayer {
    fn play_species(&mut self, species_id: &str);
}

/// Forward every sound request in `events` to `player`
pub fn dispatch_sounds(events: &[SimEvent], player: &mut dyn SoundPlayer) -> usize {
    let mut played = 0;
    for event in events {
        if let SimEvent::SoundRequested { species_id } = event {
            player.play_species(species_id);
            played += 1;
        }
    }
    played
}

/// Species id to sound handle mapping with volume control
pub struct SoundBank<B: AudioBackend> {
    backend: Option<B>,
    handles: HashMap<String, SoundHandle>,
    loaded: HashSet<SoundHandle>,
    master_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> SoundBank<B> {
    pub fn new(backend: Option<B>) -> Self {
        if backend.is_none() {
            log::warn!("No audio backend - animal sounds disabled");
        }
        Self {
            backend,
            handles: HashMap::new(),
            loaded: HashSet::new(),
            master_volume: 1.0,
            muted: false,
        }
    }

    /// Resolve every species' sound asset once
    ///
    /// Species whose asset fails to load are left unmapped and stay silent.
    pub fn load_catalog(&mut self, catalog: &Catalog) -> usize {
        let Some(backend) = self.backend.as_mut() else {
            return 0;
        };
        for animal in catalog.iter() {
            match backend.load(&animal.sound_ref) {
                Ok(handle) => {
                    self.handles.insert(animal.id.clone(), handle);
                }
                Err(e) => log::warn!("Sound for {} unavailable: {e}", animal.id),
            }
        }
        log::info!("Registered {}/{} animal sounds", self.handles.len(), catalog.len());
        self.handles.len()
    }

    /// Backend callback: the asset behind `handle` is ready
    pub fn mark_loaded(&mut self, handle: SoundHandle) {
        self.loaded.insert(handle);
    }

    pub fn handle_for(&self, species_id: &str) -> Option<SoundHandle> {
        self.handles.get(species_id).copied()
    }

    pub fn is_ready(&self, species_id: &str) -> bool {
        self.handle_for(species_id)
            .is_some_and(|h| self.loaded.contains(&h))
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}

impl<B: AudioBackend> SoundPlayer for SoundBank<B> {
    fn play_species(&mut self, species_id: &str) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(handle) = self.handle_for(species_id) else {
            log::debug!("No sound registered for {species_id}");
            return;
        };
        if !self.loaded.contains(&handle) {
            log::debug!("Sound for {species_id} not loaded yet");
            return;
        }
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = backend.play(handle, vol) {
            log::warn!("Playing {species_id} failed: {e}");
        }
    }
}
