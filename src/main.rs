//! Animal Tap headless runner
//!
//! Plays a seeded session at 60 Hz, tapping a roaming animal every few
//! seconds, and logs everything that happens.
//!
//! Usage: `animal-tap [config.json] [seconds]`
//! Set `RUST_LOG=debug` for per-tap detail and `ANIMAL_TAP_SEED` for a seed.

use std::path::Path;

use animal_tap::audio::{AudioBackend, AudioError, SoundBank, SoundHandle, dispatch_sounds};
use animal_tap::consts::SIM_DT;
use animal_tap::display;
use animal_tap::sim::{SimEvent, TickInput, Viewport, World, advance};
use animal_tap::{Catalog, SimConfig, ViewportPreset};

/// Frames between scripted taps (3 seconds)
const TAP_INTERVAL_FRAMES: u64 = 180;
const DEFAULT_SECONDS: u64 = 20;
const DEFAULT_SEED: u64 = 0xA11_7A9;

/// Stands in for a platform sound pool: every asset loads, playback is logged
#[derive(Default)]
struct LogBackend {
    refs: Vec<String>,
}

impl AudioBackend for LogBackend {
    fn load(&mut self, sound_ref: &str) -> Result<SoundHandle, AudioError> {
        self.refs.push(sound_ref.to_string());
        Ok(SoundHandle(self.refs.len() as u32 - 1))
    }

    fn play(&mut self, handle: SoundHandle, volume: f32) -> Result<(), AudioError> {
        let name = self
            .refs
            .get(handle.0 as usize)
            .ok_or(AudioError::Unavailable)?;
        log::info!("♪ {name} (volume {volume:.1})");
        Ok(())
    }
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();
    log::info!("Animal Tap (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load_from(Path::new(&path)),
        None => SimConfig::from_preset(ViewportPreset::for_width(360.0)),
    };
    let seconds = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SECONDS);
    let seed = std::env::var("ANIMAL_TAP_SEED")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SEED);

    let catalog = Catalog::builtin();
    let mut sounds = SoundBank::new(Some(LogBackend::default()));
    sounds.load_catalog(&catalog);
    for animal in catalog.iter() {
        if let Some(handle) = sounds.handle_for(&animal.id) {
            sounds.mark_loaded(handle);
        }
    }

    let viewport = Viewport::new(1080.0, 1920.0);
    let mut world = match World::new(config, catalog, viewport, seed) {
        Ok(world) => world,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };
    log::info!("World initialized with seed: {}", world.seed());

    let frames = seconds * 60;
    let mut moving_revision = world.moving_revision();
    for frame in 1..=frames {
        let mut input = TickInput::default();
        if frame % TAP_INTERVAL_FRAMES == 0 {
            if let Some(id) = world.moving_ids().first() {
                input.taps.push(id.clone());
            }
        }

        advance(&mut world, &input, SIM_DT);

        let events = world.drain_events();
        dispatch_sounds(&events, &mut sounds);
        for event in &events {
            log_event(&world, event);
        }
        if let Some(caption) = display::caption(&world).filter(|_| !events.is_empty()) {
            log::info!("  \"{}\" - {}", caption.title, caption.vocalization);
        }
        if world.moving_revision() != moving_revision {
            moving_revision = world.moving_revision();
            log::debug!("Moving set now {:?}", world.moving_ids());
        }
    }

    log::info!(
        "Finished after {} ticks ({:.1}s simulated)",
        world.time_ticks(),
        world.now().as_secs_f32()
    );
    match serde_json::to_string_pretty(&world.active_instances()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Snapshot failed: {e}"),
    }
}

fn log_event(world: &World, event: &SimEvent) {
    let t = world.now().as_millis();
    match event {
        SimEvent::Spawned {
            instance_id,
            species_id,
        } => log::info!("[{t:>6}ms] {species_id} appears ({instance_id})"),
        SimEvent::Tapped { instance_id } => log::info!("[{t:>6}ms] tap {instance_id}"),
        SimEvent::SoundRequested { species_id } => {
            log::debug!("[{t:>6}ms] sound requested for {species_id}")
        }
        SimEvent::EscapeStarted { instance_id, angle } => {
            log::info!("[{t:>6}ms] {instance_id} runs away at {:.0}°", angle.to_degrees())
        }
        SimEvent::Replaced { removed, added } => {
            log::info!("[{t:>6}ms] {removed} replaced by {added}")
        }
    }
}
