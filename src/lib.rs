//! Animal Tap - a tap-the-animal activity for small children
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, lifecycle, population)
//! - `catalog`: Static animal definitions
//! - `settings`: Viewport presets and tunable simulation constants
//! - `audio`: Species-to-sound mapping behind a fire-and-forget seam
//! - `display`: Helpers a renderer uses to draw the current state

pub mod audio;
pub mod catalog;
pub mod display;
pub mod settings;
pub mod sim;

pub use catalog::{AnimalDef, Catalog, Rgba};
pub use settings::{ConfigError, SimConfig, ViewportPreset};
pub use sim::{InstanceId, Phase, SimEvent, TapOutcome, Viewport, World};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed motion timestep (60 Hz, the cadence speeds are tuned for)
    pub const SIM_DT: Duration = Duration::from_nanos(16_666_667);
    /// Maximum motion substeps per advance call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of animals on screen at once
    pub const DEFAULT_POPULATION: usize = 3;

    /// How long a tapped animal shakes before running away
    pub const SHAKE_DURATION_MS: u64 = 1500;
    /// How long the escape run lasts before the animal is replaced
    pub const ESCAPE_DURATION_MS: u64 = 700;
    /// Escape target distance as a multiple of the larger viewport side
    pub const ESCAPE_DISTANCE_MULTIPLIER: f32 = 2.0;

    /// Spawn positions are drawn from [MIN, MIN + SPAN) of the usable span
    pub const SPAWN_MIN_FRACTION: f32 = 0.1;
    pub const SPAWN_SPAN_FRACTION: f32 = 0.55;

    /// Compact (phone) viewport: sprite size in px, speed range in px/tick
    pub const COMPACT_SPRITE_SIZE: f32 = 110.0;
    pub const COMPACT_SPEED_MIN: f32 = 3.0;
    pub const COMPACT_SPEED_MAX: f32 = 6.0;

    /// Large (tablet) viewport: bigger sprites move slower
    pub const LARGE_SPRITE_SIZE: f32 = 440.0;
    pub const LARGE_SPEED_MIN: f32 = 1.5;
    pub const LARGE_SPEED_MAX: f32 = 3.0;

    /// Viewports at least this wide (dp) use the large preset
    pub const LARGE_VIEWPORT_MIN_WIDTH: f32 = 600.0;

    /// Shake wobble: peak rotation (degrees) and time per swing
    pub const SHAKE_AMPLITUDE_DEG: f32 = 18.0;
    pub const SHAKE_HALF_PERIOD_MS: f32 = 80.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Duration in milliseconds as f32 (for easing and display math)
#[inline]
pub fn millis_f32(d: std::time::Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}
