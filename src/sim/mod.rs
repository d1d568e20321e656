//! Deterministic simulation module
//!
//! All lifecycle and motion logic lives here:
//! - Fixed motion timestep, explicit `advance(dt)` driven by the host
//! - Seeded RNG only
//! - Stable iteration order (slot order)
//! - No rendering or audio dependencies; sounds are requested via events

pub mod lifecycle;
pub mod motion;
pub mod population;
pub mod state;
pub mod tick;

pub use lifecycle::TapOutcome;
pub use motion::{
    Arena, ContactResult, MotionReport, approach_speed, circle_contact, reflect_walls,
    resolve_pair, step_motion,
};
pub use state::{
    ActiveInstance, AnimalState, InstanceId, InstanceView, Phase, SimEvent, Viewport, World,
};
pub use tick::{AdvanceReport, TickInput, advance, step};
