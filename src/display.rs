//! Display helpers for the rendering collaborator
//!
//! None of this feeds back into the simulation. A renderer calls `frame`
//! once per draw and gets everything it needs: where to put each sprite,
//! how far to rotate it and which caption to show.

use std::time::Duration;

use glam::Vec2;
use serde::Serialize;

use crate::catalog::Rgba;
use crate::consts::{SHAKE_AMPLITUDE_DEG, SHAKE_HALF_PERIOD_MS};
use crate::sim::{ActiveInstance, AnimalState, InstanceId, Phase, World};
use crate::{millis_f32, polar_to_cartesian};

/// Fast-out-linear-in easing, cubic Bézier (0.4, 0.0, 1.0, 1.0)
///
/// Starts slow and accelerates, so an escaping animal bolts off screen.
pub fn fast_out_linear_in(t: f32) -> f32 {
    const X1: f32 = 0.4;
    const X2: f32 = 1.0;

    let t = t.clamp(0.0, 1.0);
    if t == 0.0 || t == 1.0 {
        return t;
    }

    let bezier = |s: f32, p1: f32, p2: f32| {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
    };

    // x(s) is monotonic on [0, 1]; bisect for the parameter that gives t
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    for _ in 0..32 {
        let mid = (lo + hi) / 2.0;
        if bezier(mid, X1, X2) < t {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bezier((lo + hi) / 2.0, 0.0, 1.0)
}

/// Position along the escape run at `progress` in [0, 1]
pub fn escape_position(origin: Vec2, angle: f32, distance: f32, progress: f32) -> Vec2 {
    origin + polar_to_cartesian(distance * fast_out_linear_in(progress), angle)
}

/// Wobble angle in degrees after shaking for `elapsed`
///
/// Triangle wave between -18° and +18°, one swing every 80 ms.
pub fn shake_angle(elapsed: Duration) -> f32 {
    let swings = millis_f32(elapsed) / SHAKE_HALF_PERIOD_MS;
    let phase = swings % 2.0;
    let sweep = 2.0 * SHAKE_AMPLITUDE_DEG;
    if phase < 1.0 {
        -SHAKE_AMPLITUDE_DEG + sweep * phase
    } else {
        SHAKE_AMPLITUDE_DEG - sweep * (phase - 1.0)
    }
}

/// Where to draw an instance right now
pub fn display_position(world: &World, inst: &ActiveInstance) -> Vec2 {
    match inst.state {
        AnimalState::Moving | AnimalState::Shaking { .. } => inst.pos,
        AnimalState::Escaping {
            angle,
            origin,
            since,
            until,
        } => {
            let total = until.saturating_sub(since);
            let elapsed = world.now().saturating_sub(since);
            let progress = if total.is_zero() {
                1.0
            } else {
                elapsed.as_secs_f32() / total.as_secs_f32()
            };
            escape_position(origin, angle, world.escape_distance(), progress)
        }
    }
}

/// Sprite rotation in degrees right now
pub fn display_rotation(world: &World, inst: &ActiveInstance) -> f32 {
    match inst.state {
        AnimalState::Shaking { since, .. } => shake_angle(world.now().saturating_sub(since)),
        _ => 0.0,
    }
}

/// Everything needed to draw one sprite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpriteFrame {
    pub instance_id: InstanceId,
    pub species_id: String,
    pub visual_ref: String,
    pub emoji: String,
    pub color: Rgba,
    pub phase: Phase,
    pub position: Vec2,
    pub rotation_deg: f32,
}

/// Name and sound text shown in the middle of the screen while shaking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caption {
    pub title: String,
    pub vocalization: String,
}

/// Caption for the first shaking animal, if any
pub fn caption(world: &World) -> Option<Caption> {
    world
        .instances()
        .iter()
        .find(|i| i.phase() == Phase::Shaking)
        .map(|i| Caption {
            title: i.animal.display_name.clone(),
            vocalization: i.animal.vocalization.clone(),
        })
}

/// Draw list in slot order
pub fn frame(world: &World) -> Vec<SpriteFrame> {
    world
        .instances()
        .iter()
        .map(|inst| SpriteFrame {
            instance_id: inst.id.clone(),
            species_id: inst.animal.id.clone(),
            visual_ref: inst.animal.visual_ref.clone(),
            emoji: inst.animal.emoji.clone(),
            color: inst.animal.color,
            phase: inst.phase(),
            position: display_position(world, inst),
            rotation_deg: display_rotation(world, inst),
        })
        .collect()
}
