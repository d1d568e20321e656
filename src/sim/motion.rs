//! Motion integration and collision response
//!
//! Sprites are square on screen but collide as circles whose diameter is the
//! sprite size. Walls are the viewport edges minus one sprite size, so the
//! top-left corner of a moving sprite stays inside `[0, extent - size]`.

use glam::Vec2;

use super::state::ActiveInstance;

/// Rectangular play area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    /// Viewport size (px)
    pub extent: Vec2,
    /// Sprite side length, also the collision diameter
    pub sprite_size: f32,
}

impl Arena {
    pub fn new(extent: Vec2, sprite_size: f32) -> Self {
        Self {
            extent,
            sprite_size,
        }
    }

    /// Largest legal top-left position (zero if the viewport is smaller than a sprite)
    #[inline]
    pub fn max_corner(&self) -> Vec2 {
        (self.extent - Vec2::splat(self.sprite_size)).max(Vec2::ZERO)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        let max = self.max_corner();
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }
}

/// Result of a pairwise overlap check
#[derive(Debug, Clone)]
pub struct ContactResult {
    /// Whether the circles overlap
    pub hit: bool,
    /// Unit vector from the first center toward the second
    pub normal: Vec2,
    /// Center-to-center distance
    pub distance: f32,
    /// How much each body must move along the normal to separate
    pub correction: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            distance: 0.0,
            correction: 0.0,
        }
    }
}

/// Per-tick counters, mostly for tests and debug logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionReport {
    pub wall_bounces: u32,
    pub contacts: u32,
    pub impulses: u32,
}

/// Advance a position by its velocity
#[inline]
pub fn integrate(pos: Vec2, vel: Vec2, dt_scale: f32) -> Vec2 {
    pos + vel * dt_scale
}

/// Reflect off the walls, one axis at a time
///
/// Any axis that left `[0, max]` has its velocity component negated and its
/// position clamped. A corner hit flips both axes in the same call.
/// Returns the number of axes that bounced.
pub fn reflect_walls(pos: &mut Vec2, vel: &mut Vec2, max: Vec2) -> u32 {
    let mut bounces = 0;
    if pos.x < 0.0 || pos.x > max.x {
        vel.x = -vel.x;
        pos.x = pos.x.clamp(0.0, max.x);
        bounces += 1;
    }
    if pos.y < 0.0 || pos.y > max.y {
        vel.y = -vel.y;
        pos.y = pos.y.clamp(0.0, max.y);
        bounces += 1;
    }
    bounces
}

/// Check whether two circles of equal `diameter` overlap
///
/// Exactly coincident centers are reported as a miss; the pair has no
/// defined normal until they drift apart.
pub fn circle_contact(center_a: Vec2, center_b: Vec2, diameter: f32) -> ContactResult {
    let delta = center_b - center_a;
    let dist_sq = delta.length_squared();

    if dist_sq >= diameter * diameter || dist_sq <= 0.0 {
        return ContactResult::miss();
    }

    let distance = dist_sq.sqrt();
    ContactResult {
        hit: true,
        normal: delta / distance,
        distance,
        correction: (diameter - distance) / 2.0,
    }
}

/// Closing speed along the normal; positive when the pair is approaching
#[inline]
pub fn approach_speed(vel_a: Vec2, vel_b: Vec2, normal: Vec2) -> f32 {
    (vel_a - vel_b).dot(normal)
}

/// Resolve one overlapping pair
///
/// Equal-mass elastic exchange of the normal velocity component, applied
/// only while approaching. Positional correction always runs so the sprites
/// never stay interpenetrated. Returns whether an impulse was applied.
pub fn resolve_pair(
    a: &mut ActiveInstance,
    b: &mut ActiveInstance,
    contact: &ContactResult,
) -> bool {
    let n = contact.normal;
    let dot = approach_speed(a.vel, b.vel, n);
    let impulse = dot > 0.0;
    if impulse {
        a.vel -= dot * n;
        b.vel += dot * n;
    }

    a.pos -= n * contact.correction;
    b.pos += n * contact.correction;
    impulse
}

/// Borrow two distinct elements mutably
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Run one motion tick over every moving instance
///
/// Non-moving instances are skipped entirely: they are neither integrated
/// nor considered for collisions.
pub fn step_motion(
    instances: &mut [ActiveInstance],
    arena: &Arena,
    dt_scale: f32,
) -> MotionReport {
    let mut report = MotionReport::default();
    let max = arena.max_corner();

    let moving: Vec<usize> = instances
        .iter()
        .enumerate()
        .filter(|(_, inst)| inst.is_moving())
        .map(|(idx, _)| idx)
        .collect();

    for &idx in &moving {
        let inst = &mut instances[idx];
        inst.pos = integrate(inst.pos, inst.vel, dt_scale);
        report.wall_bounces += reflect_walls(&mut inst.pos, &mut inst.vel, max);
    }

    for (k, &i) in moving.iter().enumerate() {
        for &j in &moving[k + 1..] {
            let contact = circle_contact(
                instances[i].center(arena.sprite_size),
                instances[j].center(arena.sprite_size),
                arena.sprite_size,
            );
            if !contact.hit {
                continue;
            }
            report.contacts += 1;

            let (a, b) = pair_mut(instances, i, j);
            if resolve_pair(a, b, &contact) {
                report.impulses += 1;
            }
        }
    }

    // Separation can push a sprite past a wall; pull it back without a bounce
    for &idx in &moving {
        let inst = &mut instances[idx];
        inst.pos = inst.pos.clamp(Vec2::ZERO, max);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AnimalDef;
    use crate::sim::state::{AnimalState, InstanceId};
    use std::sync::Arc;
    use std::time::Duration;

    const SIZE: f32 = 100.0;

    fn body(id: &str, pos: Vec2, vel: Vec2) -> ActiveInstance {
        ActiveInstance {
            id: InstanceId::from(id),
            animal: Arc::new(AnimalDef::new(id, id, "", "", 0xFF000000)),
            state: AnimalState::Moving,
            pos,
            vel,
            spawned_at: Duration::ZERO,
        }
    }

    fn arena() -> Arena {
        Arena::new(Vec2::new(1000.0, 800.0), SIZE)
    }

    #[test]
    fn test_reflect_walls_left_and_right() {
        let max = Vec2::new(900.0, 700.0);

        let mut pos = Vec2::new(-2.0, 50.0);
        let mut vel = Vec2::new(-3.0, 1.0);
        assert_eq!(reflect_walls(&mut pos, &mut vel, max), 1);
        assert_eq!(pos, Vec2::new(0.0, 50.0));
        assert_eq!(vel, Vec2::new(3.0, 1.0));

        let mut pos = Vec2::new(903.0, 50.0);
        let mut vel = Vec2::new(5.0, 1.0);
        reflect_walls(&mut pos, &mut vel, max);
        assert_eq!(pos.x, 900.0);
        assert_eq!(vel.x, -5.0);
    }

    #[test]
    fn test_reflect_walls_corner_flips_both_axes() {
        let mut pos = Vec2::new(-1.0, 701.0);
        let mut vel = Vec2::new(-4.0, 4.0);
        let bounces = reflect_walls(&mut pos, &mut vel, Vec2::new(900.0, 700.0));
        assert_eq!(bounces, 2);
        assert_eq!(pos, Vec2::new(0.0, 700.0));
        assert_eq!(vel, Vec2::new(4.0, -4.0));
    }

    #[test]
    fn test_reflect_walls_inside_is_untouched() {
        let mut pos = Vec2::new(10.0, 10.0);
        let mut vel = Vec2::new(-4.0, 4.0);
        assert_eq!(reflect_walls(&mut pos, &mut vel, Vec2::new(900.0, 700.0)), 0);
        assert_eq!(vel, Vec2::new(-4.0, 4.0));
    }

    #[test]
    fn test_circle_contact() {
        let hit = circle_contact(Vec2::ZERO, Vec2::new(60.0, 0.0), SIZE);
        assert!(hit.hit);
        assert_eq!(hit.normal, Vec2::X);
        assert!((hit.correction - 20.0).abs() < 1e-5);

        assert!(!circle_contact(Vec2::ZERO, Vec2::new(100.0, 0.0), SIZE).hit);
        assert!(!circle_contact(Vec2::ZERO, Vec2::new(80.0, 80.0), SIZE).hit);
    }

    #[test]
    fn test_coincident_centers_are_skipped() {
        let result = circle_contact(Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0), SIZE);
        assert!(!result.hit);

        let mut instances = vec![
            body("a", Vec2::new(200.0, 200.0), Vec2::ZERO),
            body("b", Vec2::new(200.0, 200.0), Vec2::ZERO),
        ];
        let report = step_motion(&mut instances, &arena(), 1.0);
        assert_eq!(report.contacts, 0);
        assert!(instances.iter().all(|i| i.pos.is_finite()));
    }

    #[test]
    fn test_head_on_collision_exchanges_velocity() {
        let mut a = body("a", Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0));
        let mut b = body("b", Vec2::new(80.0, 0.0), Vec2::new(-3.0, 0.0));
        let contact = circle_contact(a.center(SIZE), b.center(SIZE), SIZE);

        assert!(resolve_pair(&mut a, &mut b, &contact));
        assert_eq!(a.vel, Vec2::new(-3.0, 0.0));
        assert_eq!(b.vel, Vec2::new(3.0, 0.0));
        // Pushed 10 px each, exactly touching afterwards
        assert!((a.pos.x - -10.0).abs() < 1e-4);
        assert!((b.pos.x - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_separating_pair_gets_correction_only() {
        let mut a = body("a", Vec2::new(0.0, 0.0), Vec2::new(-2.0, 0.0));
        let mut b = body("b", Vec2::new(80.0, 0.0), Vec2::new(2.0, 1.0));
        let contact = circle_contact(a.center(SIZE), b.center(SIZE), SIZE);

        assert!(!resolve_pair(&mut a, &mut b, &contact));
        assert_eq!(a.vel, Vec2::new(-2.0, 0.0));
        assert_eq!(b.vel, Vec2::new(2.0, 1.0));
        let gap = b.center(SIZE).distance(a.center(SIZE));
        assert!((gap - SIZE).abs() < 1e-3);
    }

    #[test]
    fn test_tangential_pair_gets_no_impulse() {
        // Both moving along +y, perpendicular to the x normal
        let mut a = body("a", Vec2::new(0.0, 0.0), Vec2::new(0.0, 3.0));
        let mut b = body("b", Vec2::new(90.0, 0.0), Vec2::new(0.0, 3.0));
        let contact = circle_contact(a.center(SIZE), b.center(SIZE), SIZE);
        assert!(!resolve_pair(&mut a, &mut b, &contact));
        assert_eq!(a.vel, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn test_step_skips_non_moving() {
        let mut instances = vec![
            body("a", Vec2::new(200.0, 200.0), Vec2::new(3.0, 0.0)),
            body("b", Vec2::new(260.0, 200.0), Vec2::new(-3.0, 0.0)),
        ];
        instances[1].state = AnimalState::Shaking {
            since: Duration::ZERO,
            until: Duration::from_millis(1500),
        };

        let report = step_motion(&mut instances, &arena(), 1.0);
        assert_eq!(report.contacts, 0);
        assert_eq!(instances[0].pos, Vec2::new(203.0, 200.0));
        assert_eq!(instances[1].pos, Vec2::new(260.0, 200.0));
        assert_eq!(instances[1].vel, Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn test_step_keeps_bodies_inside_after_separation() {
        // Pair jammed in the left wall: correction would push `a` out of bounds
        let mut instances = vec![
            body("a", Vec2::new(0.0, 300.0), Vec2::new(-1.0, 0.0)),
            body("b", Vec2::new(30.0, 300.0), Vec2::new(-1.0, 0.0)),
        ];
        let arena = arena();
        step_motion(&mut instances, &arena, 1.0);
        for inst in &instances {
            assert!(arena.contains(inst.pos), "{:?}", inst.pos);
        }
    }

    #[test]
    fn test_max_corner_never_negative() {
        let tiny = Arena::new(Vec2::new(50.0, 300.0), SIZE);
        assert_eq!(tiny.max_corner(), Vec2::new(0.0, 200.0));
    }
}
