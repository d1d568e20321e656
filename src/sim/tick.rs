//! Simulation clock
//!
//! One sequential scheduler drives both fixed-step motion ticks and phase
//! timer expirations, in time order. The host calls `advance` on its own
//! cadence; nothing here runs on its own.

use std::time::Duration;

use super::motion::{MotionReport, step_motion};
use super::state::{InstanceId, Phase, World};
use super::TapOutcome;
use crate::consts::SIM_DT;

/// Input gathered by the host since the last advance
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tapped instance ids, in tap order
    pub taps: Vec<InstanceId>,
}

/// Summary of one advance call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub ticks: u32,
    pub timers_fired: u32,
    /// Motion ticks skipped because the substep cap was hit
    pub ticks_dropped: u32,
    pub taps: Vec<TapOutcome>,
    pub motion: MotionReport,
}

enum Next {
    Timer(Duration, InstanceId, Phase),
    Tick(Duration),
}

/// Apply taps at the current time, then move the clock forward by `dt`
///
/// Timers and motion ticks that fall inside the window run in time order.
/// A timer due at the same instant as a tick fires first, so an animal that
/// stops moving at time t is not integrated at t.
pub fn advance(world: &mut World, input: &TickInput, dt: Duration) -> AdvanceReport {
    let mut report = AdvanceReport::default();

    for id in &input.taps {
        report.taps.push(world.tap(id.as_str()));
    }

    let target = world.now + dt;
    let max_substeps = world.config.max_substeps;

    loop {
        let timer = world.next_deadline().filter(|(at, _, _)| *at <= target);
        let tick_due = report.ticks < max_substeps && world.next_tick_at <= target;

        let next = match timer {
            Some((at, id, phase)) if !tick_due || at <= world.next_tick_at => {
                Next::Timer(at, id, phase)
            }
            _ if tick_due => Next::Tick(world.next_tick_at),
            _ => break,
        };

        match next {
            Next::Timer(at, id, phase) => {
                world.now = world.now.max(at);
                if !world.expire_timer(&id, phase) {
                    log::warn!("Timer for {id} did not fire, stopping this advance early");
                    break;
                }
                report.timers_fired += 1;
            }
            Next::Tick(at) => {
                world.now = world.now.max(at);
                let motion = step(world);
                report.ticks += 1;
                report.motion.wall_bounces += motion.wall_bounces;
                report.motion.contacts += motion.contacts;
                report.motion.impulses += motion.impulses;
            }
        }
    }

    // Substep cap hit: drop the backlog instead of spiralling
    while world.next_tick_at <= target {
        world.next_tick_at += SIM_DT;
        report.ticks_dropped += 1;
    }
    if report.ticks_dropped > 0 {
        log::debug!("Dropped {} motion ticks", report.ticks_dropped);
    }

    world.now = target;
    report
}

/// Run exactly one motion tick at the current time
pub fn step(world: &mut World) -> MotionReport {
    let arena = world.arena();
    let report = step_motion(&mut world.instances, &arena, 1.0);
    world.time_ticks += 1;
    world.next_tick_at += SIM_DT;
    report
}

impl World {
    /// Advance without input
    pub fn advance(&mut self, dt: Duration) -> AdvanceReport {
        advance(self, &TickInput::default(), dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnimalDef, Catalog};
    use crate::settings::SimConfig;
    use crate::sim::state::{SimEvent, Viewport};

    fn world() -> World {
        let catalog = Catalog::new(
            ["A", "B", "C", "D"]
                .iter()
                .map(|id| AnimalDef::new(id, id, id, "", 0xFF000000)),
        );
        World::new(SimConfig::default(), catalog, Viewport::new(720.0, 1280.0), 2024).unwrap()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_advance_runs_sixty_ticks_per_second() {
        let mut world = world();
        let mut ticks = 0;
        for _ in 0..60 {
            ticks += world.advance(SIM_DT).ticks;
        }
        assert_eq!(ticks, 60);
        assert_eq!(world.time_ticks(), 60);
    }

    #[test]
    fn test_moving_instances_actually_move() {
        let mut world = world();
        let before: Vec<_> = world.instances().iter().map(|i| i.pos).collect();
        world.advance(ms(100));
        let after: Vec<_> = world.instances().iter().map(|i| i.pos).collect();
        assert_ne!(before, after);
    }

    #[test]
    fn test_phase_progression_timing() {
        let mut world = world();
        let id = world.instances()[1].id.clone();
        let input = TickInput {
            taps: vec![id.clone()],
        };

        let report = advance(&mut world, &input, ms(1499));
        assert_eq!(report.taps, vec![TapOutcome::Accepted]);
        assert_eq!(world.instance(id.as_str()).unwrap().phase(), Phase::Shaking);

        world.advance(ms(1));
        assert_eq!(world.instance(id.as_str()).unwrap().phase(), Phase::Escaping);

        world.advance(ms(699));
        assert_eq!(world.instance(id.as_str()).unwrap().phase(), Phase::Escaping);
        assert_eq!(world.instances().len(), 3);

        world.advance(ms(1));
        assert!(world.instance(id.as_str()).is_none());
        assert_eq!(world.instances().len(), 3);
        assert!(world.instances()[1].is_moving());
        assert_eq!(world.instances()[1].spawned_at, ms(2200));
    }

    #[test]
    fn test_large_step_fires_both_timers_in_order() {
        let mut world = world();
        world.drain_events();
        let id = world.instances()[0].id.clone();
        world.tap(id.as_str());

        let report = world.advance(ms(5000));
        assert_eq!(report.timers_fired, 2);
        assert!(world.instance(id.as_str()).is_none());

        let events = world.drain_events();
        let escape = events
            .iter()
            .position(|e| matches!(e, SimEvent::EscapeStarted { .. }))
            .unwrap();
        let replaced = events
            .iter()
            .position(|e| matches!(e, SimEvent::Replaced { .. }))
            .unwrap();
        assert!(escape < replaced);
    }

    #[test]
    fn test_substep_cap_drops_backlog() {
        let mut world = world();
        let report = world.advance(ms(1000));
        assert_eq!(report.ticks, world.config().max_substeps);
        assert!(report.ticks_dropped > 0);

        // Clock stays sane: next frame runs a normal tick
        let report = world.advance(SIM_DT);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.ticks_dropped, 0);
    }

    #[test]
    fn test_tap_on_stale_id_in_input() {
        let mut world = world();
        let input = TickInput {
            taps: vec![InstanceId::from("gone_0_0")],
        };
        let report = advance(&mut world, &input, SIM_DT);
        assert_eq!(report.taps, vec![TapOutcome::Unknown]);
    }

    #[test]
    fn test_double_tap_in_one_frame() {
        let mut world = world();
        world.drain_events();
        let id = world.instances()[2].id.clone();
        let input = TickInput {
            taps: vec![id.clone(), id.clone()],
        };
        let report = advance(&mut world, &input, SIM_DT);
        assert_eq!(
            report.taps,
            vec![TapOutcome::Accepted, TapOutcome::NotMoving(Phase::Shaking)]
        );
        let sounds = world
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::SoundRequested { .. }))
            .count();
        assert_eq!(sounds, 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = world();
        let mut b = world();
        let tap = TickInput {
            taps: vec![a.instances()[0].id.clone()],
        };
        advance(&mut a, &tap, SIM_DT);
        advance(&mut b, &tap, SIM_DT);
        for _ in 0..300 {
            a.advance(SIM_DT);
            b.advance(SIM_DT);
        }
        assert_eq!(a.active_instances(), b.active_instances());
    }
}
