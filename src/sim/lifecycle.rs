//! Animal lifecycle: Moving -> Shaking -> Escaping -> replaced
//!
//! Timers live inside the instance state, so removing an instance drops its
//! pending timers with it. Every timer firing re-checks that the instance
//! still exists and is still in the phase the timer was armed for.

use std::f32::consts::TAU;
use std::time::Duration;

use rand::Rng;

use super::state::{AnimalState, InstanceId, Phase, SimEvent, World};

/// What happened to a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The animal started shaking and its sound was requested
    Accepted,
    /// No active instance has that id (already replaced)
    Unknown,
    /// The animal is already reacting
    NotMoving(Phase),
    /// Another animal is reacting and only one may react at a time
    Busy,
}

impl World {
    /// Route a tap to the lifecycle
    ///
    /// Only a moving animal reacts; anything else is silently ignored.
    pub fn tap(&mut self, id: &str) -> TapOutcome {
        let Some(idx) = self.index_of(id) else {
            log::debug!("Tap on unknown instance {id} ignored");
            return TapOutcome::Unknown;
        };

        let phase = self.instances[idx].phase();
        if phase != Phase::Moving {
            log::debug!("Tap on {id} ignored while {phase:?}");
            return TapOutcome::NotMoving(phase);
        }

        if self.config.exclusive_reaction && self.instances.iter().any(|i| !i.is_moving()) {
            log::debug!("Tap on {id} ignored, another animal is reacting");
            return TapOutcome::Busy;
        }

        self.begin_shaking(idx);
        TapOutcome::Accepted
    }

    fn begin_shaking(&mut self, idx: usize) {
        let since = self.now;
        let until = since + self.config.shake_duration();

        let inst = &mut self.instances[idx];
        inst.state = AnimalState::Shaking { since, until };
        let instance_id = inst.id.clone();
        let species_id = inst.animal.id.clone();

        log::debug!("{instance_id} tapped, shaking until {}ms", until.as_millis());
        self.events.push(SimEvent::Tapped {
            instance_id,
        });
        self.events.push(SimEvent::SoundRequested { species_id });
        self.mark_changed();
    }

    /// Earliest pending phase timer; ties go to the lower slot
    pub fn next_deadline(&self) -> Option<(Duration, InstanceId, Phase)> {
        self.instances
            .iter()
            .filter_map(|inst| inst.state.deadline().map(|d| (d, inst)))
            .min_by_key(|(d, _)| *d)
            .map(|(d, inst)| (d, inst.id.clone(), inst.phase()))
    }

    /// Fire the phase timer armed for `id` in phase `expected`
    ///
    /// Does nothing unless the instance is still active, still in `expected`
    /// and its deadline has been reached. Returns whether a transition ran.
    pub fn expire_timer(&mut self, id: &InstanceId, expected: Phase) -> bool {
        let Some(idx) = self.index_of(id.as_str()) else {
            log::debug!("Timer for removed instance {id} dropped");
            return false;
        };

        let inst = &self.instances[idx];
        if inst.phase() != expected {
            log::debug!("Timer for {id} dropped: expected {expected:?}, found {:?}", inst.phase());
            return false;
        }
        let Some(deadline) = inst.state.deadline() else {
            return false;
        };
        if deadline > self.now {
            return false;
        }

        match expected {
            Phase::Shaking => {
                self.begin_escaping(idx, deadline);
                true
            }
            Phase::Escaping => self.replace(id).is_some(),
            Phase::Moving => false,
        }
    }

    fn begin_escaping(&mut self, idx: usize, since: Duration) {
        let angle = self.rng.random_range(0.0..TAU);
        let until = since + self.config.escape_duration();

        let inst = &mut self.instances[idx];
        inst.state = AnimalState::Escaping {
            angle,
            origin: inst.pos,
            since,
            until,
        };
        let instance_id = inst.id.clone();

        log::debug!("{instance_id} escaping at {angle:.2} rad");
        self.events.push(SimEvent::EscapeStarted { instance_id, angle });
        self.mark_changed();
    }

    /// How far an escaping animal travels
    pub fn escape_distance(&self) -> f32 {
        self.viewport.max_side() * self.config.escape_distance_multiplier
    }

    /// Instances currently shaking or escaping
    pub fn reacting_count(&self) -> usize {
        self.instances.iter().filter(|i| !i.is_moving()).count()
    }
}
