//! Typed outcome events queued by the world for the UI layer and for tooling.

use std::collections::VecDeque;

use crate::buff::BuffVisibility;
use crate::cast::CastStage;
use crate::error::{CastRefusal, TargetingFailure};
use crate::projectile::HitValidity;
use crate::types::{ActorId, CastId, ProjectileId, Vec3};

/// Topics for event routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Topic {
    /// Outcomes a player-facing layer reports (refusals, completions, buff changes).
    Ui,
    /// Lifecycle tracing; never drives gameplay.
    Trace,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EngineEvent {
    StageEntered {
        cast: CastId,
        stage: CastStage,
    },
    CastRefused {
        caster: ActorId,
        spell: String,
        reason: CastRefusal,
    },
    /// Targeting ended without targets. Only `NotFound` is player-facing.
    TargetingFailed {
        cast: CastId,
        reason: TargetingFailure,
    },
    /// A point selection was rejected because it lies beyond the spell's range.
    TargetOutOfRange {
        cast: CastId,
        point: Vec3,
    },
    CastInterrupted {
        cast: CastId,
    },
    CastCompleted {
        cast: CastId,
        targets: usize,
    },
    ProjectileLaunched {
        cast: CastId,
        projectile: ProjectileId,
    },
    ProjectileHit {
        projectile: ProjectileId,
        validity: HitValidity,
    },
    ProjectileMissed {
        projectile: ProjectileId,
    },
    ProjectileCollected {
        projectile: ProjectileId,
        remaining: usize,
    },
    BuffAttached {
        owner: ActorId,
        visibility: BuffVisibility,
        identity: String,
    },
    BuffStacked {
        owner: ActorId,
        identity: String,
        stacks: u32,
    },
    BuffExpired {
        owner: ActorId,
        identity: String,
    },
    BuffTerminated {
        owner: ActorId,
        identity: String,
    },
}

impl EngineEvent {
    pub fn topic(&self) -> Topic {
        match self {
            EngineEvent::CastRefused { .. }
            | EngineEvent::TargetOutOfRange { .. }
            | EngineEvent::CastInterrupted { .. }
            | EngineEvent::CastCompleted { .. } => Topic::Ui,
            EngineEvent::TargetingFailed { reason, .. } => match reason {
                TargetingFailure::NotFound => Topic::Ui,
                TargetingFailure::Cancelled | TargetingFailure::Interrupted => Topic::Trace,
            },
            EngineEvent::BuffAttached { visibility, .. } => match visibility {
                BuffVisibility::Visible => Topic::Ui,
                BuffVisibility::Hidden => Topic::Trace,
            },
            EngineEvent::BuffStacked { .. }
            | EngineEvent::BuffExpired { .. }
            | EngineEvent::BuffTerminated { .. } => Topic::Ui,
            EngineEvent::StageEntered { .. }
            | EngineEvent::ProjectileLaunched { .. }
            | EngineEvent::ProjectileHit { .. }
            | EngineEvent::ProjectileMissed { .. }
            | EngineEvent::ProjectileCollected { .. } => Topic::Trace,
        }
    }
}

/// FIFO queue of events produced since the last drain.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    queue: VecDeque<EngineEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&mut self, event: EngineEvent) {
        tracing::trace!(?event, topic = ?event.topic(), "event");
        self.queue.push_back(event);
    }

    /// Removes and returns every queued event.
    pub fn drain(&mut self) -> Vec<EngineEvent> {
        self.queue.drain(..).collect()
    }

    /// Removes and returns the events of one topic, keeping the rest queued.
    pub fn drain_topic(&mut self, topic: Topic) -> Vec<EngineEvent> {
        let (taken, kept): (VecDeque<_>, VecDeque<_>) =
            self.queue.drain(..).partition(|e| e.topic() == topic);
        self.queue = kept;
        taken.into()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EngineEvent> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_not_found_targeting_failures_reach_the_ui() {
        let failed = |reason| EngineEvent::TargetingFailed {
            cast: CastId(0),
            reason,
        };
        assert_eq!(failed(TargetingFailure::NotFound).topic(), Topic::Ui);
        assert_eq!(failed(TargetingFailure::Cancelled).topic(), Topic::Trace);
        assert_eq!(failed(TargetingFailure::Interrupted).topic(), Topic::Trace);
    }

    #[test]
    fn drain_topic_keeps_other_events_in_order() {
        let mut log = EventLog::new();
        log.publish(EngineEvent::StageEntered {
            cast: CastId(1),
            stage: CastStage::Initialization,
        });
        log.publish(EngineEvent::CastInterrupted { cast: CastId(1) });
        log.publish(EngineEvent::StageEntered {
            cast: CastId(1),
            stage: CastStage::CastFail,
        });

        let ui = log.drain_topic(Topic::Ui);
        assert_eq!(ui, vec![EngineEvent::CastInterrupted { cast: CastId(1) }]);
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|e| e.topic() == Topic::Trace));
    }
}
