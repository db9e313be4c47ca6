//! Timed, stacking status effects.
//!
//! A buff lives in one of its owner's two containers (visible or hidden) and
//! is driven by the same tick as casts:
//!
//! ```text
//! Possessed ──tick──▶ Ticking ──tick──▶ … ──▶ Done | Terminated
//! ```
//!
//! On each tick a live buff runs its tick effects (every tick when continuous,
//! otherwise once per interval), then checks whether it is done. If it is not,
//! the terminate conditions are evaluated and, when they hold, the buff is only
//! flagged; the terminate path runs on the following tick. That extra tick is a
//! quiescence step: no effect is applied on the same tick a terminate condition
//! becomes true. [`crate::world::World::terminate_buff`] sets the same flag.

mod container;

pub use container::BuffContainer;

use std::sync::Arc;

use bitflags::bitflags;

use crate::bus::SubscriptionId;
use crate::context::BuffRef;
use crate::rules::{ConditionCollection, EffectCollection};
use crate::types::{ActorId, ContextId, GameTime};

bitflags! {
    /// What re-attaching a buff with an identity already present does.
    ///
    /// The flags are independent and may be combined; `NOTHING` wins over
    /// everything else.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct StackBehavior: u8 {
        const RESET_BEGINNING = 1 << 0;
        const INCREASE_STACKS = 1 << 1;
        const NOTHING         = 1 << 2;
    }
}

/// Which of an actor's two containers a buff lives in.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BuffVisibility {
    #[default]
    Visible,
    Hidden,
}

/// Locates one buff: owner, container, identity.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuffKey {
    pub owner: ActorId,
    pub visibility: BuffVisibility,
    pub identity: String,
}

/// Builds a buff identity: `name@owning-context-identifier`.
pub fn buff_identity(name: &str, owning_context: &str) -> String {
    format!("{name}@{owning_context}")
}

/// The effect collections a buff runs over its lifetime.
#[derive(Clone, Debug, Default)]
pub struct BuffEffects {
    pub possess: EffectCollection<BuffRef>,
    pub tick: EffectCollection<BuffRef>,
    pub done: EffectCollection<BuffRef>,
    pub terminate: EffectCollection<BuffRef>,
    /// Runs on every re-attachment that is not `NOTHING`.
    pub stack: EffectCollection<BuffRef>,
}

/// Content-author interface for a buff.
pub trait BuffDefinition: Send + Sync {
    fn name(&self) -> &str;

    /// Lifetime in seconds. Zero means the buff never expires on its own.
    fn duration(&self) -> f64;

    /// Seconds between tick effects for non-continuous buffs.
    fn interval(&self) -> f64 {
        1.0
    }

    /// Continuous buffs run their tick effects on every tick.
    fn continuous(&self) -> bool {
        false
    }

    fn max_stacks(&self) -> u32 {
        1
    }

    fn stack_behavior(&self) -> StackBehavior {
        StackBehavior::RESET_BEGINNING
    }

    fn effects(&self) -> &BuffEffects;

    /// Ends the buff through the done path when non-empty and satisfied.
    fn done_conditions(&self) -> &ConditionCollection<BuffRef>;

    /// Flags the buff for termination when non-empty and satisfied.
    fn terminate_conditions(&self) -> &ConditionCollection<BuffRef>;
}

/// Result of re-attaching an identity that is already present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackOutcome {
    Ignored,
    Stacked { stacks: u32, reset: bool },
}

/// A live buff instance.
#[derive(Clone)]
pub struct Buff {
    identity: String,
    definition: Arc<dyn BuffDefinition>,
    context: ContextId,
    source: ActorId,
    possession_time: GameTime,
    last_tick_time: GameTime,
    duration: f64,
    interval: f64,
    continuous: bool,
    current_stacks: u32,
    max_stacks: u32,
    stack_behavior: StackBehavior,
    terminated: bool,
    cleaned_up: bool,
    pub(crate) subscription: Option<SubscriptionId>,
}

impl Buff {
    pub(crate) fn new(
        identity: String,
        definition: Arc<dyn BuffDefinition>,
        context: ContextId,
        source: ActorId,
        now: GameTime,
    ) -> Self {
        Self {
            identity,
            duration: definition.duration().max(0.0),
            interval: definition.interval().max(0.0),
            continuous: definition.continuous(),
            max_stacks: definition.max_stacks().max(1),
            stack_behavior: definition.stack_behavior(),
            definition,
            context,
            source,
            possession_time: now,
            last_tick_time: now,
            current_stacks: 1,
            terminated: false,
            cleaned_up: false,
            subscription: None,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn definition(&self) -> &Arc<dyn BuffDefinition> {
        &self.definition
    }

    pub fn context(&self) -> ContextId {
        self.context
    }

    /// The actor that applied the buff.
    pub fn source(&self) -> ActorId {
        self.source
    }

    pub fn possession_time(&self) -> GameTime {
        self.possession_time
    }

    pub fn last_tick_time(&self) -> GameTime {
        self.last_tick_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn stacks(&self) -> u32 {
        self.current_stacks
    }

    pub fn max_stacks(&self) -> u32 {
        self.max_stacks
    }

    pub fn stack_behavior(&self) -> StackBehavior {
        self.stack_behavior
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up
    }

    /// Fraction of the lifetime elapsed. Zero for indefinite buffs.
    pub fn life_ratio(&self, now: GameTime) -> f64 {
        if self.duration <= 0.0 {
            0.0
        } else {
            now.since(self.possession_time) / self.duration
        }
    }

    /// Remaining lifetime in seconds, `None` for indefinite buffs.
    pub fn remaining(&self, now: GameTime) -> Option<f64> {
        (self.duration > 0.0)
            .then(|| (self.duration - now.since(self.possession_time)).max(0.0))
    }

    /// Flags the buff so its next tick takes the terminate path.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    /// Applies the stacking policy for a re-attachment at `now`.
    pub fn stack(&mut self, now: GameTime) -> StackOutcome {
        let behavior = self.stack_behavior;
        if behavior.contains(StackBehavior::NOTHING) || behavior.is_empty() {
            return StackOutcome::Ignored;
        }
        if behavior.contains(StackBehavior::INCREASE_STACKS) {
            self.current_stacks = (self.current_stacks + 1).min(self.max_stacks);
        }
        let reset = behavior.contains(StackBehavior::RESET_BEGINNING);
        if reset {
            self.possession_time = now;
        }
        StackOutcome::Stacked {
            stacks: self.current_stacks,
            reset,
        }
    }

    /// Whether tick effects run at `now`. Records the tick when they do.
    pub(crate) fn take_tick(&mut self, now: GameTime) -> bool {
        if self.continuous || now.since(self.last_tick_time) >= self.interval {
            self.last_tick_time = now;
            true
        } else {
            false
        }
    }

    /// Clamps the lifetime so the done path is final.
    pub(crate) fn finish(&mut self, epsilon: f64) {
        self.duration = epsilon;
        self.cleaned_up = true;
    }

    pub(crate) fn mark_cleaned_up(&mut self) {
        self.cleaned_up = true;
    }
}

impl std::fmt::Debug for Buff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buff")
            .field("identity", &self.identity)
            .field("possession_time", &self.possession_time)
            .field("duration", &self.duration)
            .field("stacks", &self.current_stacks)
            .field("terminated", &self.terminated)
            .field("cleaned_up", &self.cleaned_up)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain {
        behavior: StackBehavior,
        max_stacks: u32,
        duration: f64,
        effects: BuffEffects,
        none: ConditionCollection<BuffRef>,
    }

    impl Plain {
        fn new(behavior: StackBehavior, max_stacks: u32, duration: f64) -> Arc<dyn BuffDefinition> {
            Arc::new(Self {
                behavior,
                max_stacks,
                duration,
                effects: BuffEffects::default(),
                none: ConditionCollection::new(),
            })
        }
    }

    impl BuffDefinition for Plain {
        fn name(&self) -> &str {
            "plain"
        }
        fn duration(&self) -> f64 {
            self.duration
        }
        fn max_stacks(&self) -> u32 {
            self.max_stacks
        }
        fn stack_behavior(&self) -> StackBehavior {
            self.behavior
        }
        fn effects(&self) -> &BuffEffects {
            &self.effects
        }
        fn done_conditions(&self) -> &ConditionCollection<BuffRef> {
            &self.none
        }
        fn terminate_conditions(&self) -> &ConditionCollection<BuffRef> {
            &self.none
        }
    }

    fn buff(behavior: StackBehavior, max_stacks: u32, duration: f64) -> Buff {
        Buff::new(
            buff_identity("plain", "root:alice"),
            Plain::new(behavior, max_stacks, duration),
            ContextId(0),
            ActorId(0),
            GameTime(1.0),
        )
    }

    #[test]
    fn identity_format() {
        assert_eq!(buff_identity("burning", "fireball:alice"), "burning@fireball:alice");
    }

    #[test]
    fn life_ratio_is_zero_for_indefinite_buffs() {
        let b = buff(StackBehavior::NOTHING, 1, 0.0);
        assert_eq!(b.life_ratio(GameTime(100.0)), 0.0);
        assert_eq!(b.remaining(GameTime(100.0)), None);
    }

    #[test]
    fn life_ratio_tracks_elapsed_fraction() {
        let b = buff(StackBehavior::NOTHING, 1, 4.0);
        assert_eq!(b.life_ratio(GameTime(3.0)), 0.5);
        assert_eq!(b.remaining(GameTime(3.0)), Some(2.0));
    }

    #[test]
    fn nothing_wins_over_other_flags() {
        let mut b = buff(StackBehavior::NOTHING | StackBehavior::INCREASE_STACKS, 5, 4.0);
        assert_eq!(b.stack(GameTime(2.0)), StackOutcome::Ignored);
        assert_eq!(b.stacks(), 1);
        assert_eq!(b.possession_time(), GameTime(1.0));
    }

    #[test]
    fn increase_and_reset_combine() {
        let mut b = buff(
            StackBehavior::INCREASE_STACKS | StackBehavior::RESET_BEGINNING,
            2,
            4.0,
        );
        assert_eq!(
            b.stack(GameTime(2.5)),
            StackOutcome::Stacked {
                stacks: 2,
                reset: true
            }
        );
        assert_eq!(b.possession_time(), GameTime(2.5));
        // Capped at max_stacks.
        b.stack(GameTime(3.0));
        assert_eq!(b.stacks(), 2);
    }

    #[test]
    fn interval_ticks_are_throttled() {
        let mut b = buff(StackBehavior::NOTHING, 1, 10.0);
        assert!(!b.take_tick(GameTime(1.5)));
        assert!(b.take_tick(GameTime(2.0)));
        assert!(!b.take_tick(GameTime(2.9)));
        assert!(b.take_tick(GameTime(3.0)));
    }
}
