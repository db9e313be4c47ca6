//! Identifiers, simulation time and spatial primitives shared by every module.

use std::fmt;

pub use glam::Vec3;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle!(
    /// Identifier of an actor (a character that can cast and carry buffs).
    ActorId,
    "actor#"
);
handle!(
    /// Identifier of a scene object that can be targeted but is not an actor.
    TargetableId,
    "object#"
);
handle!(
    /// Identifier of one cast, i.e. one use of a spell by an actor.
    CastId,
    "cast#"
);
handle!(
    /// Identifier of an in-flight projectile.
    ProjectileId,
    "projectile#"
);
handle!(
    /// Identifier of a node in the context tree.
    ContextId,
    "ctx#"
);

/// Simulation clock reading in seconds.
///
/// Time only moves when the world is ticked, so two readings taken inside the
/// same tick are always equal.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameTime(pub f64);

impl GameTime {
    pub const ZERO: Self = Self(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`. Never negative.
    pub fn since(self, earlier: GameTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }
}

impl std::ops::Add<f64> for GameTime {
    type Output = GameTime;
    fn add(self, rhs: f64) -> GameTime {
        GameTime(self.0 + rhs)
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
