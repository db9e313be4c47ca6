//! Common error infrastructure for spellcast-core.
//!
//! Errors fall into three groups:
//!
//! - **Protocol violations** ([`TargetingViolation`], [`EngineError`]): content
//!   broke the engine's contract (adding a target outside the Targeting stage,
//!   exceeding the singular-target cap, resolving a handshake twice). These are
//!   returned to the caller immediately and never retried.
//! - **Refusals** ([`CastRefusal`], [`TargetingFailure`]): ordinary outcomes of a
//!   cast attempt. They end the attempt and are reported as events, leaving the
//!   actor and the world otherwise untouched.
//! - **Diagnostics**: emitted through `tracing` and never surfaced as errors.

use crate::cast::CastStage;
use crate::types::{ActorId, CastId, ContextId, ProjectileId};

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The attempt failed but the caller may simply try again later.
    ///
    /// Examples: caster busy, no target found
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown actor or cast handle
    Validation,

    /// Unexpected state inconsistency inside the engine.
    ///
    /// Examples: a stage transition outside the transition graph
    Internal,

    /// Content broke the engine's protocol; the calling operation is aborted.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all spellcast-core errors.
pub trait SpellcastError: std::fmt::Display + std::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str;
}

// ============================================================================
// Protocol violations
// ============================================================================

/// A target-acquisition protocol violation raised by content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingViolation {
    #[error("targets can only be added during Targeting (stage is {stage})")]
    StageClosed { stage: CastStage },

    #[error("singular-form spell already holds a target")]
    SingularCapExceeded,

    #[error("target collection is full ({limit} targets)")]
    CapacityExceeded { limit: usize },

    #[error("targeting handshake was already resolved")]
    AlreadyResolved,
}

impl SpellcastError for TargetingViolation {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::StageClosed { .. } => "TARGETING_STAGE_CLOSED",
            Self::SingularCapExceeded => "TARGETING_SINGULAR_CAP",
            Self::CapacityExceeded { .. } => "TARGETING_CAPACITY",
            Self::AlreadyResolved => "TARGETING_ALREADY_RESOLVED",
        }
    }
}

// ============================================================================
// Refusals
// ============================================================================

/// Why a cast attempt was refused during Initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastRefusal {
    #[error("caster is already casting")]
    CasterBusy,

    /// The caster is dead or the spell's invoke conditions are not met.
    #[error("spell invoke conditions are not met")]
    CannotCast,

    #[error("caster {0} does not exist")]
    UnknownCaster(ActorId),
}

impl SpellcastError for CastRefusal {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownCaster(_) => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CasterBusy => "CAST_CASTER_BUSY",
            Self::CannotCast => "CAST_CANNOT_CAST",
            Self::UnknownCaster(_) => "CAST_UNKNOWN_CASTER",
        }
    }
}

/// Failure outcome of a target macro.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetingFailure {
    #[error("targeting was cancelled")]
    Cancelled,

    #[error("targeting was interrupted")]
    Interrupted,

    #[error("no valid target was found")]
    NotFound,
}

impl SpellcastError for TargetingFailure {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => "TARGETING_CANCELLED",
            Self::Interrupted => "TARGETING_INTERRUPTED",
            Self::NotFound => "TARGETING_NOT_FOUND",
        }
    }
}

// ============================================================================
// Engine errors
// ============================================================================

/// Errors surfaced by the world's public API and tick dispatch.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("{cast}: {violation}")]
    Targeting {
        cast: CastId,
        #[source]
        violation: TargetingViolation,
    },

    #[error("cast refused: {0}")]
    Refused(#[from] CastRefusal),

    #[error("{cast}: invalid stage transition {from} -> {to}")]
    InvalidTransition {
        cast: CastId,
        from: CastStage,
        to: CastStage,
    },

    #[error("unknown cast {0}")]
    UnknownCast(CastId),

    #[error("unknown actor {0}")]
    UnknownActor(ActorId),

    #[error("unknown projectile {0}")]
    UnknownProjectile(ProjectileId),

    #[error("unknown context {0}")]
    UnknownContext(ContextId),

    #[error("{owner} already carries buff `{identity}`")]
    DuplicateBuff { owner: ActorId, identity: String },
}

impl EngineError {
    pub(crate) fn targeting(cast: CastId, violation: TargetingViolation) -> Self {
        Self::Targeting { cast, violation }
    }
}

impl SpellcastError for EngineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Targeting { violation, .. } => violation.severity(),
            Self::Refused(refusal) => refusal.severity(),
            Self::InvalidTransition { .. } | Self::DuplicateBuff { .. } => ErrorSeverity::Internal,
            Self::UnknownCast(_)
            | Self::UnknownActor(_)
            | Self::UnknownProjectile(_)
            | Self::UnknownContext(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Targeting { violation, .. } => violation.error_code(),
            Self::Refused(refusal) => refusal.error_code(),
            Self::InvalidTransition { .. } => "ENGINE_INVALID_TRANSITION",
            Self::UnknownCast(_) => "ENGINE_UNKNOWN_CAST",
            Self::UnknownActor(_) => "ENGINE_UNKNOWN_ACTOR",
            Self::UnknownProjectile(_) => "ENGINE_UNKNOWN_PROJECTILE",
            Self::UnknownContext(_) => "ENGINE_UNKNOWN_CONTEXT",
            Self::DuplicateBuff { .. } => "ENGINE_DUPLICATE_BUFF",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
