/// Engine configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Seconds advanced by one simulation frame when the caller does not
    /// supply its own delta.
    pub frame_delta: f64,

    /// Duration a buff is clamped to when its done conditions fire.
    pub buff_done_epsilon: f64,

    /// Throttle for the per-tick casting hook when a spell does not define one.
    pub default_casting_interval: f64,

    /// Distance under which a projectile counts as having reached its target.
    pub projectile_arrival_radius: f32,
}

impl EngineConfig {
    // ===== compile-time constants =====
    /// Upper bound on targets a plural-form spell may acquire.
    pub const MAX_TARGETS: usize = 32;
    /// Casts an actor may have in flight before it reports busy.
    pub const MAX_ACTIVE_CASTS_PER_ACTOR: usize = 1;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_FRAME_DELTA: f64 = 1.0 / 60.0;
    pub const DEFAULT_BUFF_DONE_EPSILON: f64 = 1e-4;
    pub const DEFAULT_CASTING_INTERVAL: f64 = 0.25;
    pub const DEFAULT_PROJECTILE_ARRIVAL_RADIUS: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            frame_delta: Self::DEFAULT_FRAME_DELTA,
            buff_done_epsilon: Self::DEFAULT_BUFF_DONE_EPSILON,
            default_casting_interval: Self::DEFAULT_CASTING_INTERVAL,
            projectile_arrival_radius: Self::DEFAULT_PROJECTILE_ARRIVAL_RADIUS,
        }
    }

    pub fn with_frame_delta(mut self, frame_delta: f64) -> Self {
        self.frame_delta = frame_delta;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
