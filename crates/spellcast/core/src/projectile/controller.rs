use crate::context::{HitRef, ProjectileRef};
use crate::targeting::Target;
use crate::types::Vec3;
use crate::world::World;

/// Per-projectile motion and hit acceptance.
pub trait ProjectileController: Send {
    /// Returns the position after `dt` seconds of travel toward `target`.
    fn advance(&mut self, current: Vec3, target: Vec3, dt: f64) -> Vec3;

    /// Projectile-side hit validation, e.g. ignoring friendly actors.
    fn accepts_hit(&self, _world: &World, _hit: &HitRef) -> bool {
        true
    }
}

/// Spawns controllers for a projectile spell.
pub trait ProjectileDelivery: Send + Sync {
    fn launch(
        &self,
        world: &World,
        projectile: &ProjectileRef,
        target: &Target,
    ) -> Box<dyn ProjectileController>;
}

/// Constant-speed travel straight at the target, re-aimed every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StraightLine {
    /// Units per second.
    pub speed: f32,
}

impl StraightLine {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl ProjectileController for StraightLine {
    fn advance(&mut self, current: Vec3, target: Vec3, dt: f64) -> Vec3 {
        let to_target = target - current;
        let step = self.speed * dt as f32;
        if to_target.length() <= step {
            target
        } else {
            current + to_target.normalize_or_zero() * step
        }
    }
}

impl ProjectileDelivery for StraightLine {
    fn launch(
        &self,
        _world: &World,
        _projectile: &ProjectileRef,
        _target: &Target,
    ) -> Box<dyn ProjectileController> {
        Box::new(*self)
    }
}
