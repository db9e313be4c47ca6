//! Actors (characters that cast and carry buffs) and plain targetable objects.

mod attributes;

pub use attributes::{Attribute, AttributeCollection, AttributeComponent, AttributeKind};

use std::fmt;
use std::sync::Arc;

use crate::buff::{BuffContainer, BuffVisibility};
use crate::config::EngineConfig;
use crate::context::{CastRef, HitRef};
use crate::rules::ConditionCollection;
use crate::types::{ActorId, CastId, ContextId, TargetableId, Vec3};
use crate::world::World;

/// Actor-side hit validation hook (evasion, immunity, phasing).
pub trait HitFilter: Send + Sync {
    fn accepts_hit(&self, world: &World, hit: &HitRef) -> bool;
}

/// Everything needed to spawn an actor.
#[derive(Clone, Default)]
pub struct CharacterSpec {
    pub name: String,
    pub position: Vec3,
    pub attributes: AttributeCollection,
    pub interrupt_conditions: ConditionCollection<CastRef>,
    pub hit_filter: Option<Arc<dyn HitFilter>>,
}

impl CharacterSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeCollection) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_interrupts(mut self, interrupts: ConditionCollection<CastRef>) -> Self {
        self.interrupt_conditions = interrupts;
        self
    }

    pub fn with_hit_filter(mut self, filter: Arc<dyn HitFilter>) -> Self {
        self.hit_filter = Some(filter);
        self
    }
}

/// A live actor.
pub struct Character {
    id: ActorId,
    name: String,
    root_context: ContextId,
    pub position: Vec3,
    pub alive: bool,
    pub targetable: bool,
    pub attributes: AttributeCollection,
    visible_buffs: BuffContainer,
    hidden_buffs: BuffContainer,
    active_casts: Vec<CastId>,
    interrupt_conditions: ConditionCollection<CastRef>,
    hit_filter: Option<Arc<dyn HitFilter>>,
}

impl Character {
    pub(crate) fn new(id: ActorId, root_context: ContextId, spec: CharacterSpec) -> Self {
        Self {
            id,
            name: spec.name,
            root_context,
            position: spec.position,
            alive: true,
            targetable: true,
            attributes: spec.attributes,
            visible_buffs: BuffContainer::new(),
            hidden_buffs: BuffContainer::new(),
            active_casts: Vec::new(),
            interrupt_conditions: spec.interrupt_conditions,
            hit_filter: spec.hit_filter,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier used as the suffix of every context this actor sources.
    pub fn identifier(&self) -> &str {
        &self.name
    }

    pub fn root_context(&self) -> ContextId {
        self.root_context
    }

    pub fn attribute(&self, kind: AttributeKind) -> f64 {
        self.attributes.value(kind)
    }

    pub fn buffs(&self, visibility: BuffVisibility) -> &BuffContainer {
        match visibility {
            BuffVisibility::Visible => &self.visible_buffs,
            BuffVisibility::Hidden => &self.hidden_buffs,
        }
    }

    pub(crate) fn buffs_mut(&mut self, visibility: BuffVisibility) -> &mut BuffContainer {
        match visibility {
            BuffVisibility::Visible => &mut self.visible_buffs,
            BuffVisibility::Hidden => &mut self.hidden_buffs,
        }
    }

    /// True when a buff of that name is present in either container.
    pub fn has_buff_named(&self, name: &str) -> bool {
        self.visible_buffs.by_name(name).next().is_some()
            || self.hidden_buffs.by_name(name).next().is_some()
    }

    pub fn active_casts(&self) -> &[CastId] {
        &self.active_casts
    }

    /// Whether another cast may start.
    pub fn can_cast(&self) -> bool {
        self.alive && self.active_casts.len() < EngineConfig::MAX_ACTIVE_CASTS_PER_ACTOR
    }

    pub(crate) fn add_cast(&mut self, cast: CastId) {
        if !self.active_casts.contains(&cast) {
            self.active_casts.push(cast);
        }
    }

    pub(crate) fn clear_cast(&mut self, cast: CastId) {
        self.active_casts.retain(|&c| c != cast);
    }

    /// Default interrupt set. Casts copy it when their wind-up begins, so
    /// edits only affect later casts.
    pub fn interrupt_conditions(&self) -> &ConditionCollection<CastRef> {
        &self.interrupt_conditions
    }

    pub fn interrupt_conditions_mut(&mut self) -> &mut ConditionCollection<CastRef> {
        &mut self.interrupt_conditions
    }

    pub fn hit_filter(&self) -> Option<&Arc<dyn HitFilter>> {
        self.hit_filter.as_ref()
    }

    pub fn set_hit_filter(&mut self, filter: Option<Arc<dyn HitFilter>>) {
        self.hit_filter = filter;
    }

    pub(crate) fn take_buffs(&mut self) -> (BuffContainer, BuffContainer) {
        (
            std::mem::take(&mut self.visible_buffs),
            std::mem::take(&mut self.hidden_buffs),
        )
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("alive", &self.alive)
            .field("active_casts", &self.active_casts)
            .field("visible_buffs", &self.visible_buffs.len())
            .field("hidden_buffs", &self.hidden_buffs.len())
            .finish()
    }
}

/// A scene object that can be targeted but does not act.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SceneObject {
    pub id: TargetableId,
    pub label: String,
    pub position: Vec3,
    pub targetable: bool,
}
