//! Buff attachment, stacking and the per-tick lifecycle.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{TickHandle, World};
use crate::buff::{Buff, BuffDefinition, BuffKey, BuffVisibility, StackOutcome, buff_identity};
use crate::bus::TICK;
use crate::context::{AsContext, BuffRef, ContextKind, ContextRef};
use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::types::ActorId;

/// Result of [`World::attach_buff`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuffAttach {
    /// A new instance was possessed.
    Attached(BuffKey),
    /// The identity was present and the stacking policy applied.
    Stacked { key: BuffKey, stacks: u32 },
    /// The identity was present and its policy is `NOTHING`.
    Ignored(BuffKey),
}

impl BuffAttach {
    pub fn key(&self) -> &BuffKey {
        match self {
            BuffAttach::Attached(key) | BuffAttach::Ignored(key) => key,
            BuffAttach::Stacked { key, .. } => key,
        }
    }
}

impl World {
    /// Attaches a buff to `owner` on behalf of `origin`.
    ///
    /// The identity is the buff's name joined with the identifier of the
    /// originating context, so re-applying the same buff from the same spell
    /// and caster resolves through stacking instead of creating a second
    /// instance.
    pub fn attach_buff(
        &mut self,
        owner: ActorId,
        visibility: BuffVisibility,
        definition: Arc<dyn BuffDefinition>,
        origin: &impl AsContext,
    ) -> EngineResult<BuffAttach> {
        let origin_identifier = self
            .contexts
            .identifier(origin.context_id())
            .ok_or(EngineError::UnknownContext(origin.context_id()))?;
        let key = BuffKey {
            owner,
            visibility,
            identity: buff_identity(definition.name(), origin_identifier),
        };
        let now = self.now();

        let actor = self
            .actors
            .get_mut(&owner)
            .ok_or(EngineError::UnknownActor(owner))?;
        if let Some(existing) = actor.buffs_mut(visibility).get_mut(&key.identity) {
            let outcome = existing.stack(now);
            let buff_ref = buff_ref(existing, &key);
            let existing_definition = Arc::clone(existing.definition());
            return Ok(match outcome {
                StackOutcome::Ignored => {
                    trace!(identity = %key.identity, "re-attach ignored");
                    BuffAttach::Ignored(key)
                }
                StackOutcome::Stacked { stacks, reset } => {
                    debug!(identity = %key.identity, stacks, reset, "buff stacked");
                    existing_definition.effects().stack.run(self, &buff_ref);
                    self.publish(EngineEvent::BuffStacked {
                        owner,
                        identity: key.identity.clone(),
                        stacks,
                    });
                    BuffAttach::Stacked { key, stacks }
                }
            });
        }

        let root = actor.root_context();
        let source = origin.source();
        let source_identifier = self
            .actors
            .get(&source)
            .map(|a| a.identifier().to_owned())
            .ok_or(EngineError::UnknownActor(source))?;
        let context = self.contexts.create(
            definition.name(),
            source,
            &source_identifier,
            ContextKind::Buff,
        );
        self.contexts.add_child(root, context);

        let mut buff = Buff::new(
            key.identity.clone(),
            Arc::clone(&definition),
            context,
            source,
            now,
        );
        let subscription = self.bus.subscribe(TICK, TickHandle::Buff(key.clone()));
        buff.subscription = Some(subscription);
        let buff_ref = buff_ref(&buff, &key);
        let inserted = match self.actors.get_mut(&owner) {
            Some(actor) => actor
                .buffs_mut(visibility)
                .insert(buff)
                .map_err(|buff| EngineError::DuplicateBuff {
                    owner,
                    identity: buff.identity().to_owned(),
                }),
            None => Err(EngineError::UnknownActor(owner)),
        };
        if let Err(error) = inserted {
            self.bus.unsubscribe(subscription);
            self.contexts.remove(context);
            return Err(error);
        }

        debug!(identity = %key.identity, %owner, %visibility, "buff possessed");
        self.publish(EngineEvent::BuffAttached {
            owner,
            visibility,
            identity: key.identity.clone(),
        });
        definition.effects().possess.run(self, &buff_ref);
        Ok(BuffAttach::Attached(key))
    }

    pub fn buff(&self, key: &BuffKey) -> Option<&Buff> {
        self.actors
            .get(&key.owner)?
            .buffs(key.visibility)
            .get(&key.identity)
    }

    /// Flags a buff so its next tick takes the terminate path. Returns false
    /// when no such buff exists.
    pub fn terminate_buff(&mut self, key: &BuffKey) -> bool {
        match self.buff_mut(key) {
            Some(buff) => {
                buff.terminate();
                true
            }
            None => false,
        }
    }

    pub(super) fn tick_buff(&mut self, key: &BuffKey) -> EngineResult<()> {
        let now = self.now();
        let Some(buff) = self.buff(key) else {
            return Ok(());
        };
        let definition = Arc::clone(buff.definition());
        let buff_ref = buff_ref(buff, key);

        if buff.is_terminated() {
            self.unsubscribe_buff(key);
            definition.effects().terminate.run(self, &buff_ref);
            self.remove_buff(key);
            debug!(identity = %key.identity, "buff terminated");
            self.publish(EngineEvent::BuffTerminated {
                owner: key.owner,
                identity: key.identity.clone(),
            });
            return Ok(());
        }

        if self.buff_mut(key).is_some_and(|b| b.take_tick(now)) {
            definition.effects().tick.run(self, &buff_ref);
        }

        let Some(buff) = self.buff(key) else {
            return Ok(());
        };
        let done_conditions = definition.done_conditions();
        let done = (!done_conditions.is_empty() && done_conditions.check(self, &buff_ref))
            || buff.life_ratio(now) >= 1.0;
        if done {
            let epsilon = self.config.buff_done_epsilon;
            if let Some(buff) = self.buff_mut(key) {
                buff.finish(epsilon);
            }
            self.unsubscribe_buff(key);
            definition.effects().done.run(self, &buff_ref);
            self.remove_buff(key);
            debug!(identity = %key.identity, "buff expired");
            self.publish(EngineEvent::BuffExpired {
                owner: key.owner,
                identity: key.identity.clone(),
            });
            return Ok(());
        }

        // Takes effect on the next tick.
        let terminate_conditions = definition.terminate_conditions();
        if !terminate_conditions.is_empty() && terminate_conditions.check(self, &buff_ref) {
            trace!(identity = %key.identity, "terminate conditions hold");
            if let Some(buff) = self.buff_mut(key) {
                buff.terminate();
            }
        }
        Ok(())
    }

    fn buff_mut(&mut self, key: &BuffKey) -> Option<&mut Buff> {
        self.actors
            .get_mut(&key.owner)?
            .buffs_mut(key.visibility)
            .get_mut(&key.identity)
    }

    fn unsubscribe_buff(&mut self, key: &BuffKey) {
        if let Some(subscription) = self.buff_mut(key).and_then(|b| b.subscription.take()) {
            self.bus.unsubscribe(subscription);
        }
    }

    fn remove_buff(&mut self, key: &BuffKey) {
        let removed = self
            .actors
            .get_mut(&key.owner)
            .and_then(|a| a.buffs_mut(key.visibility).remove(&key.identity));
        if let Some(mut buff) = removed {
            buff.mark_cleaned_up();
            if let Some(subscription) = buff.subscription.take() {
                self.bus.unsubscribe(subscription);
            }
            self.contexts.remove(buff.context());
        }
    }
}

fn buff_ref(buff: &Buff, key: &BuffKey) -> BuffRef {
    BuffRef {
        context: ContextRef {
            id: buff.context(),
            source: buff.source(),
        },
        key: key.clone(),
    }
}
