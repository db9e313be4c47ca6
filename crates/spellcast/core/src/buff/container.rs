use std::collections::BTreeMap;

use super::Buff;

/// Identity-keyed buff storage. Holds at most one live buff per identity.
#[derive(Clone, Debug, Default)]
pub struct BuffContainer {
    buffs: BTreeMap<String, Buff>,
}

impl BuffContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&Buff> {
        self.buffs.get(identity)
    }

    pub(crate) fn get_mut(&mut self, identity: &str) -> Option<&mut Buff> {
        self.buffs.get_mut(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.buffs.contains_key(identity)
    }

    /// Inserts a new buff. Returns it back if the identity is already taken.
    pub(crate) fn insert(&mut self, buff: Buff) -> Result<(), Buff> {
        if self.buffs.contains_key(buff.identity()) {
            return Err(buff);
        }
        self.buffs.insert(buff.identity().to_owned(), buff);
        Ok(())
    }

    pub(crate) fn remove(&mut self, identity: &str) -> Option<Buff> {
        self.buffs.remove(identity)
    }

    /// Buffs whose name (the part before `@`) matches.
    pub fn by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Buff> + 'a {
        self.buffs
            .values()
            .filter(move |b| b.definition().name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Buff> {
        self.buffs.values()
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.buffs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.buffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffs.is_empty()
    }
}
