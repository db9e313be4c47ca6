//! Weighted-sum attributes.
//!
//! Each attribute is a list of named components; its value is
//! `Σ weight × value`. The `base` component carries the unmodified value and
//! buffs add or remove their own components by source name.

use std::collections::BTreeMap;

/// Attributes an actor can carry.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display,
    strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttributeKind {
    Health,
    MaxHealth,
    Mana,
    MaxMana,
    Power,
    Armor,
    Haste,
    MoveSpeed,
}

/// One contribution to an attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeComponent {
    pub source: String,
    pub weight: f64,
    pub value: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    components: Vec<AttributeComponent>,
}

impl Attribute {
    pub const BASE: &'static str = "base";

    pub fn new(base: f64) -> Self {
        let mut attribute = Self::default();
        attribute.set_base(base);
        attribute
    }

    pub fn value(&self) -> f64 {
        self.components.iter().map(|c| c.weight * c.value).sum()
    }

    pub fn base(&self) -> f64 {
        self.component(Self::BASE).map_or(0.0, |c| c.value)
    }

    pub fn set_base(&mut self, value: f64) {
        self.set_component(Self::BASE, 1.0, value);
    }

    pub fn adjust_base(&mut self, delta: f64) {
        let base = self.base();
        self.set_base(base + delta);
    }

    pub fn component(&self, source: &str) -> Option<&AttributeComponent> {
        self.components.iter().find(|c| c.source == source)
    }

    /// Inserts or replaces the component contributed by `source`.
    pub fn set_component(&mut self, source: &str, weight: f64, value: f64) {
        match self.components.iter_mut().find(|c| c.source == source) {
            Some(component) => {
                component.weight = weight;
                component.value = value;
            }
            None => self.components.push(AttributeComponent {
                source: source.to_owned(),
                weight,
                value,
            }),
        }
    }

    pub fn remove_component(&mut self, source: &str) -> Option<AttributeComponent> {
        let index = self.components.iter().position(|c| c.source == source)?;
        Some(self.components.remove(index))
    }

    pub fn components(&self) -> &[AttributeComponent] {
        &self.components
    }
}

/// All attributes of one actor. Missing attributes read as zero.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeCollection {
    attributes: BTreeMap<AttributeKind, Attribute>,
}

impl AttributeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style base value.
    pub fn with(mut self, kind: AttributeKind, base: f64) -> Self {
        self.attributes.insert(kind, Attribute::new(base));
        self
    }

    pub fn value(&self, kind: AttributeKind) -> f64 {
        self.attributes.get(&kind).map_or(0.0, Attribute::value)
    }

    pub fn get(&self, kind: AttributeKind) -> Option<&Attribute> {
        self.attributes.get(&kind)
    }

    pub fn get_mut(&mut self, kind: AttributeKind) -> &mut Attribute {
        self.attributes.entry(kind).or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttributeKind, &Attribute)> {
        self.attributes.iter().map(|(&k, v)| (k, v))
    }
}
