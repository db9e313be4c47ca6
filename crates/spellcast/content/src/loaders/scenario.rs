//! Scripted scenario loader.
//!
//! A scenario places actors and schedules commands by frame number. The sim
//! harness replays it against a world.

use std::path::Path;

use serde::{Deserialize, Serialize};

use spellcast_core::AttributeKind;

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioActor {
    pub name: String,
    #[serde(default)]
    pub position: (f32, f32, f32),
    #[serde(default)]
    pub attributes: Vec<(AttributeKind, f64)>,
}

/// A command issued against the world. Actors are referred to by name; cast
/// commands apply to the named caster's active cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScenarioAction {
    Cast { caster: String, spell: String },
    SelectPoint { caster: String, point: (f32, f32, f32) },
    SelectActor { caster: String, target: String },
    Confirm { caster: String },
    Cancel { caster: String },
    Interrupt { caster: String },
    Move { actor: String, to: (f32, f32, f32) },
    Despawn { actor: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub frame: u64,
    pub action: ScenarioAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDef {
    pub actors: Vec<ScenarioActor>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl ScenarioDef {
    /// Steps scheduled for `frame`, in file order.
    pub fn steps_at(&self, frame: u64) -> impl Iterator<Item = &ScenarioAction> {
        self.steps
            .iter()
            .filter(move |s| s.frame == frame)
            .map(|s| &s.action)
    }

    pub fn last_frame(&self) -> u64 {
        self.steps.iter().map(|s| s.frame).max().unwrap_or(0)
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<ScenarioDef> {
        let content = read_file(path)?;
        let scenario: ScenarioDef = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;

        Ok(scenario)
    }
}
