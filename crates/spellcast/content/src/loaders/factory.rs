//! Content factory for loading everything from a data directory.

use std::path::{Path, PathBuf};

use spellcast_core::EngineConfig;

use crate::data::ContentLibrary;
use crate::loaders::{ConfigLoader, ContentLoader, LoadResult, ScenarioDef, ScenarioLoader};

/// Content factory that loads all content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── buffs.ron
/// ├── spells.ron
/// └── scenarios/
///     └── skirmish.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        ConfigLoader::load(&path)
    }

    /// Load and compile `buffs.ron` and `spells.ron`.
    pub fn load_library(&self) -> LoadResult<ContentLibrary> {
        ContentLoader::load(
            &self.data_dir.join("buffs.ron"),
            &self.data_dir.join("spells.ron"),
        )
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<ScenarioDef> {
        let path = self
            .data_dir
            .join("scenarios")
            .join(format!("{}.ron", name));
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
