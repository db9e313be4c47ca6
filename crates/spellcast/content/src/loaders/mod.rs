//! Loaders for engine configuration, content catalogs and scenarios.
//!
//! TOML carries engine configuration; RON carries spell and buff catalogs
//! and scripted scenarios.

pub mod config;
pub mod content;
pub mod factory;
pub mod scenario;

pub use config::ConfigLoader;
pub use content::{BuffCatalog, ContentLoader, SpellCatalog};
pub use factory::ContentFactory;
pub use scenario::{ScenarioAction, ScenarioActor, ScenarioDef, ScenarioLoader, ScenarioStep};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
