//! Spell and buff catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::{BuffDef, ContentLibrary, SpellDef};
use crate::loaders::{LoadResult, read_file};

/// Spell catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpellCatalog {
    pub spells: Vec<SpellDef>,
}

/// Buff catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuffCatalog {
    pub buffs: Vec<BuffDef>,
}

/// Loader for spell and buff catalogs from RON files.
pub struct ContentLoader;

impl ContentLoader {
    pub fn load_spells(path: &Path) -> LoadResult<Vec<SpellDef>> {
        let content = read_file(path)?;
        let catalog: SpellCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse spell catalog RON: {}", e))?;

        Ok(catalog.spells)
    }

    pub fn load_buffs(path: &Path) -> LoadResult<Vec<BuffDef>> {
        let content = read_file(path)?;
        let catalog: BuffCatalog = ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse buff catalog RON: {}", e))?;

        Ok(catalog.buffs)
    }

    /// Loads both catalogs and compiles them into a library.
    pub fn load(buffs: &Path, spells: &Path) -> LoadResult<ContentLibrary> {
        let buffs = Self::load_buffs(buffs)?;
        let spells = Self::load_spells(spells)?;
        ContentLibrary::compile(&buffs, &spells)
    }
}
