use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::face::{DETAIL_LEVELS, Model, full_block_models, half_block_models};
use crate::ids::item;

/// Errors from catalog export.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Catalog of procedural models keyed by item id.
///
/// Ids sharing a shape family share one model array. Built once and only
/// read afterwards; [`ModelLibrary::global`] holds the standard catalog for
/// the whole process.
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: BTreeMap<String, Arc<[Model]>>,
    transparent: BTreeSet<String>,
}

/// Per-id summary written by [`ModelLibrary::export_json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub transparent: bool,
    pub detail_levels: usize,
    pub faces: usize,
    /// Vertex count of each detail level, lowest first.
    pub vertices: Vec<usize>,
}

/// Inspectable description of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub entries: Vec<CatalogEntry>,
}

impl ModelLibrary {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard catalog: full and half blocks, with grid blocks flagged
    /// transparent. Slopes are left out; their triangular sides and incline
    /// do not fill the bounding boxes the cull test compares.
    pub fn standard() -> Self {
        let _span = tracing::info_span!("model_library_build").entered();
        let full: Arc<[Model]> = full_block_models().into();
        let half: Arc<[Model]> = half_block_models().into();

        let mut library = Self::new();
        library.insert(item::NORMAL_BLOCK, full.clone());
        library.insert(item::GRID_BLOCK, full.clone());
        library.insert(item::COSMIC_GRID_BLOCK, full);
        library.insert(item::HALF_BLOCK, half);
        library.mark_transparent(item::GRID_BLOCK);
        library.mark_transparent(item::COSMIC_GRID_BLOCK);
        tracing::debug!(ids = library.len(), levels = DETAIL_LEVELS, "model library ready");
        library
    }

    /// Process-wide standard catalog, built on first use.
    pub fn global() -> &'static ModelLibrary {
        static LIBRARY: OnceLock<ModelLibrary> = OnceLock::new();
        LIBRARY.get_or_init(Self::standard)
    }

    /// Register a model array for an id, replacing any previous one.
    pub fn insert(&mut self, id: impl Into<String>, models: Arc<[Model]>) {
        self.models.insert(id.into(), models);
    }

    /// Flag an id as transparent: it only culls against items of the same id.
    pub fn mark_transparent(&mut self, id: impl Into<String>) {
        self.transparent.insert(id.into());
    }

    /// Whether the id has procedural models.
    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    pub fn is_transparent(&self, id: &str) -> bool {
        self.transparent.contains(id)
    }

    /// All detail levels for an id.
    pub fn models(&self, id: &str) -> Option<&[Model]> {
        self.models.get(id).map(|m| &m[..])
    }

    /// One detail level for an id; `None` if the id is unknown or the level is out of range.
    pub fn model(&self, id: &str, detail: usize) -> Option<&Model> {
        self.models(id).and_then(|m| m.get(detail))
    }

    /// Catalog ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Summarize the catalog.
    pub fn manifest(&self) -> CatalogManifest {
        let entries = self
            .models
            .iter()
            .map(|(id, models)| CatalogEntry {
                id: id.clone(),
                transparent: self.is_transparent(id),
                detail_levels: models.len(),
                faces: models.first().map_or(0, |m| m.faces.len()),
                vertices: models.iter().map(Model::vertex_count).collect(),
            })
            .collect();
        CatalogManifest { entries }
    }

    /// Write the catalog manifest to a JSON file.
    pub fn export_json(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, &self.manifest())?;
        Ok(())
    }

    /// Read a manifest written by [`ModelLibrary::export_json`].
    pub fn read_manifest(path: impl AsRef<Path>) -> Result<CatalogManifest, ModelError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
