//! Item model library: procedurally generated face sets keyed by item id.
//!
//! Models are generated once for [`DETAIL_LEVELS`] subdivision levels per
//! shape family and are immutable afterwards. Streaming code selects a detail
//! level from local path curvature and culls faces against neighbors.
//!
//! # Invariants
//! - Triangle indices always reference vertices of the same face.
//! - Every face carries one of the six axis directions for culling.

mod face;
mod ids;
mod library;

pub use face::{
    DETAIL_LEVELS, Direction, Face, Model, full_block_models, generate_plane, generate_triangle,
    half_block_models, slope_models,
};
pub use ids::{ItemIds, item};
pub use library::{CatalogEntry, CatalogManifest, ModelError, ModelLibrary};

pub fn crate_info() -> &'static str {
    "dashstream-models v0.1.0"
}
