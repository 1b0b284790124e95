//! Streaming: chunked level placement, merged-mesh culling, visibility windowing.
//!
//! # Invariants
//! - Chunk membership depends only on an item's x position; items never move
//!   between chunks.
//! - Merged meshes are rebuilt on level load only. The per-tick visibility
//!   pass costs O(instances crossing the window), not O(items).
//! - A failed level load leaves no partial level behind.
//!
//! The [`World`] drives everything through a [`dashstream_render::RenderBackend`];
//! hosts drain [`LevelEvent`]s once per tick.

mod chunk;
mod config;
mod error;
mod item;
mod level;
mod world;

pub use chunk::{Chunk, ChunkMesh, ItemInstance, MeshStyle, scale_in, scale_out};
pub use config::{CHUNK_WIDTH, ChunkSettings, StreamConfig, StreamStats, chunk_index};
pub use error::StreamError;
pub use item::{ItemInfo, path_space_to_world};
pub use level::{ItemRole, LevelData, LevelRow, Prefab};
pub use world::{
    ColorChangerData, LevelEvent, LoadedItem, PadData, PortalData, World, color_changer_color,
};

pub fn crate_info() -> &'static str {
    "dashstream-stream v0.1.0"
}
