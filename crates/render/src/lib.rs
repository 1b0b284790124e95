//! Rendering Adapter: the narrow contract between streaming and the host renderer.
//!
//! # Invariants
//! - The streaming core only holds opaque handles issued by the backend.
//! - Per-vertex transition data travels in mesh attributes; the renderer
//!   never needs per-vertex CPU updates per frame.
//!
//! [`RecordingBackend`] implements the contract in memory for tools and tests.
//! The trait is stable; a GPU backend plugs in without changing consumers.

mod backend;
mod mesh;
mod recording;

pub use backend::{Outline, OutlineMode, RenderBackend, RenderWindow};
pub use mesh::{MeshData, MeshVertex};
pub use recording::{InstanceState, RecordedMesh, RecordingBackend};

pub fn crate_info() -> &'static str {
    "dashstream-render v0.1.0"
}
