//! Shared value types: grid positions, transforms, colors and backend handles.
//!
//! # Invariants
//! - Handles are opaque integers issued by the rendering backend; nothing in
//!   the streaming core dereferences them.
//! - `GridPos` ordering is total so maps keyed by it iterate deterministically.

mod types;

pub use types::{
    Color, GridPos, InstanceHandle, MaterialHandle, MeshHandle, PrefabHandle, Transform,
};

pub fn crate_info() -> &'static str {
    "dashstream-common v0.1.0"
}
