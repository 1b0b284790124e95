//! Developer Tooling: level inspector and demo level generator.
//!
//! # Invariants
//! - Tools only read world state; they never drive the per-tick passes.
//! - Demo levels are deterministic for a given section count.

mod demo;
mod inspector;

pub use demo::{DemoLevel, demo_level, role_for};
pub use inspector::{ChunkInfo, LevelInspector, LevelSummary};

pub fn crate_info() -> &'static str {
    "dashstream-tools v0.1.0"
}
