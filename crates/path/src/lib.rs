//! Path geometry: the distance-parameterized curve a level is laid out along.
//!
//! The streaming core only consumes the [`PathGeometry`] trait. [`VertexPath`]
//! is a polyline implementation used by tools, tests and the CLI.
//!
//! # Invariants
//! - Queries outside `[0, length]` are resolved by the path's [`EndOfPath`]
//!   policy, never by callers.

mod geometry;
mod rotation;

pub use geometry::{EndOfPath, PathError, PathGeometry, VertexPath};
pub use rotation::{delta_angle, euler_degrees, from_euler_degrees, look_rotation};

pub fn crate_info() -> &'static str {
    "dashstream-path v0.1.0"
}
