//! Timeline: easing curves and the mapping between path distance and level time.
//!
//! # Invariants
//! - All functions are pure; nothing here holds per-frame state.
//! - Speed markers are sorted once when a `SpeedMap` is built and never
//!   assumed sorted by the caller.

mod easing;
mod speed;

pub use easing::{Easing, EasingMode, apply_easing};
pub use speed::{PortalFunction, SpeedError, SpeedMap, SpeedMarker};

pub fn crate_info() -> &'static str {
    "dashstream-timeline v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("timeline"));
    }
}
