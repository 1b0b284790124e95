use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::StreamError;

/// Width of a chunk along the path axis, in distance units.
pub const CHUNK_WIDTH: i32 = 128;

/// Chunk index owning an item at path distance `x`.
pub fn chunk_index(x: i32) -> i32 {
    x.div_euclid(CHUNK_WIDTH)
}

/// Streaming configuration: transition timings, deletion distances and culling tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Distance behind the player at which items start leaving.
    pub deletion_distance: f32,
    /// Scene-specific deletion distances, keyed by scene name.
    pub deletion_overrides: BTreeMap<String, f32>,
    /// Seconds an item takes to scale out once passed.
    pub out_animation_time: f32,
    /// Seconds an item takes to scale in once it enters the render distance.
    pub in_animation_time: f32,
    /// Seconds a color zone takes to blend in.
    pub color_change_time: f32,
    /// Slack added to each axis of a neighbor face's bounds in the cull test.
    pub cull_epsilon: f32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        let deletion_overrides = [("Shadow Siege", 75.0), ("Cosmic Growl", 70.0)]
            .into_iter()
            .map(|(name, distance)| (name.to_string(), distance))
            .collect();
        Self {
            deletion_distance: 50.0,
            deletion_overrides,
            out_animation_time: 1.0 / 1.8,
            in_animation_time: 1.0 / 7.7,
            color_change_time: 1.0 / 1.8,
            cull_epsilon: 0.1,
        }
    }
}

impl StreamConfig {
    /// Read a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Deletion distance for a scene.
    pub fn deletion_distance_for(&self, scene_name: &str) -> f32 {
        self.deletion_overrides
            .get(scene_name)
            .copied()
            .unwrap_or(self.deletion_distance)
    }

    pub fn chunk_settings(&self) -> ChunkSettings {
        ChunkSettings {
            out_animation_time: self.out_animation_time,
            in_animation_time: self.in_animation_time,
            cull_epsilon: self.cull_epsilon,
        }
    }
}

/// The part of [`StreamConfig`] each chunk needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkSettings {
    pub out_animation_time: f32,
    pub in_animation_time: f32,
    pub cull_epsilon: f32,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        StreamConfig::default().chunk_settings()
    }
}

/// Statistics from the last fixed update, for instrumentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub chunks: usize,
    pub active_chunks: usize,
    /// Instances whose activity or scale was written this tick.
    pub instances_touched: usize,
    pub tick_time: Duration,
}
