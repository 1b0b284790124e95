use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use dashstream_common::{Color, GridPos, InstanceHandle, MaterialHandle};
use dashstream_models::{ItemIds, ModelLibrary};
use dashstream_path::PathGeometry;
use dashstream_render::{Outline, RenderBackend, RenderWindow};
use dashstream_timeline::{PortalFunction, SpeedMap};
use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, MeshStyle};
use crate::config::{StreamConfig, StreamStats, chunk_index};
use crate::error::StreamError;
use crate::level::{ItemRole, LevelData, Prefab};

/// Notification for the host, queued in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    LevelLoading,
    ItemLoaded {
        id: String,
        position: GridPos,
        rotation: i32,
        instance: InstanceHandle,
    },
    LevelLoaded,
    LevelUpdate,
    LevelUnloaded,
}

/// A placed item as seen from the world lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedItem {
    pub id: String,
    pub position: GridPos,
    pub rotation: i32,
    pub instance: InstanceHandle,
}

/// A pad and the launch angle taken from its rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadData {
    pub item: LoadedItem,
    pub angle: i32,
}

/// A portal and the path distance it triggers at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalData {
    pub item: LoadedItem,
    pub distance: f32,
    pub function: PortalFunction,
}

/// A color zone. `end_distance` is `-1` until the level finishes loading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorChangerData {
    pub start_distance: f32,
    pub end_distance: f32,
    pub color: Color,
}

/// Level streaming coordinator.
///
/// Owns every chunk of the loaded level and the per-role item lists. All
/// state is rebuilt from scratch on each load; nothing carries over between
/// levels except the material preprocessing done on the first load.
#[derive(Debug)]
pub struct World {
    config: StreamConfig,
    library: ModelLibrary,
    chunks: BTreeMap<i32, Chunk>,
    items: Vec<LoadedItem>,
    orbs: Vec<LoadedItem>,
    pads: Vec<PadData>,
    portals: Vec<PortalData>,
    color_changers: Vec<ColorChangerData>,
    speeds: Option<SpeedMap>,
    deletion_distance: f32,
    travelled: f32,
    wall_materials: BTreeMap<String, MaterialHandle>,
    unique_materials: BTreeSet<MaterialHandle>,
    outlines: BTreeMap<String, Outline>,
    preprocessed: bool,
    events: Vec<LevelEvent>,
    stats: StreamStats,
}

/// A level row after validation.
struct ResolvedRow<'a> {
    id: &'static str,
    position: GridPos,
    rotation: i32,
    prefab: &'a Prefab,
}

impl World {
    /// A world using the process-wide model catalog.
    pub fn new(config: StreamConfig) -> Self {
        Self::with_library(config, ModelLibrary::global().clone())
    }

    pub fn with_library(config: StreamConfig, library: ModelLibrary) -> Self {
        let deletion_distance = config.deletion_distance;
        Self {
            config,
            library,
            chunks: BTreeMap::new(),
            items: Vec::new(),
            orbs: Vec::new(),
            pads: Vec::new(),
            portals: Vec::new(),
            color_changers: Vec::new(),
            speeds: None,
            deletion_distance,
            travelled: 0.0,
            wall_materials: BTreeMap::new(),
            unique_materials: BTreeSet::new(),
            outlines: BTreeMap::new(),
            preprocessed: false,
            events: Vec::new(),
            stats: StreamStats::default(),
        }
    }

    /// Load a level, replacing the current one.
    ///
    /// Every row is validated before anything is placed. On error the world
    /// is left empty.
    pub fn load_level(
        &mut self,
        level: &LevelData,
        prefabs: &[Prefab],
        path: &dyn PathGeometry,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), StreamError> {
        let _span = tracing::info_span!("load_level", scene = %level.scene_name).entered();
        self.events.push(LevelEvent::LevelLoading);
        self.clear(backend);

        let rows = resolve_rows(level, prefabs)?;
        let portals = rows.iter().filter_map(|row| match row.prefab.role {
            ItemRole::Portal(function) => Some((row.position.x as f32, function)),
            _ => None,
        });
        let speeds = SpeedMap::from_portals(level.initial_speed, portals)?;

        if !self.preprocessed {
            self.preprocess_prefabs(prefabs, level.official, backend);
        }

        for row in &rows {
            self.load_item(row, level.official, path, backend);
        }

        let color_time = self.config.color_change_time;
        for zone in &mut self.color_changers {
            zone.end_distance =
                speeds.time_to_distance(speeds.distance_to_time(zone.start_distance) + color_time);
        }

        let style = MeshStyle {
            materials: &self.wall_materials,
            outlines: &self.outlines,
        };
        for chunk in self.chunks.values_mut() {
            chunk.finalize(&speeds);
            chunk.update_meshes(path, &self.library, style, backend);
        }

        self.speeds = Some(speeds);
        self.deletion_distance = self.config.deletion_distance_for(&level.scene_name);
        tracing::info!(
            items = self.items.len(),
            chunks = self.chunks.len(),
            deletion_distance = self.deletion_distance,
            "level loaded"
        );
        self.events.push(LevelEvent::LevelLoaded);
        Ok(())
    }

    /// Destroy the current level's visuals and forget it.
    pub fn unload_level(&mut self, backend: &mut dyn RenderBackend) {
        self.clear(backend);
        self.events.push(LevelEvent::LevelUnloaded);
        tracing::info!("level unloaded");
    }

    fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for chunk in self.chunks.values_mut() {
            chunk.clear(backend);
        }
        self.chunks.clear();
        self.items.clear();
        self.orbs.clear();
        self.pads.clear();
        self.portals.clear();
        self.color_changers.clear();
        self.speeds = None;
        self.travelled = 0.0;
    }

    /// Enable instancing once per unique material, create a fading copy of
    /// the first material of each catalog id, and remember the first outline
    /// seen for each id.
    fn preprocess_prefabs(&mut self, prefabs: &[Prefab], official: bool, backend: &mut dyn RenderBackend) {
        self.preprocessed = true;
        for (index, prefab) in prefabs.iter().enumerate() {
            let Some(id) = ItemIds::get(official, index) else {
                continue;
            };
            for &material in &prefab.materials {
                if !self.unique_materials.insert(material) {
                    continue;
                }
                backend.enable_instancing(material);
                if self.library.contains(id) && !self.wall_materials.contains_key(id) {
                    let fading = backend.create_fading_material(material);
                    self.wall_materials.insert(id.to_string(), fading);
                }
            }
            if let Some(outline) = prefab.outline {
                self.outlines.entry(id.to_string()).or_insert(outline);
            }
        }
        tracing::debug!(
            materials = self.unique_materials.len(),
            fading = self.wall_materials.len(),
            outlines = self.outlines.len(),
            "prefabs preprocessed"
        );
    }

    fn load_item(
        &mut self,
        row: &ResolvedRow<'_>,
        official: bool,
        path: &dyn PathGeometry,
        backend: &mut dyn RenderBackend,
    ) {
        let index = chunk_index(row.position.x);
        let settings = self.config.chunk_settings();
        let chunk = match self.chunks.entry(index) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Chunk::new(index, settings, backend)),
        };
        let instance = chunk.set_item(
            row.id,
            row.position,
            row.rotation,
            row.prefab.handle,
            row.prefab.role == ItemRole::Finish,
            path,
            &self.library,
            backend,
        );

        let loaded = LoadedItem {
            id: row.id.to_string(),
            position: row.position,
            rotation: row.rotation,
            instance,
        };
        match row.prefab.role {
            ItemRole::Orb => self.orbs.push(loaded.clone()),
            ItemRole::Pad => self.pads.push(PadData {
                item: loaded.clone(),
                angle: row.rotation,
            }),
            ItemRole::Portal(function) => self.portals.push(PortalData {
                item: loaded.clone(),
                distance: row.position.x as f32,
                function,
            }),
            ItemRole::ColorChanger => self.color_changers.push(ColorChangerData {
                start_distance: row.position.x as f32,
                end_distance: -1.0,
                color: color_changer_color(official, row.position, row.rotation),
            }),
            ItemRole::Plain | ItemRole::Finish => {}
        }
        self.items.push(loaded);

        self.events.push(LevelEvent::ItemLoaded {
            id: row.id.to_string(),
            position: row.position,
            rotation: row.rotation,
            instance,
        });
    }

    /// Variable-rate tick: push the render window to every fading material.
    pub fn update(&mut self, travelled: f32, render_distance: f32, backend: &mut dyn RenderBackend) {
        self.travelled = travelled;
        let window = self.render_window(render_distance);
        for &material in self.wall_materials.values() {
            backend.set_render_window(material, window);
        }
        tracing::trace!(min = window.min, max = window.max, "level update");
        self.events.push(LevelEvent::LevelUpdate);
    }

    /// Fixed-rate tick: advance every chunk's visibility cursors.
    pub fn fixed_update(&mut self, travelled: f32, render_distance: f32, backend: &mut dyn RenderBackend) {
        let _span = tracing::info_span!("world_fixed_update").entered();
        let start = Instant::now();
        self.travelled = travelled;
        let window = self.render_window(render_distance);

        let mut touched = 0;
        for chunk in self.chunks.values_mut() {
            touched += chunk.fixed_update(window, backend);
        }

        self.stats = StreamStats {
            chunks: self.chunks.len(),
            active_chunks: self.chunks.values().filter(|c| c.is_active()).count(),
            instances_touched: touched,
            tick_time: start.elapsed(),
        };
        tracing::trace!(
            min = window.min,
            max = window.max,
            active = self.stats.active_chunks,
            touched,
            "fixed update complete"
        );
    }

    /// Rewind every chunk's cursors. Call when the player (re)spawns, before
    /// the next fixed update.
    pub fn on_player_spawn(&mut self, backend: &mut dyn RenderBackend) {
        for chunk in self.chunks.values_mut() {
            chunk.reset_render_index(backend);
        }
        tracing::debug!(chunks = self.chunks.len(), "render index reset");
    }

    /// Window for the current travelled distance.
    pub fn render_window(&self, render_distance: f32) -> RenderWindow {
        RenderWindow::around(self.travelled, self.deletion_distance, render_distance)
    }

    /// Level time at the last reported travelled distance.
    pub fn level_time(&self) -> f32 {
        self.distance_to_time(self.travelled)
    }

    /// Distance reached after `time`. Before a level is loaded, speed is one.
    pub fn time_to_distance(&self, time: f32) -> f32 {
        self.speeds.as_ref().map_or(time, |s| s.time_to_distance(time))
    }

    /// Time at which travel reaches `distance`. Before a level is loaded, speed is one.
    pub fn distance_to_time(&self, distance: f32) -> f32 {
        self.speeds.as_ref().map_or(distance, |s| s.distance_to_time(distance))
    }

    /// The color zone governing `distance`: the one with the largest start at or before it.
    pub fn color_zone_at(&self, distance: f32) -> Option<&ColorChangerData> {
        self.color_changers
            .iter()
            .filter(|zone| zone.start_distance <= distance)
            .max_by(|a, b| a.start_distance.total_cmp(&b.start_distance))
    }

    /// Drain queued notifications in emission order.
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn library(&self) -> &ModelLibrary {
        &self.library
    }

    pub fn chunks(&self) -> &BTreeMap<i32, Chunk> {
        &self.chunks
    }

    pub fn chunk(&self, index: i32) -> Option<&Chunk> {
        self.chunks.get(&index)
    }

    pub fn items(&self) -> &[LoadedItem] {
        &self.items
    }

    pub fn orbs(&self) -> &[LoadedItem] {
        &self.orbs
    }

    pub fn pads(&self) -> &[PadData] {
        &self.pads
    }

    pub fn portals(&self) -> &[PortalData] {
        &self.portals
    }

    pub fn color_changers(&self) -> &[ColorChangerData] {
        &self.color_changers
    }

    pub fn speeds(&self) -> Option<&SpeedMap> {
        self.speeds.as_ref()
    }

    pub fn deletion_distance(&self) -> f32 {
        self.deletion_distance
    }

    pub fn travelled(&self) -> f32 {
        self.travelled
    }

    pub fn wall_materials(&self) -> &BTreeMap<String, MaterialHandle> {
        &self.wall_materials
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }
}

/// Map every row to its item id and prefab, failing on the first bad row.
fn resolve_rows<'a>(level: &LevelData, prefabs: &'a [Prefab]) -> Result<Vec<ResolvedRow<'a>>, StreamError> {
    level
        .rows
        .iter()
        .enumerate()
        .map(|(row, data)| {
            let index = data.type_index;
            let id = ItemIds::get(level.official, index).ok_or(StreamError::UnknownItemType {
                row,
                index,
                official: level.official,
            })?;
            let prefab = prefabs
                .get(index)
                .ok_or(StreamError::MissingPrefab { row, index })?;
            Ok(ResolvedRow {
                id,
                position: data.position(),
                rotation: data.rotation,
                prefab,
            })
        })
        .collect()
}

/// Color of a color changer. Official and custom content encode hue in the
/// rotation and brightness in the height, with different scales.
pub fn color_changer_color(official: bool, position: GridPos, rotation: i32) -> Color {
    let hue = rotation as f32 / 360.0;
    if official {
        Color::from_hsv(hue.abs(), 0.7, position.y as f32 / 18.0)
    } else {
        let value = ((position.y as f32 + 10.0) / 10.0).min(1.0) * 0.9;
        Color::from_hsv(hue % 1.0, 0.7, value)
    }
}
