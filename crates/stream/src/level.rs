use dashstream_common::{GridPos, MaterialHandle, PrefabHandle};
use dashstream_render::Outline;
use dashstream_timeline::PortalFunction;
use serde::{Deserialize, Serialize};

/// One placed item as stored in level data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRow {
    pub type_index: usize,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    /// Degrees.
    pub rotation: i32,
}

impl LevelRow {
    pub fn new(type_index: usize, position: GridPos, rotation: i32) -> Self {
        Self {
            type_index,
            x: position.x,
            y: position.y,
            z: position.z,
            rotation,
        }
    }

    pub fn position(&self) -> GridPos {
        GridPos::new(self.x, self.y, self.z)
    }
}

/// Gameplay behavior a prefab carries, which decides the world list it joins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ItemRole {
    #[default]
    Plain,
    Orb,
    Pad,
    Portal(PortalFunction),
    ColorChanger,
    /// Finish trigger; never deactivated by the out cursor.
    Finish,
}

/// A prefab as supplied by the level data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    pub handle: PrefabHandle,
    #[serde(default)]
    pub role: ItemRole,
    /// Materials of every renderer in the prefab, duplicates included.
    #[serde(default)]
    pub materials: Vec<MaterialHandle>,
    #[serde(default)]
    pub outline: Option<Outline>,
}

impl Prefab {
    pub fn new(handle: PrefabHandle, role: ItemRole) -> Self {
        Self {
            handle,
            role,
            materials: Vec::new(),
            outline: None,
        }
    }

    pub fn with_materials(mut self, materials: impl IntoIterator<Item = MaterialHandle>) -> Self {
        self.materials = materials.into_iter().collect();
        self
    }

    pub fn with_outline(mut self, outline: Outline) -> Self {
        self.outline = Some(outline);
        self
    }
}

/// Everything a level load needs besides the prefabs and the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub scene_name: String,
    /// Selects the official or custom item id table.
    pub official: bool,
    pub initial_speed: f32,
    pub rows: Vec<LevelRow>,
}
