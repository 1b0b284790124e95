use dashstream_common::{Color, InstanceHandle, MaterialHandle, MeshHandle, PrefabHandle};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::mesh::MeshData;

/// The distance interval currently eligible for visibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderWindow {
    pub min: f32,
    pub max: f32,
}

impl RenderWindow {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Window spanning `behind` units before and `ahead` units after `travelled`.
    pub fn around(travelled: f32, behind: f32, ahead: f32) -> Self {
        Self {
            min: travelled - behind,
            max: travelled + ahead,
        }
    }

    /// Whether `[min, max]` overlaps `[lo, hi]`.
    pub fn overlaps(&self, lo: f32, hi: f32) -> bool {
        !(self.max < lo || self.min > hi)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlineMode {
    #[default]
    OutlineAll,
    OutlineVisible,
    OutlineHidden,
}

/// Outline decoration copied from a prefab onto merged meshes of the same id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub color: Color,
    pub mode: OutlineMode,
    pub width: f32,
}

/// Renderer-side operations the streaming core needs.
///
/// Every method is called from the single simulation thread.
pub trait RenderBackend {
    /// Create an empty parent object for a chunk's visuals.
    fn create_container(&mut self, label: &str) -> InstanceHandle;

    /// Instantiate a prefab's visual under `parent`.
    fn instantiate(
        &mut self,
        prefab: PrefabHandle,
        position: Vec3,
        rotation: Quat,
        parent: InstanceHandle,
    ) -> InstanceHandle;

    /// Remove mesh, renderer and outline parts from an instance; a merged
    /// chunk mesh draws it instead.
    fn strip_mesh_parts(&mut self, instance: InstanceHandle);

    fn set_active(&mut self, instance: InstanceHandle, active: bool);

    fn set_scale(&mut self, instance: InstanceHandle, scale: Vec3);

    /// Enable GPU instancing on a prefab material.
    fn enable_instancing(&mut self, material: MaterialHandle);

    /// Copy `source` with the distance-fading shader, keeping its render queue.
    fn create_fading_material(&mut self, source: MaterialHandle) -> MaterialHandle;

    /// Upload a merged mesh under `parent`, replacing the previous mesh with
    /// the same label under that parent.
    fn upload_mesh(
        &mut self,
        parent: InstanceHandle,
        label: &str,
        mesh: &MeshData,
        material: Option<MaterialHandle>,
        outline: Option<&Outline>,
    ) -> MeshHandle;

    /// Set the fading shader's window uniforms on a material.
    fn set_render_window(&mut self, material: MaterialHandle, window: RenderWindow);

    /// Destroy an instance or container and everything parented under it.
    fn destroy(&mut self, instance: InstanceHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_around_travelled() {
        let w = RenderWindow::around(100.0, 50.0, 80.0);
        assert_eq!(w, RenderWindow::new(50.0, 180.0));
    }

    #[test]
    fn window_overlap() {
        let w = RenderWindow::new(10.0, 20.0);
        assert!(w.overlaps(15.0, 30.0));
        assert!(w.overlaps(20.0, 30.0));
        assert!(!w.overlaps(21.0, 30.0));
        assert!(!w.overlaps(0.0, 9.0));
    }
}
