use std::collections::BTreeMap;
use std::fmt::Write as _;

use dashstream_common::{InstanceHandle, MaterialHandle, MeshHandle, PrefabHandle, Transform};
use glam::{Quat, Vec3};

use crate::backend::{Outline, RenderBackend, RenderWindow};
use crate::mesh::MeshData;

/// Last known state of one recorded instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceState {
    pub label: String,
    /// `None` for containers.
    pub prefab: Option<PrefabHandle>,
    pub parent: Option<InstanceHandle>,
    /// Local transform relative to the parent.
    pub transform: Transform,
    pub active: bool,
    pub stripped: bool,
}

/// A merged mesh as uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedMesh {
    pub handle: MeshHandle,
    pub parent: InstanceHandle,
    pub label: String,
    pub data: MeshData,
    pub material: Option<MaterialHandle>,
    pub outline: Option<Outline>,
}

/// In-memory backend that records every call.
///
/// Used by tests and the CLI in place of an engine renderer. Destroying an
/// instance removes its whole subtree and the meshes parented to it.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    next_id: u64,
    instances: BTreeMap<InstanceHandle, InstanceState>,
    meshes: BTreeMap<(InstanceHandle, String), RecordedMesh>,
    instanced_materials: Vec<MaterialHandle>,
    fading_materials: BTreeMap<MaterialHandle, MaterialHandle>,
    windows: BTreeMap<MaterialHandle, RenderWindow>,
    uploads: usize,
    scale_calls: usize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn instance(&self, handle: InstanceHandle) -> Option<&InstanceState> {
        self.instances.get(&handle)
    }

    pub fn instances(&self) -> impl Iterator<Item = (&InstanceHandle, &InstanceState)> {
        self.instances.iter()
    }

    /// Live instances created from prefabs.
    pub fn item_count(&self) -> usize {
        self.instances.values().filter(|s| s.prefab.is_some()).count()
    }

    pub fn active_count(&self) -> usize {
        self.instances
            .values()
            .filter(|s| s.prefab.is_some() && s.active)
            .count()
    }

    pub fn container_count(&self) -> usize {
        self.instances.values().filter(|s| s.prefab.is_none()).count()
    }

    pub fn meshes(&self) -> impl Iterator<Item = &RecordedMesh> {
        self.meshes.values()
    }

    pub fn mesh(&self, parent: InstanceHandle, label: &str) -> Option<&RecordedMesh> {
        self.meshes.get(&(parent, label.to_string()))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Total mesh uploads, including replacements.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    pub fn scale_calls(&self) -> usize {
        self.scale_calls
    }

    pub fn is_instanced(&self, material: MaterialHandle) -> bool {
        self.instanced_materials.contains(&material)
    }

    /// Source material of a fading copy.
    pub fn fading_source(&self, fading: MaterialHandle) -> Option<MaterialHandle> {
        self.fading_materials.get(&fading).copied()
    }

    pub fn fading_material_count(&self) -> usize {
        self.fading_materials.len()
    }

    pub fn window(&self, material: MaterialHandle) -> Option<RenderWindow> {
        self.windows.get(&material).copied()
    }

    /// Human-readable dump of the recorded scene.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Recorded Scene (containers={}, items={}, active={}) ===",
            self.container_count(),
            self.item_count(),
            self.active_count()
        );
        for mesh in self.meshes.values() {
            let _ = writeln!(
                out,
                "  mesh {} under #{}: {} faces, {} vertices, {} triangles",
                mesh.label,
                mesh.parent.0,
                mesh.data.face_count,
                mesh.data.vertices.len(),
                mesh.data.triangle_count()
            );
        }
        for (material, window) in &self.windows {
            let _ = writeln!(
                out,
                "  material #{} window=[{:.1}, {:.1}]",
                material.0, window.min, window.max
            );
        }
        out
    }
}

impl RenderBackend for RecordingBackend {
    fn create_container(&mut self, label: &str) -> InstanceHandle {
        let handle = InstanceHandle(self.allocate());
        self.instances.insert(
            handle,
            InstanceState {
                label: label.to_string(),
                prefab: None,
                parent: None,
                transform: Transform::default(),
                active: true,
                stripped: false,
            },
        );
        handle
    }

    fn instantiate(
        &mut self,
        prefab: PrefabHandle,
        position: Vec3,
        rotation: Quat,
        parent: InstanceHandle,
    ) -> InstanceHandle {
        let handle = InstanceHandle(self.allocate());
        self.instances.insert(
            handle,
            InstanceState {
                label: format!("prefab#{}", prefab.0),
                prefab: Some(prefab),
                parent: Some(parent),
                transform: Transform {
                    position,
                    rotation,
                    scale: Vec3::ONE,
                },
                active: true,
                stripped: false,
            },
        );
        handle
    }

    fn strip_mesh_parts(&mut self, instance: InstanceHandle) {
        if let Some(state) = self.instances.get_mut(&instance) {
            state.stripped = true;
        }
    }

    fn set_active(&mut self, instance: InstanceHandle, active: bool) {
        if let Some(state) = self.instances.get_mut(&instance) {
            state.active = active;
        }
    }

    fn set_scale(&mut self, instance: InstanceHandle, scale: Vec3) {
        self.scale_calls += 1;
        if let Some(state) = self.instances.get_mut(&instance) {
            state.transform.scale = scale;
        }
    }

    fn enable_instancing(&mut self, material: MaterialHandle) {
        if !self.instanced_materials.contains(&material) {
            self.instanced_materials.push(material);
        }
    }

    fn create_fading_material(&mut self, source: MaterialHandle) -> MaterialHandle {
        let handle = MaterialHandle(self.allocate());
        self.fading_materials.insert(handle, source);
        handle
    }

    fn upload_mesh(
        &mut self,
        parent: InstanceHandle,
        label: &str,
        mesh: &MeshData,
        material: Option<MaterialHandle>,
        outline: Option<&Outline>,
    ) -> MeshHandle {
        self.uploads += 1;
        let key = (parent, label.to_string());
        // Re-uploading under the same label keeps the mesh handle.
        let handle = match self.meshes.get(&key) {
            Some(existing) => existing.handle,
            None => MeshHandle(self.allocate()),
        };
        self.meshes.insert(
            key,
            RecordedMesh {
                handle,
                parent,
                label: label.to_string(),
                data: mesh.clone(),
                material,
                outline: outline.copied(),
            },
        );
        handle
    }

    fn set_render_window(&mut self, material: MaterialHandle, window: RenderWindow) {
        self.windows.insert(material, window);
    }

    fn destroy(&mut self, instance: InstanceHandle) {
        let mut doomed = vec![instance];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i];
            doomed.extend(
                self.instances
                    .iter()
                    .filter(|(_, s)| s.parent == Some(current))
                    .map(|(h, _)| *h),
            );
            i += 1;
        }
        for handle in &doomed {
            self.instances.remove(handle);
        }
        self.meshes.retain(|(parent, _), _| !doomed.contains(parent));
    }
}
