use std::collections::BTreeMap;

use dashstream_common::{GridPos, InstanceHandle, MaterialHandle, MeshHandle, PrefabHandle};
use dashstream_models::{Face, ModelLibrary};
use dashstream_path::PathGeometry;
use dashstream_render::{MeshData, MeshVertex, Outline, RenderBackend, RenderWindow};
use dashstream_timeline::{Easing, EasingMode, SpeedMap, apply_easing};
use glam::Vec3;

use crate::config::ChunkSettings;
use crate::item::ItemInfo;

/// A placed item's visual and the values the visibility pass reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemInstance {
    pub position: GridPos,
    pub handle: InstanceHandle,
    /// Exempt from deactivation once passed (finish triggers).
    pub keep_rendering: bool,
    pub out_animation_end: f32,
    pub in_animation_end: f32,
}

/// Merged mesh of every item of one id in a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMesh {
    pub handle: MeshHandle,
    pub data: MeshData,
}

/// Materials and outlines shared by the merged meshes of all chunks.
#[derive(Debug, Clone, Copy)]
pub struct MeshStyle<'a> {
    pub materials: &'a BTreeMap<String, MaterialHandle>,
    pub outlines: &'a BTreeMap<String, Outline>,
}

/// A fixed-width slice of the level.
///
/// # Invariants
/// - Both cursors only move forward between calls to [`Chunk::reset_render_index`].
/// - After [`Chunk::finalize`] the instance list is ordered by distance.
#[derive(Debug)]
pub struct Chunk {
    index: i32,
    container: InstanceHandle,
    settings: ChunkSettings,
    items: BTreeMap<GridPos, ItemInfo>,
    instances: Vec<ItemInstance>,
    meshes: BTreeMap<String, ChunkMesh>,
    active: bool,
    min_render: f32,
    max_render: f32,
    out_cursor: usize,
    in_cursor: usize,
}

impl Chunk {
    pub fn new(index: i32, settings: ChunkSettings, backend: &mut dyn RenderBackend) -> Self {
        let container = backend.create_container(&format!("Chunk {index}"));
        tracing::debug!(index, ?container, "chunk created");
        Self {
            index,
            container,
            settings,
            items: BTreeMap::new(),
            instances: Vec::new(),
            meshes: BTreeMap::new(),
            active: true,
            min_render: f32::INFINITY,
            max_render: f32::NEG_INFINITY,
            out_cursor: 0,
            in_cursor: 0,
        }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn container(&self) -> InstanceHandle {
        self.container
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn items(&self) -> &BTreeMap<GridPos, ItemInfo> {
        &self.items
    }

    pub fn item(&self, position: GridPos) -> Option<&ItemInfo> {
        self.items.get(&position)
    }

    pub fn instances(&self) -> &[ItemInstance] {
        &self.instances
    }

    pub fn meshes(&self) -> &BTreeMap<String, ChunkMesh> {
        &self.meshes
    }

    /// Faces emitted across all merged meshes.
    pub fn face_count(&self) -> usize {
        self.meshes.values().map(|m| m.data.face_count).sum()
    }

    /// `(out, in)` cursor positions.
    pub fn cursors(&self) -> (usize, usize) {
        (self.out_cursor, self.in_cursor)
    }

    /// Distance span in which this chunk can have visible items.
    pub fn render_bounds(&self) -> (f32, f32) {
        (self.min_render, self.max_render)
    }

    /// Place an item, replacing whatever occupied `position`. Items with a
    /// procedural model have their own mesh parts stripped; the merged mesh
    /// draws them instead.
    #[allow(clippy::too_many_arguments)]
    pub fn set_item(
        &mut self,
        id: &str,
        position: GridPos,
        rotation: i32,
        prefab: PrefabHandle,
        keep_rendering: bool,
        path: &dyn PathGeometry,
        library: &ModelLibrary,
        backend: &mut dyn RenderBackend,
    ) -> InstanceHandle {
        let info = ItemInfo::new(id, position, rotation, path, library);
        let handle = backend.instantiate(
            prefab,
            info.world_position(),
            info.world_rotation(),
            self.container,
        );

        if self.items.insert(position, info).is_some() {
            if let Some(i) = self.instances.iter().position(|inst| inst.position == position) {
                let replaced = self.instances.remove(i);
                backend.destroy(replaced.handle);
            }
        }
        self.instances.push(ItemInstance {
            position,
            handle,
            keep_rendering,
            out_animation_end: -1.0,
            in_animation_end: -1.0,
        });

        if library.contains(id) {
            backend.strip_mesh_parts(handle);
        }
        handle
    }

    /// Cache every item's transition timing and the chunk's render bounds.
    /// Call once all items are placed and the speed map is final.
    pub fn finalize(&mut self, speeds: &SpeedMap) {
        let ChunkSettings {
            out_animation_time,
            in_animation_time,
            ..
        } = self.settings;
        self.min_render = f32::INFINITY;
        self.max_render = f32::NEG_INFINITY;
        for item in self.items.values_mut() {
            item.cache_animation_values(speeds, out_animation_time, in_animation_time);
            self.min_render = self.min_render.min(item.position().x as f32);
            self.max_render = self.max_render.max(item.in_animation_end());
        }

        for instance in &mut self.instances {
            if let Some(item) = self.items.get(&instance.position) {
                instance.out_animation_end = item.out_animation_end();
                instance.in_animation_end = item.in_animation_end();
            }
        }
        self.instances.sort_by_key(|inst| inst.position.x);
        tracing::debug!(
            index = self.index,
            items = self.items.len(),
            min = self.min_render,
            max = self.max_render,
            "chunk finalized"
        );
    }

    /// Rebuild the merged mesh of every catalog id present in the chunk.
    pub fn update_meshes(
        &mut self,
        path: &dyn PathGeometry,
        library: &ModelLibrary,
        style: MeshStyle<'_>,
        backend: &mut dyn RenderBackend,
    ) {
        let _span = tracing::info_span!("chunk_update_meshes", index = self.index).entered();
        let mut ids: Vec<&str> = self
            .items
            .values()
            .map(ItemInfo::id)
            .filter(|id| library.contains(id))
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let mut built = Vec::with_capacity(ids.len());
        for id in ids {
            let data = self.build_mesh(id, path, library);
            let label = format!("{id} mesh");
            let handle = backend.upload_mesh(
                self.container,
                &label,
                &data,
                style.materials.get(id).copied(),
                style.outlines.get(id),
            );
            tracing::debug!(index = self.index, id, faces = data.face_count, "merged mesh uploaded");
            built.push((id.to_string(), ChunkMesh { handle, data }));
        }
        self.meshes = built.into_iter().collect();
    }

    fn build_mesh(&self, id: &str, path: &dyn PathGeometry, library: &ModelLibrary) -> MeshData {
        let mut mesh = MeshData::new();
        for (position, item) in self.items.iter().filter(|(_, item)| item.id() == id) {
            let Some(model) = item.model(library) else {
                continue;
            };
            let wp = item.world_position();
            let color = [wp.x, wp.y, wp.z, position.x as f32];
            let anim = [item.out_animation_end(), item.in_animation_end()];
            // Lift each item slightly so coplanar faces of neighbors don't z-fight.
            let lift = Vec3::new(0.0, (position.x as f32 % 100.0) / 10000.0, 0.0);

            for face in &model.faces {
                if self.can_cull(item, face, library) {
                    continue;
                }
                let base = mesh.base_index();
                for (k, &vertex) in face.vertices.iter().enumerate() {
                    let world = item.vertex_to_world_space(path, vertex) + lift;
                    mesh.vertices.push(MeshVertex {
                        position: world.to_array(),
                        uv: face.uvs.get(k).map_or([0.0; 2], |uv| uv.to_array()),
                        color,
                        anim,
                    });
                }
                mesh.indices.extend(face.triangles.iter().map(|&t| t + base));
                mesh.face_count += 1;
            }
        }
        mesh
    }

    /// Whether `face` of `item` is hidden by the neighbor it points at.
    /// Transparent items only cull against items of the same id.
    pub fn can_cull(&self, item: &ItemInfo, face: &Face, library: &ModelLibrary) -> bool {
        let target = item.position() + item.direction_to_grid(face.direction);
        let Some(neighbor) = self.items.get(&target) else {
            return false;
        };
        if !library.contains(neighbor.id()) {
            return false;
        }
        let transparent = library.is_transparent(item.id()) || library.is_transparent(neighbor.id());
        if transparent && item.id() != neighbor.id() {
            return false;
        }
        neighbor.can_cull_face_against_model(item, face, library, self.settings.cull_epsilon)
    }

    /// Advance the visibility cursors for the window. Returns how many
    /// instances were written.
    pub fn fixed_update(&mut self, window: RenderWindow, backend: &mut dyn RenderBackend) -> usize {
        if window.max < self.min_render || window.min > self.max_render {
            self.set_inactive(backend);
            return 0;
        }
        self.set_active(backend);
        self.process_render_min(window.min, backend) + self.process_render_max(window.max, backend)
    }

    fn process_render_min(&mut self, render_min: f32, backend: &mut dyn RenderBackend) -> usize {
        let mut touched = 0;
        for i in self.out_cursor..self.instances.len() {
            let inst = self.instances[i];
            if !inst.keep_rendering && inst.out_animation_end < render_min {
                self.out_cursor = i + 1;
                backend.set_active(inst.handle, false);
                touched += 1;
                continue;
            }
            let x = inst.position.x as f32;
            if render_min < x {
                break;
            }
            backend.set_scale(inst.handle, scale_out(render_min, inst.out_animation_end, x));
            touched += 1;
        }
        touched
    }

    fn process_render_max(&mut self, render_max: f32, backend: &mut dyn RenderBackend) -> usize {
        let mut touched = 0;
        for i in self.in_cursor..self.instances.len() {
            let inst = self.instances[i];
            let x = inst.position.x as f32;
            if render_max <= x {
                break;
            }
            backend.set_active(inst.handle, true);
            touched += 1;
            if inst.in_animation_end < render_max {
                self.in_cursor = i + 1;
                backend.set_scale(inst.handle, Vec3::ONE);
                continue;
            }
            backend.set_scale(inst.handle, scale_in(render_max, inst.in_animation_end, x));
        }
        touched
    }

    /// Hide every instance at full scale and rewind both cursors.
    pub fn reset_render_index(&mut self, backend: &mut dyn RenderBackend) {
        for inst in &self.instances {
            backend.set_active(inst.handle, false);
            backend.set_scale(inst.handle, Vec3::ONE);
        }
        self.out_cursor = 0;
        self.in_cursor = 0;
    }

    fn set_active(&mut self, backend: &mut dyn RenderBackend) {
        if self.active {
            return;
        }
        self.active = true;
        backend.set_active(self.container, true);
        tracing::debug!(index = self.index, "chunk activated");
    }

    fn set_inactive(&mut self, backend: &mut dyn RenderBackend) {
        if !self.active {
            return;
        }
        self.active = false;
        backend.set_active(self.container, false);
        tracing::debug!(index = self.index, "chunk deactivated");
    }

    /// Destroy the chunk's visuals and forget its items.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        backend.destroy(self.container);
        self.items.clear();
        self.instances.clear();
        self.meshes.clear();
        self.out_cursor = 0;
        self.in_cursor = 0;
    }
}

fn transition_progress(edge: f32, animation_end: f32, x: f32) -> f32 {
    let length = animation_end - x;
    let t = if length > 0.0 { (edge - x) / length } else { 1.0 };
    apply_easing(t.clamp(0.0, 1.0), Easing::Exponential, EasingMode::Out, 0.0)
}

/// Scale of an item passed by `render_min`: full at the item, zero at `animation_end`.
pub fn scale_out(render_min: f32, animation_end: f32, x: f32) -> Vec3 {
    Vec3::ONE.lerp(Vec3::ZERO, transition_progress(render_min, animation_end, x))
}

/// Scale of an item reached by `render_max`: zero at the item, full at `animation_end`.
pub fn scale_in(render_max: f32, animation_end: f32, x: f32) -> Vec3 {
    Vec3::ZERO.lerp(Vec3::ONE, transition_progress(render_max, animation_end, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashstream_models::{Direction, item};
    use dashstream_path::{EndOfPath, VertexPath};
    use dashstream_render::RecordingBackend;

    struct Fixture {
        path: VertexPath,
        backend: RecordingBackend,
        chunk: Chunk,
        speeds: SpeedMap,
    }

    impl Fixture {
        fn new() -> Self {
            let mut backend = RecordingBackend::new();
            let chunk = Chunk::new(0, ChunkSettings::default(), &mut backend);
            Self {
                path: VertexPath::straight(1000.0, EndOfPath::Stop).unwrap(),
                backend,
                chunk,
                speeds: SpeedMap::constant(10.0).unwrap(),
            }
        }

        fn place(&mut self, id: &str, x: i32, y: i32, z: i32) -> InstanceHandle {
            self.chunk.set_item(
                id,
                GridPos::new(x, y, z),
                0,
                PrefabHandle(1),
                false,
                &self.path,
                ModelLibrary::global(),
                &mut self.backend,
            )
        }

        fn build(&mut self) {
            let materials = BTreeMap::new();
            let outlines = BTreeMap::new();
            self.chunk.finalize(&self.speeds);
            self.chunk.update_meshes(
                &self.path,
                ModelLibrary::global(),
                MeshStyle {
                    materials: &materials,
                    outlines: &outlines,
                },
                &mut self.backend,
            );
        }

        fn faces(&self, id: &str) -> usize {
            self.chunk.meshes()[id].data.face_count
        }
    }

    #[test]
    fn adjacent_full_blocks_cull_shared_faces() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 0, 0, 0);
        f.place(item::NORMAL_BLOCK, 1, 0, 0);
        f.build();

        assert_eq!(f.chunk.meshes().len(), 1);
        assert_eq!(f.faces(item::NORMAL_BLOCK), 10);
        assert_eq!(f.backend.mesh_count(), 1);
    }

    #[test]
    fn separated_blocks_keep_all_faces() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 0, 0, 0);
        f.place(item::NORMAL_BLOCK, 2, 0, 0);
        f.build();
        assert_eq!(f.faces(item::NORMAL_BLOCK), 12);
    }

    #[test]
    fn transparent_blocks_only_cull_their_own_kind() {
        let mut f = Fixture::new();
        f.place(item::GRID_BLOCK, 0, 0, 0);
        f.place(item::NORMAL_BLOCK, 1, 0, 0);
        f.place(item::GRID_BLOCK, 0, 0, 5);
        f.place(item::GRID_BLOCK, 1, 0, 5);
        f.build();

        // Mixed pair keeps all faces, grid pair culls its shared faces.
        assert_eq!(f.faces(item::NORMAL_BLOCK), 6);
        assert_eq!(f.faces(item::GRID_BLOCK), 6 + 5 + 5);
    }

    #[test]
    fn half_block_culls_against_full_block_but_not_back() {
        let mut f = Fixture::new();
        f.place(item::HALF_BLOCK, 0, 0, 0);
        f.place(item::NORMAL_BLOCK, 1, 0, 0);
        f.build();

        // The half block's side lies inside the block's face; the block's
        // face is larger than the half side, so it stays.
        assert_eq!(f.faces(item::HALF_BLOCK), 5);
        assert_eq!(f.faces(item::NORMAL_BLOCK), 6);
    }

    /// Merged face count per id for `center` at (5, 1, 0) with a normal block
    /// one step along `direction`.
    fn faces_beside_full_block(center: &str, direction: Direction) -> BTreeMap<String, usize> {
        let mut f = Fixture::new();
        let at = GridPos::new(5, 1, 0);
        f.place(center, at.x, at.y, at.z);
        let n = at.offset(direction.as_ivec3());
        f.place(item::NORMAL_BLOCK, n.x, n.y, n.z);
        f.build();
        f.chunk
            .meshes()
            .iter()
            .map(|(id, mesh)| (id.clone(), mesh.data.face_count))
            .collect()
    }

    #[test]
    fn full_blocks_cull_each_other_in_every_direction() {
        for direction in Direction::ALL {
            let faces = faces_beside_full_block(item::NORMAL_BLOCK, direction);
            assert_eq!(faces[item::NORMAL_BLOCK], 10, "{direction:?}");
        }
    }

    #[test]
    fn grid_blocks_never_cull_against_a_normal_block() {
        for id in [item::GRID_BLOCK, item::COSMIC_GRID_BLOCK] {
            for direction in Direction::ALL {
                let faces = faces_beside_full_block(id, direction);
                assert_eq!(faces[id], 6, "{id} {direction:?}");
                assert_eq!(faces[item::NORMAL_BLOCK], 6, "{id} {direction:?}");
            }
        }
    }

    #[test]
    fn half_block_against_full_block_in_every_direction() {
        for direction in Direction::ALL {
            let faces = faces_beside_full_block(item::HALF_BLOCK, direction);
            let expected = match direction {
                // Top face matches the block's bottom exactly.
                Direction::PosY => (5, 5),
                // Bottom face sits at the half block's center, clear of the block below.
                Direction::NegY => (6, 6),
                _ => (5, 6),
            };
            assert_eq!(
                (faces[item::HALF_BLOCK], faces[item::NORMAL_BLOCK]),
                expected,
                "{direction:?}"
            );
        }
    }

    #[test]
    fn slope_neighbors_leave_blocks_whole() {
        for direction in Direction::ALL {
            let mut f = Fixture::new();
            f.place(item::NORMAL_BLOCK, 5, 1, 0);
            let n = GridPos::new(5, 1, 0).offset(direction.as_ivec3());
            let slope = f.place(item::SLOPE, n.x, n.y, n.z);
            f.build();

            assert_eq!(f.faces(item::NORMAL_BLOCK), 6, "{direction:?}");
            assert!(!f.chunk.meshes().contains_key(item::SLOPE));
            assert!(!f.backend.instance(slope).unwrap().stripped);
        }
    }

    #[test]
    fn can_cull_without_neighbor_is_false() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 0, 0, 0);
        let library = ModelLibrary::global();
        let info = f.chunk.item(GridPos::new(0, 0, 0)).unwrap();
        for face in &info.model(library).unwrap().faces {
            assert!(!f.chunk.can_cull(info, face, library));
        }
    }

    #[test]
    fn neighbor_without_model_never_culls() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 0, 0, 0);
        f.place("3dash:orbs/yellow", 1, 0, 0);
        f.build();
        assert_eq!(f.faces(item::NORMAL_BLOCK), 6);
        assert!(!f.chunk.meshes().contains_key("3dash:orbs/yellow"));
    }

    #[test]
    fn mesh_channels_carry_position_and_timing() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 30, 0, 0);
        f.build();

        let data = &f.chunk.meshes()[item::NORMAL_BLOCK].data;
        let info = f.chunk.item(GridPos::new(30, 0, 0)).unwrap();
        let v = data.vertices[0];
        assert_eq!(v.color[3], 30.0);
        assert_eq!(v.anim, [info.out_animation_end(), info.in_animation_end()]);
        assert_eq!(data.vertices.len(), info.model(ModelLibrary::global()).unwrap().vertex_count());
        assert!(data.indices.iter().all(|&i| (i as usize) < data.vertices.len()));
    }

    #[test]
    fn models_strip_prefab_meshes() {
        let mut f = Fixture::new();
        let block = f.place(item::NORMAL_BLOCK, 0, 0, 0);
        let orb = f.place("3dash:orbs/yellow", 3, 0, 0);
        assert!(f.backend.instance(block).unwrap().stripped);
        assert!(!f.backend.instance(orb).unwrap().stripped);
    }

    #[test]
    fn replacing_an_item_destroys_the_old_instance() {
        let mut f = Fixture::new();
        let first = f.place(item::NORMAL_BLOCK, 4, 0, 0);
        let second = f.place(item::HALF_BLOCK, 4, 0, 0);

        assert_eq!(f.chunk.items().len(), 1);
        assert_eq!(f.chunk.instances().len(), 1);
        assert_eq!(f.chunk.instances()[0].handle, second);
        assert!(f.backend.instance(first).is_none());
        assert_eq!(f.chunk.item(GridPos::new(4, 0, 0)).unwrap().id(), item::HALF_BLOCK);
    }

    #[test]
    fn finalize_orders_instances_and_bounds() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 50, 0, 0);
        f.place(item::NORMAL_BLOCK, 10, 0, 0);
        f.place(item::NORMAL_BLOCK, 30, 2, 0);
        f.build();

        let xs: Vec<i32> = f.chunk.instances().iter().map(|i| i.position.x).collect();
        assert_eq!(xs, vec![10, 30, 50]);
        let (min, max) = f.chunk.render_bounds();
        assert_eq!(min, 10.0);
        let last_in = f.chunk.item(GridPos::new(50, 0, 0)).unwrap().in_animation_end();
        assert_eq!(max, last_in);
    }

    #[test]
    fn window_below_chunk_deactivates_without_moving_cursors() {
        let mut f = Fixture::new();
        f.place(item::NORMAL_BLOCK, 10, 0, 0);
        f.place(item::NORMAL_BLOCK, 20, 0, 0);
        f.build();

        let touched = f.chunk.fixed_update(RenderWindow::new(-100.0, 5.0), &mut f.backend);
        assert_eq!(touched, 0);
        assert!(!f.chunk.is_active());
        assert_eq!(f.chunk.cursors(), (0, 0));
        assert!(!f.backend.instance(f.chunk.container()).unwrap().active);
    }

    #[test]
    fn cursors_advance_monotonically() {
        let mut f = Fixture::new();
        for x in (0..120).step_by(4) {
            f.place(item::NORMAL_BLOCK, x, 0, 0);
        }
        f.build();
        f.chunk.reset_render_index(&mut f.backend);

        let mut last = (0, 0);
        let mut travelled = 0.0;
        while travelled < 200.0 {
            let window = RenderWindow::around(travelled, 50.0, 40.0);
            f.chunk.fixed_update(window, &mut f.backend);
            let now = f.chunk.cursors();
            assert!(now.0 >= last.0 && now.1 >= last.1);
            last = now;
            travelled += 3.7;
        }
        // Once the window passes the last in animation end the chunk shuts
        // off as a whole, so the last few items are never scanned out.
        assert_eq!(last.1, 30);
        assert!(last.0 >= 28);
        assert!(!f.chunk.is_active());
    }

    #[test]
    fn entering_items_scale_in_then_settle() {
        let mut f = Fixture::new();
        let handle = f.place(item::NORMAL_BLOCK, 10, 0, 0);
        f.build();
        f.chunk.reset_render_index(&mut f.backend);
        // At speed 10 the in animation spans 10 / 7.7 units past the item.
        f.chunk.fixed_update(RenderWindow::new(-50.0, 10.5), &mut f.backend);
        let state = f.backend.instance(handle).unwrap();
        assert!(state.active);
        assert!(state.transform.scale.x > 0.0 && state.transform.scale.x < 1.0);
        assert_eq!(f.chunk.cursors().1, 0);

        f.chunk.fixed_update(RenderWindow::new(-50.0, 12.0), &mut f.backend);
        assert_eq!(f.backend.instance(handle).unwrap().transform.scale, Vec3::ONE);
        assert_eq!(f.chunk.cursors().1, 1);
    }

    #[test]
    fn passed_items_scale_out_then_deactivate() {
        let mut f = Fixture::new();
        let handle = f.place(item::NORMAL_BLOCK, 10, 0, 0);
        f.place(item::NORMAL_BLOCK, 60, 0, 0);
        f.build();
        f.chunk.fixed_update(RenderWindow::new(0.0, 100.0), &mut f.backend);

        // Out animation ends 10 / 1.8 units past the item.
        f.chunk.fixed_update(RenderWindow::new(12.0, 100.0), &mut f.backend);
        let state = f.backend.instance(handle).unwrap();
        assert!(state.active);
        assert!(state.transform.scale.x > 0.0 && state.transform.scale.x < 1.0);

        f.chunk.fixed_update(RenderWindow::new(16.0, 100.0), &mut f.backend);
        assert!(!f.backend.instance(handle).unwrap().active);
        assert_eq!(f.chunk.cursors().0, 1);
    }

    #[test]
    fn finish_items_are_never_deactivated_by_the_out_cursor() {
        let mut f = Fixture::new();
        let finish = f.chunk.set_item(
            item::FINISH_TRIGGER,
            GridPos::new(10, 0, 0),
            0,
            PrefabHandle(2),
            true,
            &f.path,
            ModelLibrary::global(),
            &mut f.backend,
        );
        f.place(item::NORMAL_BLOCK, 100, 0, 0);
        f.build();
        f.chunk.fixed_update(RenderWindow::new(0.0, 100.0), &mut f.backend);
        f.chunk.fixed_update(RenderWindow::new(50.0, 140.0), &mut f.backend);
        assert!(f.chunk.is_active());
        assert!(f.backend.instance(finish).unwrap().active);
        assert_eq!(f.chunk.cursors().0, 0);
    }

    #[test]
    fn reset_render_index_hides_everything() {
        let mut f = Fixture::new();
        let a = f.place(item::NORMAL_BLOCK, 1, 0, 0);
        f.build();
        f.chunk.fixed_update(RenderWindow::new(0.0, 0.5), &mut f.backend);
        f.chunk.fixed_update(RenderWindow::new(3.0, 50.0), &mut f.backend);

        f.chunk.reset_render_index(&mut f.backend);
        let state = f.backend.instance(a).unwrap();
        assert!(!state.active);
        assert_eq!(state.transform.scale, Vec3::ONE);
        assert_eq!(f.chunk.cursors(), (0, 0));
    }

    #[test]
    fn scale_curves_hit_their_endpoints() {
        assert_eq!(scale_out(10.0, 20.0, 10.0), Vec3::ONE);
        assert_eq!(scale_out(20.0, 20.0, 10.0), Vec3::ZERO);
        assert_eq!(scale_in(10.0, 20.0, 10.0), Vec3::ZERO);
        assert_eq!(scale_in(25.0, 20.0, 10.0), Vec3::ONE);
        // Exponential ease-out front-loads the change.
        assert!(scale_in(12.0, 20.0, 10.0).x > 0.5);
    }

    #[test]
    fn rotated_neighbor_direction_lookup() {
        let mut f = Fixture::new();
        f.chunk.set_item(
            item::NORMAL_BLOCK,
            GridPos::new(0, 0, 0),
            90,
            PrefabHandle(1),
            false,
            &f.path,
            ModelLibrary::global(),
            &mut f.backend,
        );
        f.place(item::NORMAL_BLOCK, 0, 1, 0);
        let library = ModelLibrary::global();
        let info = f.chunk.item(GridPos::new(0, 0, 0)).unwrap();
        let face = info
            .model(library)
            .unwrap()
            .faces
            .iter()
            .find(|face| face.direction == Direction::PosX)
            .unwrap();
        assert_eq!(info.position() + info.direction_to_grid(face.direction), GridPos::new(0, 1, 0));
    }
}
