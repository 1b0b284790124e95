use dashstream_stream::World;
use serde::Serialize;

/// Level inspector for developer tooling.
///
/// Read-only queries against a loaded [`World`] for debugging and profiling.
pub struct LevelInspector;

impl LevelInspector {
    /// Produce a summary of the loaded level.
    pub fn summary(world: &World) -> LevelSummary {
        let chunks = world.chunks();
        LevelSummary {
            chunks: chunks.len(),
            active_chunks: chunks.values().filter(|c| c.is_active()).count(),
            items: world.items().len(),
            merged_meshes: chunks.values().map(|c| c.meshes().len()).sum(),
            faces: chunks.values().map(|c| c.face_count()).sum(),
            orbs: world.orbs().len(),
            pads: world.pads().len(),
            portals: world.portals().len(),
            speed_markers: world.speeds().map_or(0, |s| s.markers().len()),
            color_zones: world.color_changers().len(),
            deletion_distance: world.deletion_distance(),
        }
    }

    /// Details of one chunk, or `None` if no chunk has that index.
    pub fn chunk_info(world: &World, index: i32) -> Option<ChunkInfo> {
        world.chunk(index).map(|chunk| {
            let (min_render, max_render) = chunk.render_bounds();
            let (out_cursor, in_cursor) = chunk.cursors();
            ChunkInfo {
                index,
                items: chunk.items().len(),
                instances: chunk.instances().len(),
                meshes: chunk
                    .meshes()
                    .iter()
                    .map(|(id, mesh)| (id.clone(), mesh.data.face_count))
                    .collect(),
                min_render,
                max_render,
                out_cursor,
                in_cursor,
                active: chunk.is_active(),
            }
        })
    }

    /// Details of every chunk in index order.
    pub fn chunks(world: &World) -> Vec<ChunkInfo> {
        world
            .chunks()
            .keys()
            .filter_map(|&index| Self::chunk_info(world, index))
            .collect()
    }
}

/// Summary of a loaded level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub chunks: usize,
    pub active_chunks: usize,
    pub items: usize,
    pub merged_meshes: usize,
    pub faces: usize,
    pub orbs: usize,
    pub pads: usize,
    pub portals: usize,
    pub speed_markers: usize,
    pub color_zones: usize,
    pub deletion_distance: f32,
}

impl std::fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Level: chunks={} (active {}) items={} meshes={} faces={} orbs={} pads={} portals={} speed_markers={} color_zones={} deletion={:.0}",
            self.chunks,
            self.active_chunks,
            self.items,
            self.merged_meshes,
            self.faces,
            self.orbs,
            self.pads,
            self.portals,
            self.speed_markers,
            self.color_zones,
            self.deletion_distance,
        )
    }
}

/// Details of a single chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkInfo {
    pub index: i32,
    pub items: usize,
    pub instances: usize,
    /// Face count of each merged mesh, by item id.
    pub meshes: Vec<(String, usize)>,
    pub min_render: f32,
    pub max_render: f32,
    pub out_cursor: usize,
    pub in_cursor: usize,
    pub active: bool,
}

impl std::fmt::Display for ChunkInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Chunk {} items={} span=[{:.1}, {:.1}] cursors=({}, {}) active={}",
            self.index,
            self.items,
            self.min_render,
            self.max_render,
            self.out_cursor,
            self.in_cursor,
            self.active,
        )?;
        for (id, faces) in &self.meshes {
            write!(f, "\n  {id}: {faces} faces")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_level;
    use dashstream_render::RecordingBackend;
    use dashstream_stream::StreamConfig;

    fn loaded(sections: usize) -> World {
        let demo = demo_level(sections).unwrap();
        let mut world = World::new(StreamConfig::default());
        let mut backend = RecordingBackend::new();
        world
            .load_level(&demo.level, &demo.prefabs, &demo.path, &mut backend)
            .unwrap();
        world
    }

    #[test]
    fn summary_empty_world() {
        let world = World::new(StreamConfig::default());
        let summary = LevelInspector::summary(&world);
        assert_eq!(summary.chunks, 0);
        assert_eq!(summary.items, 0);
        assert_eq!(summary.speed_markers, 0);
    }

    #[test]
    fn summary_of_demo_level() {
        let world = loaded(4);
        let summary = LevelInspector::summary(&world);
        assert_eq!(summary.items, world.items().len());
        assert!(summary.chunks >= 2);
        assert!(summary.faces > 0);
        assert!(summary.portals >= summary.speed_markers);
        assert!(summary.color_zones > 0);
    }

    #[test]
    fn chunk_info_found() {
        let world = loaded(2);
        let info = LevelInspector::chunk_info(&world, 0).unwrap();
        assert_eq!(info.index, 0);
        assert!(info.items > 0);
        assert!(info.min_render <= info.max_render);
        assert_eq!((info.out_cursor, info.in_cursor), (0, 0));
    }

    #[test]
    fn demo_slopes_stay_out_of_merged_meshes() {
        let world = loaded(2);
        for info in LevelInspector::chunks(&world) {
            assert!(info.meshes.iter().all(|(id, _)| id != dashstream_models::item::SLOPE));
        }
    }

    #[test]
    fn chunk_info_not_found() {
        let world = loaded(1);
        assert!(LevelInspector::chunk_info(&world, 999).is_none());
    }

    #[test]
    fn chunks_in_index_order() {
        let world = loaded(4);
        let indices: Vec<i32> = LevelInspector::chunks(&world).iter().map(|c| c.index).collect();
        let mut sorted = indices.clone();
        sorted.sort();
        assert_eq!(indices, sorted);
        assert_eq!(indices.len(), world.chunks().len());
    }

    #[test]
    fn summary_display() {
        let world = World::new(StreamConfig::default());
        let s = format!("{}", LevelInspector::summary(&world));
        assert!(s.contains("chunks=0"));
        assert!(s.contains("deletion=50"));
    }
}
