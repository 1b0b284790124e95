use dashstream_common::GridPos;
use dashstream_models::{Direction, Face, Model, ModelLibrary};
use dashstream_path::{PathGeometry, delta_angle, euler_degrees};
use dashstream_timeline::SpeedMap;
use glam::{IVec3, Quat, Vec3};

/// Path curvature, in degrees per unit of distance, covered by one detail level.
const DEGREES_PER_DETAIL_LEVEL: f32 = 15.0;

/// One placed item and everything derived from its placement.
///
/// Path space has `x` along the path, `y` up and `z` sideways. Model vertices
/// live in local space, which swaps the `x` and `z` axes of path space.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    id: String,
    position: GridPos,
    rotation: i32,
    world_position: Vec3,
    world_rotation: Quat,
    /// Rotation of the item inside path space.
    path_rotation: Quat,
    /// Rotation applied to cull directions.
    direction_rotation: Quat,
    /// Detail level of the item's model; `None` if the id has no model or
    /// the path bends too sharply.
    detail: Option<usize>,
    path_length: f32,
    time: f32,
    out_animation_end: f32,
    in_animation_end: f32,
}

impl ItemInfo {
    pub fn new(
        id: impl Into<String>,
        position: GridPos,
        rotation: i32,
        path: &dyn PathGeometry,
        library: &ModelLibrary,
    ) -> Self {
        let id = id.into();
        let (world_position, frame) = path_space_to_world(path, position.as_vec3());

        let x = position.x as f32;
        let current = euler_degrees(path.rotation_at_distance(x));
        let previous = euler_degrees(path.rotation_at_distance(x - 1.0));
        let bend = delta_angle(previous.x, current.x)
            .abs()
            .max(delta_angle(previous.y, current.y).abs())
            .max(delta_angle(previous.z, current.z).abs());
        let level = (bend / DEGREES_PER_DETAIL_LEVEL) as usize;
        let detail = library
            .models(&id)
            .filter(|models| level < models.len())
            .map(|_| level);

        let angle = (rotation as f32).to_radians();
        let path_rotation = Quat::from_rotation_x(-angle);

        Self {
            id,
            position,
            rotation,
            world_position,
            world_rotation: frame * path_rotation,
            path_rotation,
            direction_rotation: Quat::from_rotation_z(angle),
            detail,
            path_length: path.length(),
            time: -1.0,
            out_animation_end: -1.0,
            in_animation_end: -1.0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn rotation(&self) -> i32 {
        self.rotation
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn world_rotation(&self) -> Quat {
        self.world_rotation
    }

    pub fn path_rotation(&self) -> Quat {
        self.path_rotation
    }

    pub fn detail(&self) -> Option<usize> {
        self.detail
    }

    /// The selected model variant.
    pub fn model<'a>(&self, library: &'a ModelLibrary) -> Option<&'a Model> {
        self.detail.and_then(|d| library.model(&self.id, d))
    }

    /// Level time at which the player reaches this item; `-1` until cached.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Distance at which the item has fully scaled out.
    pub fn out_animation_end(&self) -> f32 {
        self.out_animation_end
    }

    /// Distance at which the item has fully scaled in.
    pub fn in_animation_end(&self) -> f32 {
        self.in_animation_end
    }

    /// Compute the transition timings. Needs the level's final speed map.
    pub fn cache_animation_values(&mut self, speeds: &SpeedMap, out_time: f32, in_time: f32) {
        self.time = speeds.distance_to_time(self.position.x as f32);
        self.out_animation_end = speeds.time_to_distance(self.time + out_time);
        self.in_animation_end = speeds.time_to_distance(self.time + in_time);
    }

    /// Rotate a local-space offset into path space.
    pub fn offset_to_path_space(&self, offset: Vec3) -> Vec3 {
        let r = self.path_rotation * offset;
        Vec3::new(r.z, r.y, r.x)
    }

    pub fn vertex_to_path_space(&self, vertex: Vec3) -> Vec3 {
        self.position.as_vec3() + self.offset_to_path_space(vertex)
    }

    /// Place a local-space vertex in the world. Vertices that fall off either
    /// end of the path follow the item rigidly instead of the path.
    pub fn vertex_to_world_space(&self, path: &dyn PathGeometry, vertex: Vec3) -> Vec3 {
        let path_position = self.vertex_to_path_space(vertex);
        if path_position.x < 0.0 || path_position.x > self.path_length {
            self.world_position + self.world_rotation * vertex
        } else {
            path_space_to_world(path, path_position).0
        }
    }

    pub fn direction_to_world_space(&self, direction: Direction) -> Vec3 {
        self.direction_rotation * direction.as_vec3()
    }

    /// Grid offset a face direction points at, rounded to whole cells.
    pub fn direction_to_grid(&self, direction: Direction) -> IVec3 {
        self.direction_to_world_space(direction).round().as_ivec3()
    }

    /// Whether some face of this item's model fully covers `face` of `other`
    /// from the opposite side. Only the containment of `face` in this item's
    /// face is tested, so the relation is not symmetric.
    pub fn can_cull_face_against_model(
        &self,
        other: &ItemInfo,
        face: &Face,
        library: &ModelLibrary,
        epsilon: f32,
    ) -> bool {
        let Some(model) = self.model(library) else {
            return false;
        };
        model
            .faces
            .iter()
            .any(|own| self.can_cull_face_against_face(other, face, own, epsilon))
    }

    fn can_cull_face_against_face(
        &self,
        other: &ItemInfo,
        face: &Face,
        own: &Face,
        epsilon: f32,
    ) -> bool {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for &v in &own.vertices {
            let p = self.vertex_to_path_space(v);
            min = min.min(p);
            max = max.max(p);
        }
        let min = min - Vec3::splat(epsilon);
        let max = max + Vec3::splat(epsilon);

        let inside = face.vertices.iter().all(|&v| {
            let p = other.vertex_to_path_space(v);
            p.cmpge(min).all() && p.cmple(max).all()
        });
        inside && {
            let theirs = other.direction_to_world_space(face.direction);
            let ours = self.direction_to_world_space(own.direction);
            (theirs + ours).length_squared() < 1e-6
        }
    }
}

/// World position and frame of a path-space point. The frame is the path
/// rotation at `p.x` rolled a quarter turn about its forward axis.
pub fn path_space_to_world(path: &dyn PathGeometry, p: Vec3) -> (Vec3, Quat) {
    let frame = path.rotation_at_distance(p.x) * Quat::from_rotation_z(90f32.to_radians());
    let position = path.point_at_distance(p.x) + frame * Vec3::new(p.z, p.y, 0.0);
    (position, frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashstream_models::item;
    use dashstream_path::{EndOfPath, VertexPath};

    fn straight() -> VertexPath {
        VertexPath::straight(1000.0, EndOfPath::Stop).unwrap()
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn straight_path_places_items_along_z() {
        let path = straight();
        let info = ItemInfo::new(
            item::NORMAL_BLOCK,
            GridPos::new(10, 0, 0),
            0,
            &path,
            ModelLibrary::global(),
        );
        assert!(close(info.world_position(), Vec3::new(0.0, 0.0, 10.0)));
        assert_eq!(info.detail(), Some(0));
    }

    #[test]
    fn lateral_offsets_use_the_rolled_frame() {
        let path = straight();
        let (pos, _) = path_space_to_world(&path, Vec3::new(5.0, 2.0, 3.0));
        // Path z maps onto world y and path y onto world -x.
        assert!(close(pos, Vec3::new(-2.0, 3.0, 5.0)));
    }

    #[test]
    fn item_without_model_has_no_detail() {
        let path = straight();
        let info = ItemInfo::new(
            "3dash:orbs/yellow",
            GridPos::new(1, 0, 0),
            0,
            &path,
            ModelLibrary::global(),
        );
        assert_eq!(info.detail(), None);
        assert!(info.model(ModelLibrary::global()).is_none());
    }

    #[test]
    fn sharp_bend_picks_higher_detail() {
        // The heading turns 45 degrees over the first 10 units, then another
        // 45 degrees over the last 2.
        let points = vec![Vec3::ZERO, Vec3::Z * 10.0, Vec3::new(2.0, 0.0, 10.0)];
        let path = VertexPath::new(points, Vec3::Y, EndOfPath::Stop).unwrap();
        let library = ModelLibrary::global();
        let gentle = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(5, 0, 0), 0, &path, library);
        let sharp = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(11, 0, 0), 0, &path, library);
        assert_eq!(gentle.detail(), Some(0));
        assert_eq!(sharp.detail(), Some(1));
    }

    #[test]
    fn rotation_turns_cull_directions_about_z() {
        let path = straight();
        let info = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(0, 0, 0), 90, &path, ModelLibrary::global());
        assert_eq!(info.direction_to_grid(Direction::PosX), IVec3::Y);
        assert_eq!(info.direction_to_grid(Direction::PosY), IVec3::NEG_X);
        assert_eq!(info.direction_to_grid(Direction::PosZ), IVec3::Z);
    }

    #[test]
    fn unrotated_offsets_swap_x_and_z() {
        let path = straight();
        let info = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(4, 1, 2), 0, &path, ModelLibrary::global());
        assert!(close(info.offset_to_path_space(Vec3::new(0.5, 0.0, 0.25)), Vec3::new(0.25, 0.0, 0.5)));
        assert!(close(info.vertex_to_path_space(Vec3::Z * 0.5), Vec3::new(4.5, 1.0, 2.0)));
    }

    #[test]
    fn vertices_past_the_path_end_follow_the_item() {
        let path = VertexPath::straight(10.0, EndOfPath::Stop).unwrap();
        let info = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(10, 0, 0), 0, &path, ModelLibrary::global());
        let past_end = info.vertex_to_world_space(&path, Vec3::Z * 0.5);
        let expected = info.world_position() + info.world_rotation() * (Vec3::Z * 0.5);
        assert!(close(past_end, expected));
    }

    #[test]
    fn animation_values_follow_speed_map() {
        let path = straight();
        let mut info = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(20, 0, 0), 0, &path, ModelLibrary::global());
        assert_eq!(info.time(), -1.0);

        let speeds = SpeedMap::constant(10.0).unwrap();
        info.cache_animation_values(&speeds, 0.5, 0.25);
        assert!((info.time() - 2.0).abs() < 1e-4);
        assert!((info.out_animation_end() - 25.0).abs() < 1e-3);
        assert!((info.in_animation_end() - 22.5).abs() < 1e-3);
    }

    #[test]
    fn adjacent_blocks_cover_each_other() {
        let path = straight();
        let library = ModelLibrary::global();
        let a = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(0, 0, 0), 0, &path, library);
        let b = ItemInfo::new(item::NORMAL_BLOCK, GridPos::new(1, 0, 0), 0, &path, library);
        let model = a.model(library).unwrap();
        let pos_x = model.faces.iter().find(|f| f.direction == Direction::PosX).unwrap();
        let pos_y = model.faces.iter().find(|f| f.direction == Direction::PosY).unwrap();

        assert!(b.can_cull_face_against_model(&a, pos_x, library, 0.1));
        assert!(!b.can_cull_face_against_model(&a, pos_y, library, 0.1));
    }
}
