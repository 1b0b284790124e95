use dashstream_path::look_rotation;
use glam::{IVec3, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Number of subdivision levels generated per shape family.
pub const DETAIL_LEVELS: usize = 24;

/// One of the six axis directions a face can be culled along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::PosX,
        Direction::NegX,
        Direction::PosY,
        Direction::NegY,
        Direction::PosZ,
        Direction::NegZ,
    ];

    pub fn as_ivec3(self) -> IVec3 {
        match self {
            Self::PosX => IVec3::X,
            Self::NegX => IVec3::NEG_X,
            Self::PosY => IVec3::Y,
            Self::NegY => IVec3::NEG_Y,
            Self::PosZ => IVec3::Z,
            Self::NegZ => IVec3::NEG_Z,
        }
    }

    pub fn as_vec3(self) -> Vec3 {
        self.as_ivec3().as_vec3()
    }

    pub fn from_ivec3(v: IVec3) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_ivec3() == v)
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }
}

/// A subdivided polygon of a model, in the model's local space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub vertices: Vec<Vec3>,
    pub triangles: Vec<u32>,
    pub uvs: Vec<Vec2>,
    /// Path-space direction this face is culled along.
    pub direction: Direction,
}

/// Ordered set of faces making up one detail level of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub faces: Vec<Face>,
}

impl Model {
    pub fn vertex_count(&self) -> usize {
        self.faces.iter().map(|f| f.vertices.len()).sum()
    }
}

/// Local space stores path axes swizzled (x <-> z); convert a path-space normal.
fn local_normal(normal: Vec3) -> Vec3 {
    Vec3::new(normal.z, normal.y, normal.x).normalize()
}

/// Rectangular grid of `(detail + 2)²` vertices on the plane through `offset`
/// facing `normal` (path-space axes), with UVs spanning `[0, 1]²`.
pub fn generate_plane(
    offset: Vec3,
    normal: Vec3,
    direction: Direction,
    width: f32,
    height: f32,
    detail: usize,
) -> Face {
    let rot = look_rotation(local_normal(normal), Vec3::Y);
    let per_row = detail + 2;
    let cells = detail + 1;
    let step = (per_row - 1) as f32;

    let mut vertices = Vec::with_capacity(per_row * per_row);
    let mut uvs = Vec::with_capacity(per_row * per_row);
    for y in 0..per_row {
        let v = y as f32 / step;
        for x in 0..per_row {
            let u = x as f32 / step;
            vertices.push(rot * Vec3::new((u - 0.5) * width, (v - 0.5) * height, 0.0) + offset);
            uvs.push(Vec2::new(u, v));
        }
    }

    let row = per_row as u32;
    let mut triangles = Vec::with_capacity(cells * cells * 6);
    for y in 0..cells as u32 {
        for x in 0..cells as u32 {
            triangles.extend_from_slice(&[
                x + 1 + y * row,
                x + 1 + (y + 1) * row,
                x + (y + 1) * row,
                x + 1 + y * row,
                x + (y + 1) * row,
                x + y * row,
            ]);
        }
    }

    Face {
        vertices,
        triangles,
        uvs,
        direction,
    }
}

/// Right-triangle grid with the right angle at the `(0, 0)` UV corner. Row `y`
/// holds `detail + 2 - y` vertices; the cell touching the hypotenuse only
/// emits its lower triangle. `roll` rotates the face about the local X axis,
/// in degrees.
pub fn generate_triangle(
    offset: Vec3,
    normal: Vec3,
    direction: Direction,
    roll: f32,
    width: f32,
    height: f32,
    detail: usize,
) -> Face {
    let rot = Quat::from_rotation_x(roll.to_radians()) * look_rotation(local_normal(normal), Vec3::Y);
    let per_col = detail + 2;
    let cells = detail + 1;
    let step = (per_col - 1) as f32;

    let mut row_start = Vec::with_capacity(per_col);
    let mut vertices = Vec::new();
    let mut uvs = Vec::new();
    for y in 0..per_col {
        row_start.push(vertices.len() as u32);
        let v = y as f32 / step;
        for x in 0..per_col - y {
            let u = x as f32 / step;
            vertices.push(rot * Vec3::new((u - 0.5) * width, (v - 0.5) * height, 0.0) + offset);
            uvs.push(Vec2::new(u, v));
        }
    }

    let at = |x: usize, y: usize| row_start[y] + x as u32;
    let mut triangles = Vec::with_capacity(cells * cells * 3);
    for y in 0..cells {
        for x in 0..cells - y {
            triangles.extend_from_slice(&[at(x, y), at(x + 1, y), at(x, y + 1)]);
            if x == cells - y - 1 {
                continue;
            }
            triangles.extend_from_slice(&[at(x, y + 1), at(x + 1, y), at(x + 1, y + 1)]);
        }
    }

    Face {
        vertices,
        triangles,
        uvs,
        direction,
    }
}

fn plane(offset: Vec3, direction: Direction, width: f32, height: f32, detail: usize) -> Face {
    generate_plane(offset, direction.as_vec3(), direction, width, height, detail)
}

/// Offsets below are in local space, where path +X is local +Z.
pub fn full_block_models() -> Vec<Model> {
    (0..DETAIL_LEVELS)
        .map(|i| Model {
            faces: vec![
                plane(Vec3::Z * 0.5, Direction::PosX, 1.0, 1.0, i),
                plane(Vec3::NEG_Z * 0.5, Direction::NegX, 1.0, 1.0, i),
                plane(Vec3::Y * 0.5, Direction::PosY, 1.0, 1.0, i),
                plane(Vec3::NEG_Y * 0.5, Direction::NegY, 1.0, 1.0, i),
                plane(Vec3::X * 0.5, Direction::PosZ, 1.0, 1.0, i),
                plane(Vec3::NEG_X * 0.5, Direction::NegZ, 1.0, 1.0, i),
            ],
        })
        .collect()
}

/// Upper half of a block: sides span `y ∈ [0, 0.5]`, bottom sits at the item's center.
pub fn half_block_models() -> Vec<Model> {
    let lift = Vec3::Y * 0.25;
    (0..DETAIL_LEVELS)
        .map(|i| Model {
            faces: vec![
                plane(Vec3::Z * 0.5 + lift, Direction::PosX, 1.0, 0.5, i),
                plane(Vec3::NEG_Z * 0.5 + lift, Direction::NegX, 1.0, 0.5, i),
                plane(Vec3::Y * 0.5, Direction::PosY, 1.0, 1.0, i),
                plane(Vec3::ZERO, Direction::NegY, 1.0, 1.0, i),
                plane(Vec3::X * 0.5 + lift, Direction::PosZ, 1.0, 0.5, i),
                plane(Vec3::NEG_X * 0.5 + lift, Direction::NegZ, 1.0, 0.5, i),
            ],
        })
        .collect()
}

/// Ramp rising towards +X. The inclined face is tagged +Y. Not registered in
/// the standard catalog.
pub fn slope_models() -> Vec<Model> {
    let incline = Vec3::new(-1.0, 1.0, 0.0);
    (0..DETAIL_LEVELS)
        .map(|i| Model {
            faces: vec![
                plane(Vec3::Z * 0.5, Direction::PosX, 1.0, 1.0, i),
                generate_plane(
                    Vec3::ZERO,
                    incline,
                    Direction::PosY,
                    1.0,
                    std::f32::consts::SQRT_2,
                    i,
                ),
                plane(Vec3::NEG_Y * 0.5, Direction::NegY, 1.0, 1.0, i),
                generate_triangle(
                    Vec3::X * 0.5,
                    Direction::PosZ.as_vec3(),
                    Direction::PosZ,
                    0.0,
                    1.0,
                    1.0,
                    i,
                ),
                generate_triangle(
                    Vec3::NEG_X * 0.5,
                    Direction::NegZ.as_vec3(),
                    Direction::NegZ,
                    -90.0,
                    1.0,
                    1.0,
                    i,
                ),
            ],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices_valid(face: &Face) -> bool {
        face.triangles.iter().all(|&t| (t as usize) < face.vertices.len())
    }

    /// Path-space position of a local vertex for an unrotated item.
    fn path_space(v: Vec3) -> Vec3 {
        Vec3::new(v.z, v.y, v.x)
    }

    #[test]
    fn plane_grid_sizes() {
        for detail in [0, 1, 5, 23] {
            let face = plane(Vec3::ZERO, Direction::PosY, 1.0, 1.0, detail);
            let n = detail + 2;
            assert_eq!(face.vertices.len(), n * n);
            assert_eq!(face.uvs.len(), n * n);
            assert_eq!(face.triangles.len(), (n - 1) * (n - 1) * 6);
            assert!(indices_valid(&face));
        }
    }

    #[test]
    fn plane_uvs_span_unit_square() {
        let face = plane(Vec3::ZERO, Direction::PosX, 1.0, 1.0, 3);
        assert_eq!(face.uvs[0], Vec2::ZERO);
        assert_eq!(*face.uvs.last().unwrap(), Vec2::ONE);
    }

    #[test]
    fn triangle_grid_sizes() {
        for detail in [0, 1, 4, 23] {
            let face = generate_triangle(Vec3::ZERO, Vec3::Z, Direction::PosZ, 0.0, 1.0, 1.0, detail);
            let n = detail + 2;
            assert_eq!(face.vertices.len(), n * (n + 1) / 2);
            // (n - 1)² triangles cover the right triangle exactly.
            assert_eq!(face.triangles.len(), (n - 1) * (n - 1) * 3);
            assert!(indices_valid(&face));
        }
    }

    #[test]
    fn full_block_faces_sit_on_unit_cube() {
        let models = full_block_models();
        assert_eq!(models.len(), DETAIL_LEVELS);
        for face in &models[0].faces {
            let axis = face.direction.as_vec3();
            for v in &face.vertices {
                let p = path_space(*v);
                assert!((p.dot(axis) - 0.5).abs() < 1e-5, "{:?} {p:?}", face.direction);
                assert!(p.abs().max_element() <= 0.5 + 1e-5);
            }
        }
    }

    #[test]
    fn half_block_occupies_upper_half() {
        let model = &half_block_models()[2];
        for face in &model.faces {
            for v in &face.vertices {
                let p = path_space(*v);
                assert!(p.y >= -1e-5 && p.y <= 0.5 + 1e-5, "{p:?}");
            }
        }
    }

    #[test]
    fn slope_side_triangles_share_ramp_outline() {
        let model = &slope_models()[0];
        assert_eq!(model.faces.len(), 5);
        for face in &model.faces[3..] {
            for v in &face.vertices {
                let p = path_space(*v);
                // Every side vertex lies on or under the ramp y = x.
                assert!(p.y <= p.x + 1e-4, "{p:?}");
                assert!((p.z.abs() - 0.5).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn every_family_has_valid_indices() {
        for models in [full_block_models(), half_block_models(), slope_models()] {
            for model in [&models[0], &models[DETAIL_LEVELS - 1]] {
                assert!(model.faces.iter().all(indices_valid));
            }
        }
    }

    #[test]
    fn direction_round_trip() {
        for d in Direction::ALL {
            assert_eq!(Direction::from_ivec3(d.as_ivec3()), Some(d));
            assert_eq!(d.opposite().as_ivec3(), -d.as_ivec3());
        }
        assert_eq!(Direction::from_ivec3(IVec3::new(1, 1, 0)), None);
    }
}
