use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::rotation::look_rotation;

/// How distances beyond either end of the path are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndOfPath {
    /// Wrap around to the start.
    Loop,
    /// Travel back along the path (ping-pong).
    Reverse,
    /// Clamp to the nearest end.
    #[default]
    Stop,
}

impl EndOfPath {
    /// Map an arbitrary distance into `[0, length]`.
    pub fn resolve(self, distance: f32, length: f32) -> f32 {
        if length <= 0.0 {
            return 0.0;
        }
        match self {
            Self::Loop => distance.rem_euclid(length),
            Self::Reverse => {
                let m = distance.rem_euclid(2.0 * length);
                if m > length { 2.0 * length - m } else { m }
            }
            Self::Stop => distance.clamp(0.0, length),
        }
    }
}

/// A curve parameterized by travel distance.
pub trait PathGeometry {
    /// Total arc length.
    fn length(&self) -> f32;

    /// Point on the curve at `distance`.
    fn point_at_distance(&self, distance: f32) -> Vec3;

    /// Orientation of the curve at `distance`; +Z follows the tangent.
    fn rotation_at_distance(&self, distance: f32) -> Quat;
}

/// Errors from building a path.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("a path needs at least two points, got {0}")]
    TooFewPoints(usize),
    #[error("path has zero length")]
    ZeroLength,
}

/// Polyline path with linearly interpolated points and slerped vertex rotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VertexPath {
    points: Vec<Vec3>,
    rotations: Vec<Quat>,
    /// Cumulative arc length at each point.
    distances: Vec<f32>,
    end_of_path: EndOfPath,
}

impl VertexPath {
    /// Build a path through `points`. Vertex rotations look along the average
    /// of the adjacent segment directions, with `up` as the reference up axis.
    pub fn new(points: Vec<Vec3>, up: Vec3, end_of_path: EndOfPath) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewPoints(points.len()));
        }
        let mut distances = Vec::with_capacity(points.len());
        let mut total = 0.0;
        distances.push(0.0);
        for pair in points.windows(2) {
            total += pair[0].distance(pair[1]);
            distances.push(total);
        }
        if total <= 0.0 {
            return Err(PathError::ZeroLength);
        }

        let last = points.len() - 1;
        let rotations = (0..points.len())
            .map(|i| {
                let before = if i > 0 { points[i] - points[i - 1] } else { Vec3::ZERO };
                let after = if i < last { points[i + 1] - points[i] } else { Vec3::ZERO };
                let tangent = before.normalize_or_zero() + after.normalize_or_zero();
                look_rotation(tangent, up)
            })
            .collect();

        tracing::debug!(points = points.len(), length = total, "vertex path built");
        Ok(Self {
            points,
            rotations,
            distances,
            end_of_path,
        })
    }

    /// A straight path from the origin along +Z.
    pub fn straight(length: f32, end_of_path: EndOfPath) -> Result<Self, PathError> {
        Self::new(vec![Vec3::ZERO, Vec3::Z * length], Vec3::Y, end_of_path)
    }

    pub fn end_of_path(&self) -> EndOfPath {
        self.end_of_path
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Segment index and interpolation factor for a distance.
    fn locate(&self, distance: f32) -> (usize, f32) {
        let d = self.end_of_path.resolve(distance, self.length());
        let upper = self.distances.partition_point(|&x| x <= d);
        let i = upper.saturating_sub(1).min(self.points.len() - 2);
        let span = self.distances[i + 1] - self.distances[i];
        let t = if span > 0.0 {
            ((d - self.distances[i]) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (i, t)
    }
}

impl PathGeometry for VertexPath {
    fn length(&self) -> f32 {
        self.distances[self.distances.len() - 1]
    }

    fn point_at_distance(&self, distance: f32) -> Vec3 {
        let (i, t) = self.locate(distance);
        self.points[i].lerp(self.points[i + 1], t)
    }

    fn rotation_at_distance(&self, distance: f32) -> Quat {
        let (i, t) = self.locate(distance);
        self.rotations[i].slerp(self.rotations[i + 1], t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec_close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn rejects_degenerate_paths() {
        assert_eq!(
            VertexPath::new(vec![Vec3::ZERO], Vec3::Y, EndOfPath::Stop).unwrap_err(),
            PathError::TooFewPoints(1)
        );
        assert_eq!(
            VertexPath::new(vec![Vec3::ONE, Vec3::ONE], Vec3::Y, EndOfPath::Stop).unwrap_err(),
            PathError::ZeroLength
        );
    }

    #[test]
    fn straight_path_points() {
        let path = VertexPath::straight(100.0, EndOfPath::Stop).unwrap();
        assert_eq!(path.length(), 100.0);
        assert!(vec_close(path.point_at_distance(25.0), Vec3::new(0.0, 0.0, 25.0)));
        assert!(path.rotation_at_distance(40.0).angle_between(Quat::IDENTITY) < 1e-3);
    }

    #[test]
    fn end_of_path_policies() {
        assert_eq!(EndOfPath::Stop.resolve(120.0, 100.0), 100.0);
        assert_eq!(EndOfPath::Stop.resolve(-5.0, 100.0), 0.0);
        assert_eq!(EndOfPath::Loop.resolve(120.0, 100.0), 20.0);
        assert_eq!(EndOfPath::Loop.resolve(-5.0, 100.0), 95.0);
        assert_eq!(EndOfPath::Reverse.resolve(120.0, 100.0), 80.0);
        assert_eq!(EndOfPath::Reverse.resolve(-5.0, 100.0), 5.0);
    }

    #[test]
    fn polyline_interpolates_across_segments() {
        let path = VertexPath::new(
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0), Vec3::new(10.0, 0.0, 10.0)],
            Vec3::Y,
            EndOfPath::Stop,
        )
        .unwrap();
        assert_eq!(path.length(), 20.0);
        assert!(vec_close(path.point_at_distance(15.0), Vec3::new(5.0, 0.0, 10.0)));
        // The corner vertex looks along the averaged tangent.
        let corner = path.rotation_at_distance(10.0) * Vec3::Z;
        assert!(vec_close(corner, Vec3::new(1.0, 0.0, 1.0).normalize()));
    }
}
