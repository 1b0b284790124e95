use glam::{EulerRot, Mat3, Quat, Vec3};

/// Rotation whose +Z axis points along `forward` and whose +Y axis leans
/// towards `up`. When `forward` is parallel to `up` an arbitrary orthogonal
/// right axis is used.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let right = up.cross(forward);
    let right = if right.length_squared() < 1e-8 {
        forward.any_orthonormal_vector()
    } else {
        right.normalize()
    };
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Euler angles in degrees, composed as yaw (Y) then pitch (X) then roll (Z).
/// Each component is normalized into `[0, 360)`.
pub fn euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(
        x.to_degrees().rem_euclid(360.0),
        y.to_degrees().rem_euclid(360.0),
        z.to_degrees().rem_euclid(360.0),
    )
}

/// Inverse of [`euler_degrees`].
pub fn from_euler_degrees(angles: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        angles.y.to_radians(),
        angles.x.to_radians(),
        angles.z.to_radians(),
    )
}

/// Shortest signed difference from `current` to `target`, in degrees, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 { delta - 360.0 } else { delta }
}
