//! Geometric helpers layered on top of `glam`.

use glam::Vec3;

/// Squared lengths below this are treated as zero-length directions.
pub const DIRECTION_EPSILON: f32 = 1e-10;

/// True when `a` and `b` point into the same half-space.
pub fn same_direction(a: Vec3, b: Vec3) -> bool {
    a.dot(b) > 0.0
}

/// `(a × b) × c`, the GJK triple product.
pub fn triple_cross(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    a.cross(b).cross(c)
}

pub fn is_near_zero(v: Vec3) -> bool {
    v.length_squared() < DIRECTION_EPSILON
}

/// Some vector perpendicular to `v`, preferring the +Z cross product.
pub fn any_perpendicular(v: Vec3) -> Vec3 {
    let perp = v.cross(Vec3::Z);
    if !is_near_zero(perp) {
        return perp;
    }
    let perp = v.cross(Vec3::X);
    if is_near_zero(perp) {
        Vec3::Y
    } else {
        perp
    }
}

/// Barycentric coordinates of `p` projected onto the plane of triangle `abc`.
///
/// Returns `None` for degenerate (zero-area) triangles.
pub fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<Vec3> {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < DIRECTION_EPSILON {
        return None;
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Some(Vec3::new(1.0 - v - w, v, w))
}

/// Clamps barycentric weights onto the triangle (nearest feature) and renormalises.
pub fn clamp_barycentric(weights: Vec3) -> Vec3 {
    let clamped = weights.max(Vec3::ZERO);
    let sum = clamped.x + clamped.y + clamped.z;
    if sum <= f32::EPSILON {
        Vec3::splat(1.0 / 3.0)
    } else {
        clamped / sum
    }
}

/// Closest point to the origin on the plane through `point` with unit `normal`.
pub fn plane_point_closest_to_origin(point: Vec3, normal: Vec3) -> Vec3 {
    normal * normal.dot(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn barycentric_recovers_vertex_weights() {
        let a = Vec3::ZERO;
        let b = Vec3::X;
        let c = Vec3::Y;
        let weights = barycentric(Vec3::new(0.25, 0.25, 0.0), a, b, c).expect("valid triangle");
        assert_relative_eq!(weights.x, 0.5, epsilon = 1e-6);
        assert_relative_eq!(weights.y, 0.25, epsilon = 1e-6);
        assert_relative_eq!(weights.z, 0.25, epsilon = 1e-6);
        assert!(barycentric(Vec3::ZERO, a, a, b).is_none());
    }

    #[test]
    fn perpendicular_falls_back_for_z_aligned_vectors() {
        let v = Vec3::new(0.0, 0.0, 2.0);
        let perp = any_perpendicular(v);
        assert!(!is_near_zero(perp));
        assert_relative_eq!(perp.dot(v), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn clamping_keeps_weights_on_triangle() {
        let clamped = clamp_barycentric(Vec3::new(1.5, -0.5, 0.0));
        assert_relative_eq!(clamped.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(clamped.y, 0.0, epsilon = 1e-6);
    }
}
