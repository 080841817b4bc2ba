use glam::Vec3;

use crate::core::{
    collider::{Aabb, Collider, ColliderShape, ShapeType},
    transform::WorldTransform,
};

/// Sphere parameters in world space, exposed for the sphere/sphere shortcut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereInfo {
    pub center: Vec3,
    pub radius: f32,
}

/// Convex shape described by its support function.
pub trait SupportShape {
    /// World-space point of the shape maximising `dot(point, direction)`.
    fn furthest_point(&self, direction: Vec3) -> Vec3;

    /// Reference point used by contact reconstruction.
    fn center(&self) -> Vec3;

    fn as_sphere(&self) -> Option<SphereInfo> {
        None
    }

    /// Bounding box from six support queries along the coordinate axes.
    fn bounding_box(&self) -> Aabb {
        Aabb::new(
            Vec3::new(
                self.furthest_point(Vec3::NEG_X).x,
                self.furthest_point(Vec3::NEG_Y).y,
                self.furthest_point(Vec3::NEG_Z).z,
            ),
            Vec3::new(
                self.furthest_point(Vec3::X).x,
                self.furthest_point(Vec3::Y).y,
                self.furthest_point(Vec3::Z).z,
            ),
        )
    }
}

/// Signs of the eight unit-cube corners, x varying fastest.
const CUBE_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
];

/// Support point of a world-axis-aligned box; ties keep the first corner.
pub fn box_support(half_extents: Vec3, transform: &WorldTransform, direction: Vec3) -> Vec3 {
    let mut best = transform.position + CUBE_CORNERS[0] * half_extents * transform.scale;
    let mut best_dot = best.dot(direction);
    for corner in &CUBE_CORNERS[1..] {
        let vertex = transform.position + *corner * half_extents * transform.scale;
        let dot = vertex.dot(direction);
        if dot > best_dot {
            best_dot = dot;
            best = vertex;
        }
    }
    best
}

pub fn sphere_radius(radius: f32, transform: &WorldTransform) -> f32 {
    radius * transform.scale.abs().max_element()
}

pub fn sphere_support(radius: f32, transform: &WorldTransform, direction: Vec3) -> Vec3 {
    transform.position + direction.normalize_or_zero() * sphere_radius(radius, transform)
}

/// A collider bound to its owner's world transform for the duration of a query.
#[derive(Debug, Clone, Copy)]
pub struct ColliderView<'a> {
    collider: &'a Collider,
    transform: WorldTransform,
}

impl<'a> ColliderView<'a> {
    pub fn new(collider: &'a Collider, transform: WorldTransform) -> Self {
        Self {
            collider,
            transform,
        }
    }

    pub fn collider(&self) -> &'a Collider {
        self.collider
    }

    pub fn transform(&self) -> &WorldTransform {
        &self.transform
    }

    pub fn shape_type(&self) -> ShapeType {
        self.collider.shape_type()
    }

    /// Bounding box cached on the collider until the transform chain changes.
    pub fn cached_bounding_box(&self) -> Aabb {
        self.collider
            .cached_bounds(self.transform.stamp, || self.bounding_box())
    }
}

impl SupportShape for ColliderView<'_> {
    fn furthest_point(&self, direction: Vec3) -> Vec3 {
        match *self.collider.shape() {
            ColliderShape::Box { half_extents } => {
                box_support(half_extents, &self.transform, direction)
            }
            ColliderShape::Sphere { radius } => sphere_support(radius, &self.transform, direction),
        }
    }

    fn center(&self) -> Vec3 {
        self.transform.position
    }

    fn as_sphere(&self) -> Option<SphereInfo> {
        match *self.collider.shape() {
            ColliderShape::Sphere { radius } => Some(SphereInfo {
                center: self.transform.position,
                radius: sphere_radius(radius, &self.transform),
            }),
            ColliderShape::Box { .. } => None,
        }
    }
}

/// Owned shape placed in world space, for queries outside a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedShape {
    pub shape: ColliderShape,
    pub transform: WorldTransform,
}

impl PlacedShape {
    pub fn new(shape: ColliderShape, position: Vec3, scale: Vec3) -> Self {
        Self {
            shape,
            transform: WorldTransform {
                position,
                rotation: Vec3::ZERO,
                scale,
                stamp: 0,
            },
        }
    }

    pub fn sphere(radius: f32, position: Vec3) -> Self {
        Self::new(ColliderShape::sphere(radius), position, Vec3::ONE)
    }

    pub fn unit_box(position: Vec3) -> Self {
        Self::new(ColliderShape::unit_box(), position, Vec3::ONE)
    }
}

impl SupportShape for PlacedShape {
    fn furthest_point(&self, direction: Vec3) -> Vec3 {
        match self.shape {
            ColliderShape::Box { half_extents } => {
                box_support(half_extents, &self.transform, direction)
            }
            ColliderShape::Sphere { radius } => sphere_support(radius, &self.transform, direction),
        }
    }

    fn center(&self) -> Vec3 {
        self.transform.position
    }

    fn as_sphere(&self) -> Option<SphereInfo> {
        match self.shape {
            ColliderShape::Sphere { radius } => Some(SphereInfo {
                center: self.transform.position,
                radius: sphere_radius(radius, &self.transform),
            }),
            ColliderShape::Box { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn box_support_ignores_rotation() {
        let mut placed = PlacedShape::new(
            ColliderShape::unit_box(),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 1.0, 1.0),
        );
        placed.transform.rotation = Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_4);

        let point = placed.furthest_point(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(point, Vec3::new(2.0, 0.5, 0.5));
    }

    #[test]
    fn sphere_radius_uses_largest_scale_axis() {
        let placed = PlacedShape::new(
            ColliderShape::sphere(1.0),
            Vec3::ZERO,
            Vec3::new(1.0, 3.0, 1.0),
        );
        let point = placed.furthest_point(Vec3::X);
        assert_relative_eq!(point.x, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn bounding_box_of_unit_box() {
        let placed = PlacedShape::unit_box(Vec3::new(0.0, 2.0, 0.0));
        let aabb = placed.bounding_box();
        assert_eq!(aabb.min, Vec3::new(-0.5, 1.5, -0.5));
        assert_eq!(aabb.max, Vec3::new(0.5, 2.5, 0.5));
    }

    #[test]
    fn zero_direction_on_sphere_returns_center() {
        let placed = PlacedShape::sphere(2.0, Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(placed.furthest_point(Vec3::ZERO), Vec3::ONE);
    }
}
