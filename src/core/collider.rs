use glam::Vec3;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Convex geometries a collider can take.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Box that stays axis-aligned in world space; the object's rotation is not applied.
    Box { half_extents: Vec3 },
    /// Sphere whose radius is scaled by the largest scale component.
    Sphere { radius: f32 },
}

/// Tag of a [`ColliderShape`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Box,
    Sphere,
}

impl ColliderShape {
    /// Axis-aligned unit cube (side length 1).
    pub fn unit_box() -> Self {
        ColliderShape::Box {
            half_extents: Vec3::splat(0.5),
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        ColliderShape::Box { half_extents }
    }

    pub fn sphere(radius: f32) -> Self {
        ColliderShape::Sphere { radius }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            ColliderShape::Box { .. } => ShapeType::Box,
            ColliderShape::Sphere { .. } => ShapeType::Sphere,
        }
    }
}

/// World-space axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Overlap test restricted to the Y and Z axes.
    pub fn overlaps_yz(&self, other: &Aabb) -> bool {
        self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedBounds {
    stamp: u32,
    aabb: Aabb,
}

/// Collider component. Geometry is resolved against the owning object's
/// transform on every query; only the bounding box is cached.
#[derive(Debug, Serialize, Deserialize)]
pub struct Collider {
    shape: ColliderShape,
    #[serde(skip)]
    bounds: Mutex<Option<CachedBounds>>,
}

/// Clones share the shape only; the copy computes its own bounds.
impl Clone for Collider {
    fn clone(&self) -> Self {
        Self::new(self.shape)
    }
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            bounds: Mutex::new(None),
        }
    }

    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape.shape_type()
    }

    pub fn set_shape(&mut self, shape: ColliderShape) {
        self.shape = shape;
        self.invalidate_bounds();
    }

    /// Forgets the cached box; the next query recomputes it.
    pub fn invalidate_bounds(&mut self) {
        *self.bounds.get_mut() = None;
    }

    #[cfg(test)]
    fn has_cached_bounds(&self) -> bool {
        self.bounds.lock().is_some()
    }

    /// Returns the cached box for `stamp`, recomputing it with `compute` when stale.
    pub(crate) fn cached_bounds(&self, stamp: u32, compute: impl FnOnce() -> Aabb) -> Aabb {
        let mut cache = self.bounds.lock();
        match *cache {
            Some(cached) if cached.stamp == stamp => cached.aabb,
            _ => {
                let aabb = compute();
                *cache = Some(CachedBounds { stamp, aabb });
                aabb
            }
        }
    }
}
