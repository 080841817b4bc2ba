use glam::Vec3;

use super::simplex::{Simplex, SupportPoint};
use crate::utils::math::{is_near_zero, plane_point_closest_to_origin, same_direction};

/// Tolerance for "vertex in front of a face" during reconstruction; coplanar
/// vertices are common on box Minkowski differences.
const ORIENTATION_EPSILON: f32 = 1e-5;

/// Triangle of the polytope with its outward normal and plane distance cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    pub normal: Vec3,
    /// Closest point to the origin on the face's plane.
    pub closest_point: Vec3,
    pub distance_sq: f32,
}

impl Face {
    /// Builds face `indices` with the winding-derived normal; `None` if degenerate.
    fn from_winding(vertices: &[SupportPoint], indices: [usize; 3]) -> Option<Self> {
        let [a, b, c] = indices.map(|i| vertices[i].point);
        let normal = (b - a).cross(c - a).normalize_or_zero();
        if is_near_zero(normal) {
            return None;
        }
        let closest_point = plane_point_closest_to_origin(a, normal);
        Some(Self {
            indices,
            normal,
            closest_point,
            distance_sq: closest_point.length_squared(),
        })
    }

    fn flipped(self) -> Self {
        let [a, b, c] = self.indices;
        Self {
            indices: [b, a, c],
            normal: -self.normal,
            ..self
        }
    }

    #[cfg(test)]
    fn has_edge(&self, a: usize, b: usize) -> bool {
        self.indices.contains(&a) && self.indices.contains(&b)
    }
}

/// Convex hull grown by EPA around the origin.
///
/// Faces live in a vector that is compacted only inside [`Polytope::deconstruct`],
/// and the index of the face nearest the origin is refreshed right after, so no
/// face index is held across a removal.
#[derive(Debug, Clone, Default)]
pub struct Polytope {
    vertices: Vec<SupportPoint>,
    faces: Vec<Face>,
    closest: Option<usize>,
}

impl Polytope {
    /// Builds the four faces of the terminal GJK tetrahedron with outward normals.
    pub fn from_simplex(simplex: &Simplex) -> Option<Self> {
        if simplex.len() != Simplex::CAPACITY {
            return None;
        }

        let vertices = simplex.points().to_vec();
        let mut polytope = Self {
            vertices,
            faces: Vec::with_capacity(16),
            closest: None,
        };

        for (indices, opposite) in [
            ([0, 1, 2], 3),
            ([0, 1, 3], 2),
            ([0, 2, 3], 1),
            ([1, 2, 3], 0),
        ] {
            let Some(face) = Face::from_winding(&polytope.vertices, indices) else {
                continue;
            };
            let to_opposite = polytope.vertices[opposite].point - polytope.vertices[indices[0]].point;
            let face = if same_direction(face.normal, to_opposite) {
                face.flipped()
            } else {
                face
            };
            polytope.push_face(face);
        }

        if polytope.faces.is_empty() {
            None
        } else {
            Some(polytope)
        }
    }

    pub fn vertices(&self) -> &[SupportPoint] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// The face whose plane is currently nearest the origin.
    pub fn closest_face(&self) -> Option<&Face> {
        self.closest.map(|index| &self.faces[index])
    }

    /// Exact-equality membership test for a candidate support point.
    pub fn contains_vertex(&self, point: Vec3) -> bool {
        self.vertices.iter().any(|vertex| vertex.point == point)
    }

    /// Adds `support` to the hull: removes the faces it can see and stitches the
    /// horizon to it. Returns `false` when no face was visible.
    pub fn expand(&mut self, support: SupportPoint) -> bool {
        let horizon = self.deconstruct(support.point);
        if horizon.is_empty() {
            return false;
        }
        self.reconstruct(&horizon, support);
        true
    }

    /// Removes every face whose outward normal faces `point` and returns the
    /// horizon: edges that belonged to exactly one removed face.
    fn deconstruct(&mut self, point: Vec3) -> Vec<(usize, usize)> {
        let mut horizon: Vec<(usize, usize)> = Vec::new();
        let vertices = &self.vertices;

        self.faces.retain(|face| {
            let anchor = vertices[face.indices[0]].point;
            if !same_direction(face.normal, point - anchor) {
                return true;
            }
            let [a, b, c] = face.indices;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                toggle_edge(&mut horizon, u, v);
            }
            false
        });

        self.closest = self
            .faces
            .iter()
            .enumerate()
            .min_by(|(_, lhs), (_, rhs)| lhs.distance_sq.total_cmp(&rhs.distance_sq))
            .map(|(index, _)| index);

        horizon
    }

    fn reconstruct(&mut self, horizon: &[(usize, usize)], support: SupportPoint) {
        let new_index = self.vertices.len();
        self.vertices.push(support);

        for &(a, b) in horizon {
            let Some(face) = Face::from_winding(&self.vertices, [a, b, new_index]) else {
                continue;
            };
            let face = if self.is_outward(&face) {
                face
            } else {
                let flipped = face.flipped();
                if !self.is_outward(&flipped) {
                    continue;
                }
                flipped
            };
            self.push_face(face);
        }
    }

    /// No vertex of the hull may lie in front of an outward face.
    fn is_outward(&self, face: &Face) -> bool {
        let anchor = self.vertices[face.indices[0]].point;
        self.vertices.iter().enumerate().all(|(index, vertex)| {
            face.indices.contains(&index)
                || face.normal.dot(vertex.point - anchor) <= ORIENTATION_EPSILON
        })
    }

    fn push_face(&mut self, face: Face) {
        let is_closer = self
            .closest_face()
            .map_or(true, |current| face.distance_sq < current.distance_sq);
        self.faces.push(face);
        if is_closer {
            self.closest = Some(self.faces.len() - 1);
        }
    }

    #[cfg(test)]
    fn faces_sharing_edge(&self, a: usize, b: usize) -> usize {
        self.faces.iter().filter(|face| face.has_edge(a, b)).count()
    }
}

/// Adds `(u, v)` to the edge list unless it is already present in either
/// direction, in which case the shared edge is dropped.
fn toggle_edge(edges: &mut Vec<(usize, usize)>, u: usize, v: usize) {
    if let Some(existing) = edges
        .iter()
        .position(|&(a, b)| (a == v && b == u) || (a == u && b == v))
    {
        edges.swap_remove(existing);
    } else {
        edges.push((u, v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tetrahedron() -> Simplex {
        let mut simplex = Simplex::new();
        for point in [
            Vec3::new(3.0, -3.0, -1.0),
            Vec3::new(-3.0, -3.0, -1.0),
            Vec3::new(0.0, 4.0, -1.0),
            Vec3::new(0.0, 0.0, 3.0),
        ] {
            simplex.push_front(SupportPoint::new(point, point));
        }
        simplex
    }

    #[test]
    fn initial_faces_point_away_from_opposite_vertex() {
        let polytope = Polytope::from_simplex(&tetrahedron()).expect("tetrahedron");
        assert_eq!(polytope.faces().len(), 4);

        for face in polytope.faces() {
            let anchor = polytope.vertices()[face.indices[0]].point;
            let opposite = (0..4)
                .find(|index| !face.indices.contains(index))
                .expect("one vertex off the face");
            let to_opposite = polytope.vertices()[opposite].point - anchor;
            assert!(face.normal.dot(to_opposite) < 0.0, "face {face:?} points inward");
            assert_relative_eq!(face.normal.length(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn closest_face_cache_names_the_minimum() {
        let polytope = Polytope::from_simplex(&tetrahedron()).expect("tetrahedron");
        let cached = polytope.closest_face().expect("non-empty");
        let min = polytope
            .faces()
            .iter()
            .map(|face| face.distance_sq)
            .fold(f32::MAX, f32::min);
        assert_eq!(cached.distance_sq, min);
        // the z = -1 base is nearest the origin
        assert_relative_eq!(cached.distance_sq, 1.0, epsilon = 1e-5);
        assert_relative_eq!(cached.closest_point.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn expanding_keeps_the_hull_closed() {
        let mut polytope = Polytope::from_simplex(&tetrahedron()).expect("tetrahedron");
        let outside = Vec3::new(0.0, 0.5, -3.0);
        assert!(polytope.expand(SupportPoint::new(outside, Vec3::NEG_Z)));

        assert_eq!(polytope.vertices().len(), 5);
        assert_eq!(polytope.faces().len(), 6);
        let new_index = 4;
        for face in polytope.faces() {
            let [a, b, c] = face.indices;
            for (u, v) in [(a, b), (b, c), (c, a)] {
                assert_eq!(polytope.faces_sharing_edge(u, v), 2, "edge ({u},{v}) is open");
            }
        }
        assert!(polytope
            .faces()
            .iter()
            .any(|face| face.indices.contains(&new_index)));
    }

    #[test]
    fn point_inside_the_hull_sees_no_faces() {
        let mut polytope = Polytope::from_simplex(&tetrahedron()).expect("tetrahedron");
        let before = polytope.faces().len();
        assert!(!polytope.expand(SupportPoint::new(Vec3::new(0.0, 0.5, 0.0), Vec3::Y)));
        assert_eq!(polytope.faces().len(), before);
        assert!(polytope.contains_vertex(Vec3::new(3.0, -3.0, -1.0)));
    }

    #[test]
    fn from_simplex_requires_four_points() {
        let mut simplex = Simplex::new();
        simplex.push_front(SupportPoint::new(Vec3::X, Vec3::X));
        assert!(Polytope::from_simplex(&simplex).is_none());
    }
}
