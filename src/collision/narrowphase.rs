use glam::Vec3;
use log::trace;

use super::{
    polytope::{Face, Polytope},
    simplex::{Simplex, SupportPoint},
    support::SupportShape,
};
use crate::{
    config::{EPA_MAX_ITERATIONS, EPA_TOLERANCE, GJK_MAX_ITERATIONS},
    utils::math::{
        any_perpendicular, barycentric, clamp_barycentric, is_near_zero, same_direction,
        triple_cross,
    },
};

/// Result of an exact pair test.
///
/// `mtv` is the translation that, applied to the first shape, separates it from
/// the second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub mtv: Vec3,
    /// World-space collision point, when it was requested.
    pub point: Option<Vec3>,
}

impl Penetration {
    pub fn depth(&self) -> f32 {
        self.mtv.length()
    }

    /// Unit direction the first shape is pushed along.
    pub fn normal(&self) -> Vec3 {
        self.mtv.normalize_or_zero()
    }
}

fn minkowski_support<A, B>(a: &A, b: &B, direction: Vec3) -> SupportPoint
where
    A: SupportShape + ?Sized,
    B: SupportShape + ?Sized,
{
    let point = a.furthest_point(direction) - b.furthest_point(-direction);
    SupportPoint::new(point, direction)
}

/// Gilbert-Johnson-Keerthi intersection test on the Minkowski difference `a - b`.
pub struct GJKAlgorithm;

impl GJKAlgorithm {
    /// Returns the enclosing tetrahedron when the shapes intersect.
    pub fn enclose_origin<A, B>(a: &A, b: &B) -> Option<Simplex>
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        let mut simplex = Simplex::new();
        let first = minkowski_support(a, b, Vec3::X);
        simplex.push_front(first);

        let mut direction = -first.point;
        if is_near_zero(direction) {
            direction = Vec3::NEG_X;
        }

        for _ in 0..GJK_MAX_ITERATIONS {
            let support = minkowski_support(a, b, direction);
            if support.point.dot(direction) < 0.0 {
                return None;
            }

            simplex.push_front(support);
            if Self::next_simplex(&mut simplex, &mut direction) {
                return Some(simplex);
            }
        }

        trace!("GJK hit its iteration cap; treating pair as separated");
        None
    }

    /// Reduces the simplex to the feature nearest the origin and picks the next
    /// search direction. Returns `true` once a tetrahedron encloses the origin.
    fn next_simplex(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
        match simplex.len() {
            2 => {
                Self::line(simplex, direction);
                false
            }
            3 => {
                Self::triangle(simplex, direction);
                false
            }
            4 => Self::tetrahedron(simplex, direction),
            _ => false,
        }
    }

    fn line(simplex: &Simplex, direction: &mut Vec3) {
        let a = simplex.at(0);
        let b = simplex.at(1);
        let ab = b - a;
        let ao = -a;

        let perpendicular = triple_cross(ab, ao, ab);
        *direction = if is_near_zero(perpendicular) {
            any_perpendicular(ab)
        } else {
            perpendicular
        };
    }

    fn triangle(simplex: &mut Simplex, direction: &mut Vec3) {
        let a = simplex.at(0);
        let b = simplex.at(1);
        let c = simplex.at(2);
        let ab = b - a;
        let ac = c - a;
        let ao = -a;
        let abc = ab.cross(ac);

        if is_near_zero(abc) {
            // collinear: keep the newest edge and search off its line
            simplex.remove(2);
            *direction = any_perpendicular(ab);
            return;
        }

        if same_direction(abc.cross(ac), ao) {
            simplex.remove(1);
            let perpendicular = triple_cross(ac, ao, ac);
            *direction = if is_near_zero(perpendicular) {
                any_perpendicular(ac)
            } else {
                perpendicular
            };
        } else if same_direction(ab.cross(abc), ao) {
            simplex.remove(2);
            let perpendicular = triple_cross(ab, ao, ab);
            *direction = if is_near_zero(perpendicular) {
                any_perpendicular(ab)
            } else {
                perpendicular
            };
        } else if same_direction(abc, ao) {
            *direction = abc;
        } else {
            simplex.swap(1, 2);
            *direction = -abc;
        }
    }

    fn tetrahedron(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
        let a = simplex.at(0);
        let b = simplex.at(1);
        let c = simplex.at(2);
        let d = simplex.at(3);
        let ao = -a;

        let volume = (b - a).dot((c - a).cross(d - a));
        if volume.abs() < f32::EPSILON {
            // flat tetrahedron: the newest point added no volume
            simplex.remove(0);
            *direction = -*direction;
            return false;
        }

        // (face normal, vertex opposite the face, simplex index to drop)
        let faces = [
            ((b - a).cross(c - a), d, 3),
            ((c - a).cross(d - a), b, 1),
            ((d - a).cross(b - a), c, 2),
        ];

        for (normal, opposite, drop) in faces {
            let outward = if same_direction(normal, opposite - a) {
                -normal
            } else {
                normal
            };
            if same_direction(outward, ao) {
                simplex.remove(drop);
                *direction = outward;
                return false;
            }
        }

        true
    }
}

/// Penetration refinement of an enclosing GJK tetrahedron.
#[derive(Debug, Clone, Copy)]
pub struct EpaResult {
    pub mtv: Vec3,
    pub face: Face,
    pub face_vertices: [SupportPoint; 3],
    pub iterations: usize,
    pub converged: bool,
}

/// Expanding Polytope Algorithm.
pub struct EPAAlgorithm;

impl EPAAlgorithm {
    /// Grows the polytope toward the Minkowski boundary nearest the origin.
    ///
    /// Returns `None` when the best translation is exactly zero (no resolvable
    /// penetration) or the tetrahedron was fully degenerate.
    pub fn penetration<A, B>(a: &A, b: &B, simplex: &Simplex) -> Option<EpaResult>
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        let mut polytope = Polytope::from_simplex(simplex)?;
        let mut best = nearest(&polytope)?;
        let mut previous: Option<(f32, Vec3)> = None;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < EPA_MAX_ITERATIONS {
            iterations += 1;
            best = nearest_or(&polytope, best);
            let (face, _) = best;
            let distance = face.distance_sq.sqrt();
            let point = face.closest_point;

            if let Some((previous_distance, previous_point)) = previous {
                let stable = (distance - previous_distance).abs() < EPA_TOLERANCE
                    && (point - previous_point).abs().max_element() < EPA_TOLERANCE;
                if stable && !is_near_zero(point) {
                    converged = true;
                    break;
                }
            }
            previous = Some((distance, point));

            let direction = if is_near_zero(point) {
                face.normal
            } else {
                point
            };
            let support = minkowski_support(a, b, direction);

            if polytope.contains_vertex(support.point)
                || support.point.dot(face.normal) - distance < EPA_TOLERANCE
            {
                converged = true;
                break;
            }

            if !polytope.expand(support) {
                converged = true;
                break;
            }
        }

        if !converged {
            trace!("EPA stopped after {iterations} iterations without converging");
        }

        let (face, face_vertices) = nearest_or(&polytope, best);
        let mtv = -face.closest_point;
        if mtv == Vec3::ZERO {
            return None;
        }

        Some(EpaResult {
            mtv,
            face,
            face_vertices,
            iterations,
            converged,
        })
    }
}

/// The polytope's nearest face together with the support points spanning it.
fn nearest(polytope: &Polytope) -> Option<(Face, [SupportPoint; 3])> {
    let face = *polytope.closest_face()?;
    let vertices = polytope.vertices();
    Some((face, face.indices.map(|index| vertices[index])))
}

/// Falls back to the last good face when reconstruction left the hull without one.
fn nearest_or(
    polytope: &Polytope,
    fallback: (Face, [SupportPoint; 3]),
) -> (Face, [SupportPoint; 3]) {
    nearest(polytope).unwrap_or(fallback)
}

/// Exact pair tests dispatched on shape capabilities.
pub struct NarrowPhase;

impl NarrowPhase {
    /// Boolean test; never runs EPA.
    pub fn intersects<A, B>(a: &A, b: &B) -> bool
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        if let (Some(sa), Some(sb)) = (a.as_sphere(), b.as_sphere()) {
            return sa.center.distance(sb.center) < sa.radius + sb.radius;
        }
        GJKAlgorithm::enclose_origin(a, b).is_some()
    }

    /// Minimum translation vector pushing `a` out of `b`.
    pub fn penetration<A, B>(a: &A, b: &B) -> Option<Vec3>
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        Self::query(a, b, false).map(|penetration| penetration.mtv)
    }

    /// Translation vector plus world-space collision point.
    pub fn contact<A, B>(a: &A, b: &B) -> Option<Penetration>
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        Self::query(a, b, true)
    }

    fn query<A, B>(a: &A, b: &B, with_point: bool) -> Option<Penetration>
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        if let (Some(sa), Some(sb)) = (a.as_sphere(), b.as_sphere()) {
            let offset = sa.center - sb.center;
            let distance = offset.length();
            let overlap = sa.radius + sb.radius - distance;
            if overlap <= 0.0 {
                return None;
            }
            let normal = if is_near_zero(offset) {
                Vec3::Y
            } else {
                offset / distance
            };
            return Some(Penetration {
                mtv: normal * overlap,
                point: with_point.then(|| sa.center - normal * sa.radius),
            });
        }

        let simplex = GJKAlgorithm::enclose_origin(a, b)?;
        let result = EPAAlgorithm::penetration(a, b, &simplex)?;
        let point = with_point.then(|| Self::collision_point(a, b, &result));
        Some(Penetration {
            mtv: result.mtv,
            point,
        })
    }

    /// Recovers the world-space point where `a` and `b` touch from the EPA face.
    fn collision_point<A, B>(a: &A, b: &B, result: &EpaResult) -> Vec3
    where
        A: SupportShape + ?Sized,
        B: SupportShape + ?Sized,
    {
        let normal = result.mtv.normalize_or_zero();
        if let Some(sphere) = a.as_sphere() {
            return sphere.center - normal * sphere.radius;
        }
        if let Some(sphere) = b.as_sphere() {
            return sphere.center + normal * sphere.radius;
        }

        let [p0, p1, p2] = result.face_vertices.map(|vertex| vertex.point);
        let on_a = result
            .face_vertices
            .map(|vertex| a.furthest_point(vertex.direction));
        let on_b = result
            .face_vertices
            .map(|vertex| b.furthest_point(-vertex.direction));
        let blend = |points: [Vec3; 3], weights: Vec3| {
            points[0] * weights.x + points[1] * weights.y + points[2] * weights.z
        };

        let weights = barycentric(result.face.closest_point, p0, p1, p2)
            .unwrap_or(Vec3::splat(1.0 / 3.0));
        let limit = a.center().distance(b.center());
        let within = |point: Vec3| limit <= f32::EPSILON || point.distance(a.center()) <= limit;

        let point = blend(on_a, weights);
        if within(point) {
            return point;
        }

        let clamped = clamp_barycentric(weights);
        let point = blend(on_a, clamped);
        if within(point) {
            return point;
        }

        blend(on_b, clamped)
    }
}
