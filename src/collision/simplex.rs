use glam::Vec3;

/// Minkowski-difference vertex together with the direction that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SupportPoint {
    pub point: Vec3,
    pub direction: Vec3,
}

impl SupportPoint {
    pub fn new(point: Vec3, direction: Vec3) -> Self {
        Self { point, direction }
    }
}

/// Working simplex of GJK: up to four support points, newest first.
#[derive(Debug, Clone, Default)]
pub struct Simplex {
    points: [SupportPoint; 4],
    len: usize,
}

impl Simplex {
    pub const CAPACITY: usize = 4;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn points(&self) -> &[SupportPoint] {
        &self.points[..self.len]
    }

    pub fn get(&self, index: usize) -> Option<&SupportPoint> {
        self.points().get(index)
    }

    /// Position of vertex `index`; callers guarantee `index < len`.
    pub(crate) fn at(&self, index: usize) -> Vec3 {
        debug_assert!(index < self.len, "simplex index {index} out of {}", self.len);
        self.points[index].point
    }

    /// Inserts at index 0, shifting the rest back. A full simplex drops its oldest point.
    pub fn push_front(&mut self, point: SupportPoint) {
        let keep = self.len.min(Self::CAPACITY - 1);
        self.points.copy_within(0..keep, 1);
        self.points[0] = point;
        self.len = keep + 1;
    }

    /// Removes `index`, preserving the order of the remaining points.
    ///
    /// Out-of-range indices leave the simplex unchanged.
    pub fn remove(&mut self, index: usize) -> Option<SupportPoint> {
        if index >= self.len {
            return None;
        }
        let removed = self.points[index];
        self.points.copy_within(index + 1..self.len, index);
        self.len -= 1;
        Some(removed)
    }

    /// Swaps two live points; used to keep triangle winding toward the origin.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a < self.len && b < self.len {
            self.points.swap(a, b);
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sp(x: f32) -> SupportPoint {
        SupportPoint::new(Vec3::splat(x), Vec3::X)
    }

    #[test]
    fn newest_point_is_index_zero() {
        let mut simplex = Simplex::new();
        simplex.push_front(sp(1.0));
        simplex.push_front(sp(2.0));
        simplex.push_front(sp(3.0));
        let xs: Vec<f32> = simplex.points().iter().map(|p| p.point.x).collect();
        assert_eq!(xs, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn removal_preserves_relative_order() {
        let mut simplex = Simplex::new();
        for x in [1.0, 2.0, 3.0, 4.0] {
            simplex.push_front(sp(x));
        }
        assert_eq!(simplex.remove(1).map(|p| p.point.x), Some(3.0));
        let xs: Vec<f32> = simplex.points().iter().map(|p| p.point.x).collect();
        assert_eq!(xs, vec![4.0, 2.0, 1.0]);
        assert!(simplex.remove(3).is_none());
        assert_eq!(simplex.len(), 3);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let mut simplex = Simplex::new();
        for x in 0..6 {
            simplex.push_front(sp(x as f32));
        }
        assert_eq!(simplex.len(), Simplex::CAPACITY);
        assert_eq!(simplex.at(0).x, 5.0);
        assert_eq!(simplex.at(3).x, 2.0);
    }
}
