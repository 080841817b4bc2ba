use log::debug;

use super::narrowphase::NarrowPhase;
use crate::{
    config::PhysicsConfig,
    core::scene::Scene,
    error::Result,
    utils::allocator::ObjectId,
};

/// One collider's extent along the sweep axis.
///
/// `min_x` is the sort key: the x coordinate of the collider's support point
/// along -X. `has_body` is refreshed on every [`SweepAndPrune::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepEdge {
    pub object: ObjectId,
    pub min_x: f32,
    pub max_x: f32,
    pub has_body: bool,
}

impl SweepEdge {
    fn new(object: ObjectId) -> Self {
        Self {
            object,
            min_x: 0.0,
            max_x: 0.0,
            has_body: false,
        }
    }
}

/// Intersecting pair reported by the sweep. `first` precedes `second` in sweep order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    pub first: ObjectId,
    pub second: ObjectId,
}

impl CandidatePair {
    pub fn involves(&self, id: ObjectId) -> bool {
        self.first == id || self.second == id
    }

    /// Order-independent key.
    pub fn key(&self) -> (ObjectId, ObjectId) {
        if self.first <= self.second {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        }
    }
}

/// Single-axis sweep and prune over every collider in the world.
///
/// Each edge scans forward through the x-sorted list until the next edge starts
/// beyond its right extent. Survivors are filtered by the Y/Z bounds and then
/// confirmed with a narrow-phase intersection test.
#[derive(Debug)]
pub struct SweepAndPrune {
    edges: Vec<SweepEdge>,
    parallel: bool,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Default for SweepAndPrune {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl SweepAndPrune {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            edges: Vec::new(),
            parallel: config.parallel_sweep,
            #[cfg(feature = "parallel")]
            pool: build_pool(config.sweep_workers),
        }
    }

    pub fn sequential() -> Self {
        Self {
            edges: Vec::new(),
            parallel: false,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Whether candidate scans actually run on the worker pool.
    pub fn is_parallel(&self) -> bool {
        #[cfg(feature = "parallel")]
        {
            self.parallel && self.pool.is_some()
        }
        #[cfg(not(feature = "parallel"))]
        {
            false
        }
    }

    pub fn set_parallel(&mut self, enabled: bool) {
        self.parallel = enabled;
    }

    /// Registers a collider. Its extent is filled in by the next update.
    pub fn insert(&mut self, object: ObjectId) {
        if !self.contains(object) {
            self.edges.push(SweepEdge::new(object));
        }
    }

    pub fn remove(&mut self, object: ObjectId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|edge| edge.object != object);
        before != self.edges.len()
    }

    pub fn contains(&self, object: ObjectId) -> bool {
        self.edges.iter().any(|edge| edge.object == object)
    }

    pub fn edges(&self) -> &[SweepEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Refreshes every edge from the current world transforms and re-sorts.
    ///
    /// Ties on `min_x` are broken by object id so a world that did not move
    /// produces the same order on every call.
    pub fn update(&mut self, scene: &Scene) -> Result<()> {
        for edge in &mut self.edges {
            let view = scene.collider_view(edge.object)?;
            let bounds = view.cached_bounding_box();
            edge.min_x = bounds.min.x;
            edge.max_x = bounds.max.x;
            edge.has_body = scene.object(edge.object)?.has_rigidbody();
        }

        self.edges.sort_by(|lhs, rhs| {
            lhs.min_x
                .total_cmp(&rhs.min_x)
                .then_with(|| lhs.object.cmp(&rhs.object))
        });
        Ok(())
    }

    /// Intersecting pairs in sweep order. Expects a preceding [`update`](Self::update).
    pub fn candidate_pairs(&self, scene: &Scene) -> Result<Vec<CandidatePair>> {
        let per_edge: Vec<Vec<CandidatePair>> = if self.is_parallel() {
            self.scan_parallel(scene)?
        } else {
            (0..self.edges.len())
                .map(|index| self.scan_edge(scene, index))
                .collect::<Result<_>>()?
        };

        let pairs: Vec<CandidatePair> = per_edge.into_iter().flatten().collect();
        debug!("sweep: {} edges, {} pairs", self.edges.len(), pairs.len());
        Ok(pairs)
    }

    /// All pairs involving `object`, in sweep order.
    pub fn collisions_of(&self, scene: &Scene, object: ObjectId) -> Result<Vec<ObjectId>> {
        Ok(self
            .candidate_pairs(scene)?
            .into_iter()
            .filter_map(|pair| match pair {
                CandidatePair { first, second } if first == object => Some(second),
                CandidatePair { first, second } if second == object => Some(first),
                _ => None,
            })
            .collect())
    }

    #[cfg(feature = "parallel")]
    fn scan_parallel(&self, scene: &Scene) -> Result<Vec<Vec<CandidatePair>>> {
        use rayon::prelude::*;

        match &self.pool {
            Some(pool) => pool.install(|| {
                (0..self.edges.len())
                    .into_par_iter()
                    .map(|index| self.scan_edge(scene, index))
                    .collect::<Result<Vec<_>>>()
            }),
            None => (0..self.edges.len())
                .map(|index| self.scan_edge(scene, index))
                .collect(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn scan_parallel(&self, scene: &Scene) -> Result<Vec<Vec<CandidatePair>>> {
        (0..self.edges.len())
            .map(|index| self.scan_edge(scene, index))
            .collect()
    }

    /// Pairs between edge `index` and the edges after it that overlap it on X.
    fn scan_edge(&self, scene: &Scene, index: usize) -> Result<Vec<CandidatePair>> {
        let edge = &self.edges[index];
        let mut pairs = Vec::new();
        let mut view = None;

        for other in &self.edges[index + 1..] {
            if other.min_x > edge.max_x {
                break;
            }
            if !edge.has_body && !other.has_body {
                continue;
            }
            if scene.are_related(edge.object, other.object) {
                continue;
            }

            let this = match view {
                Some(this) => this,
                None => *view.insert(scene.collider_view(edge.object)?),
            };
            let that = scene.collider_view(other.object)?;
            if !this
                .cached_bounding_box()
                .overlaps_yz(&that.cached_bounding_box())
            {
                continue;
            }
            if NarrowPhase::intersects(&this, &that) {
                pairs.push(CandidatePair {
                    first: edge.object,
                    second: other.object,
                });
            }
        }

        Ok(pairs)
    }
}

#[cfg(feature = "parallel")]
fn build_pool(workers: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|index| format!("sweep-{index}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            log::warn!("sweep worker pool unavailable, scanning sequentially: {err}");
            None
        }
    }
}
