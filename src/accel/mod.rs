// Copyright @yucwang 2026

pub mod bvh;
pub mod flat;
pub mod octree;

use clap::ValueEnum;

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

use bvh::BVH;
use flat::FlatBVH;
use octree::Octree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccelKind {
    /// Binary BVH walked with an explicit stack.
    Bvh,
    /// BVH linearized into six direction-specific threaded orderings.
    FlatBvh,
    Octree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SplitMethod {
    /// Midpoint of the widest axis of the node box.
    Midpoint,
    /// Best of 12 centroid buckets by surface area cost.
    BinnedSah,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub max_leaf_size: usize,
    pub split_method: SplitMethod,
    pub octree_max_depth: u32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_leaf_size: 2, split_method: SplitMethod::Midpoint, octree_max_depth: 8 }
    }
}

/// Build summary reported after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

/// One of the acceleration structures, built once and then read-only.
pub enum Accelerator {
    Bvh(BVH),
    FlatBvh(FlatBVH),
    Octree(Octree),
}

impl Accelerator {
    pub fn build(kind: AccelKind, primitives: &[Triangle], options: &BuildOptions) -> Self {
        let prim_bounds: Vec<AABB> = primitives.iter().map(|p| p.bounding_box()).collect();
        let prim_centroids: Vec<Vector3f> = primitives.iter().map(|p| p.centroid()).collect();
        Self::from_bounds(kind, &prim_bounds, &prim_centroids, options)
    }

    pub fn from_bounds(kind: AccelKind,
                       prim_bounds: &[AABB],
                       prim_centroids: &[Vector3f],
                       options: &BuildOptions) -> Self {
        match kind {
            AccelKind::Bvh => Accelerator::Bvh(BVH::from_bounds(prim_bounds, prim_centroids, options)),
            AccelKind::FlatBvh => {
                let bvh = BVH::from_bounds(prim_bounds, prim_centroids, options);
                Accelerator::FlatBvh(FlatBVH::from_bvh(&bvh))
            }
            AccelKind::Octree => Accelerator::Octree(Octree::from_bounds(prim_bounds, prim_centroids, options)),
        }
    }

    pub fn kind(&self) -> AccelKind {
        match self {
            Accelerator::Bvh(_) => AccelKind::Bvh,
            Accelerator::FlatBvh(_) => AccelKind::FlatBvh,
            Accelerator::Octree(_) => AccelKind::Octree,
        }
    }

    pub fn stats(&self) -> BuildStats {
        match self {
            Accelerator::Bvh(bvh) => bvh.stats(),
            Accelerator::FlatBvh(flat) => flat.stats(),
            Accelerator::Octree(octree) => octree.stats(),
        }
    }

    /// Closest primitive reported by `hit_fn`, which returns its payload and hit distance.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        match self {
            Accelerator::Bvh(bvh) => bvh.ray_intersection(ray, hit_fn),
            Accelerator::FlatBvh(flat) => flat.ray_intersection(ray, hit_fn),
            Accelerator::Octree(octree) => octree.ray_intersection(ray, hit_fn),
        }
    }
}
