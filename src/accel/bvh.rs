// Copyright @yucwang 2026

use super::{BuildOptions, BuildStats, SplitMethod};

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, FLOAT_MAX};
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

const SAH_BUCKETS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    /// Primitives `indices[start..end]`.
    Leaf { start: usize, end: usize },
    Interior { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BVHNode {
    pub bounds: AABB,
    pub kind: NodeKind,
}

impl BVHNode {
    fn leaf(bounds: AABB, start: usize, end: usize) -> Self {
        Self { bounds, kind: NodeKind::Leaf { start, end } }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }
}

/// Binary BVH over primitive bounds. Intersection is delegated to callbacks,
/// so the tree never holds the primitives themselves.
///
/// Nodes live in an arena pre-sized to `2N - 1`; ids come from `nodes_used`
/// and children always get larger ids than their parent. Node 0 is the root.
pub struct BVH {
    nodes: Vec<BVHNode>,
    indices: Vec<usize>,
    nodes_used: usize,
    depth: usize,
}

impl BVH {
    pub fn build(primitives: &[Triangle], options: &BuildOptions) -> Self {
        let prim_bounds: Vec<AABB> = primitives.iter().map(|p| p.bounding_box()).collect();
        let prim_centroids: Vec<Vector3f> = primitives.iter().map(|p| p.centroid()).collect();
        Self::from_bounds(&prim_bounds, &prim_centroids, options)
    }

    pub fn from_bounds(prim_bounds: &[AABB], prim_centroids: &[Vector3f], options: &BuildOptions) -> Self {
        let count = prim_bounds.len().min(prim_centroids.len());
        let mut bvh = Self { nodes: Vec::new(), indices: (0..count).collect(), nodes_used: 0, depth: 0 };
        if count == 0 {
            return bvh;
        }

        let max_leaf_size = options.max_leaf_size.max(1);
        bvh.nodes = vec![BVHNode::leaf(AABB::default(), 0, 0); 2 * count - 1];
        bvh.nodes_used = 1;

        // (node id, range start, range end, depth)
        let mut pending = vec![(0usize, 0usize, count, 0usize)];
        while let Some((node_idx, start, end, depth)) = pending.pop() {
            bvh.depth = bvh.depth.max(depth);
            let bounds = range_bounds(&bvh.indices[start..end], prim_bounds);
            bvh.nodes[node_idx] = BVHNode::leaf(bounds, start, end);
            if end - start <= max_leaf_size {
                continue;
            }

            let split = match options.split_method {
                SplitMethod::Midpoint => Some(midpoint_split(&bounds)),
                SplitMethod::BinnedSah => sah_split(&bvh.indices[start..end], prim_bounds, prim_centroids, &bounds),
            };
            let (axis, split_pos) = match split {
                Some(split) => split,
                None => continue,
            };

            let mid = start + partition(&mut bvh.indices[start..end], prim_centroids, axis, split_pos);
            if mid == start || mid == end {
                // Everything landed on one side: keep a larger leaf.
                continue;
            }

            let left = bvh.nodes_used;
            let right = left + 1;
            bvh.nodes_used += 2;
            bvh.nodes[node_idx].kind = NodeKind::Interior { left, right };
            pending.push((right, mid, end, depth + 1));
            pending.push((left, start, mid, depth + 1));
        }

        bvh.nodes.truncate(bvh.nodes_used);
        log::debug!("bvh: {} primitives, {} nodes, depth {}", count, bvh.nodes_used, bvh.depth);
        bvh
    }

    pub fn nodes(&self) -> &[BVHNode] {
        &self.nodes
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn nodes_used(&self) -> usize {
        self.nodes_used
    }

    pub fn root(&self) -> Option<usize> {
        if self.nodes.is_empty() { None } else { Some(0) }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            nodes: self.nodes_used,
            leaves: self.nodes.iter().filter(|n| n.is_leaf()).count(),
            depth: self.depth,
        }
    }

    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        let root = self.root()?;

        // The segment shrinks with every closer hit so farther boxes get culled.
        let mut segment = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut stack = vec![root];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(&segment) {
                continue;
            }

            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for &prim_idx in &self.indices[start..end] {
                        if let Some((hit, t)) = hit_fn(prim_idx, &segment) {
                            if segment.shrink_to(t) {
                                closest = Some((prim_idx, hit));
                            }
                        }
                    }
                }
                NodeKind::Interior { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        closest
    }
}

pub(crate) fn range_bounds(indices: &[usize], prim_bounds: &[AABB]) -> AABB {
    let mut bounds = AABB::default();
    for &idx in indices {
        bounds.expand_by_aabb(&prim_bounds[idx]);
    }
    bounds
}

fn midpoint_split(bounds: &AABB) -> (usize, Float) {
    let axis = bounds.max_extent();
    (axis, 0.5 * (bounds.p_min[axis] + bounds.p_max[axis]))
}

/// Split position at the cheapest bucket boundary along the widest centroid axis.
/// Returns `None` when all centroids coincide.
fn sah_split(indices: &[usize],
             prim_bounds: &[AABB],
             prim_centroids: &[Vector3f],
             bounds: &AABB) -> Option<(usize, Float)> {
    let mut centroid_bounds = AABB::default();
    for &idx in indices {
        centroid_bounds.expand_by_point(&prim_centroids[idx]);
    }

    let axis = centroid_bounds.max_extent();
    let axis_min = centroid_bounds.p_min[axis];
    let extent = centroid_bounds.p_max[axis] - axis_min;
    if extent.abs() < 1e-6 {
        return None;
    }

    let mut buckets = [(0usize, AABB::default()); SAH_BUCKETS];
    for &idx in indices {
        let c = prim_centroids[idx][axis];
        let b = (((c - axis_min) / extent * SAH_BUCKETS as Float) as usize).min(SAH_BUCKETS - 1);
        buckets[b].0 += 1;
        buckets[b].1.expand_by_aabb(&prim_bounds[idx]);
    }

    let area = bounds.surface_area().max(1e-6);
    let mut min_cost = FLOAT_MAX;
    let mut min_split = 0usize;
    for i in 0..(SAH_BUCKETS - 1) {
        let mut b0 = AABB::default();
        let mut b1 = AABB::default();
        let mut count0 = 0usize;
        let mut count1 = 0usize;
        for (count, bucket_bounds) in &buckets[..=i] {
            count0 += count;
            b0.expand_by_aabb(bucket_bounds);
        }
        for (count, bucket_bounds) in &buckets[(i + 1)..] {
            count1 += count;
            b1.expand_by_aabb(bucket_bounds);
        }
        let cost0 = if count0 > 0 { count0 as Float * b0.surface_area() } else { 0.0 };
        let cost1 = if count1 > 0 { count1 as Float * b1.surface_area() } else { 0.0 };
        let cost = 1.0 + (cost0 + cost1) / area;
        if cost < min_cost {
            min_cost = cost;
            min_split = i;
        }
    }

    Some((axis, axis_min + (min_split + 1) as Float * extent / SAH_BUCKETS as Float))
}

/// Two-pointer partition: centroids below `split_pos` end up in front.
/// Returns the number of primitives on the left.
fn partition(indices: &mut [usize], prim_centroids: &[Vector3f], axis: usize, split_pos: Float) -> usize {
    let mut i = 0;
    let mut j = indices.len();
    while i < j {
        if prim_centroids[indices[i]][axis] < split_pos {
            i += 1;
        } else {
            j -= 1;
            indices.swap(i, j);
        }
    }
    i
}
