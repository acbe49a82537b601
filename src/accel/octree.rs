// Copyright @yucwang 2026

use super::bvh::range_bounds;
use super::{BuildOptions, BuildStats};

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;
use crate::shapes::triangle::Triangle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeNode {
    pub bounds: AABB,
    pub start: usize,
    pub end: usize,
    /// Indexed by octant code: bit 0 upper x, bit 1 upper y, bit 2 upper z.
    pub children: [Option<u32>; 8],
}

impl OctreeNode {
    fn leaf(bounds: AABB, start: usize, end: usize) -> Self {
        Self { bounds, start, end, children: [None; 8] }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }
}

/// Octree whose primitives each belong to exactly one octant, picked by
/// centroid against the node box center. A node's octant subranges are
/// contiguous slices of its own range, so no primitive is duplicated.
pub struct Octree {
    nodes: Vec<OctreeNode>,
    indices: Vec<usize>,
    nodes_used: usize,
    depth: usize,
}

impl Octree {
    pub fn build(primitives: &[Triangle], options: &BuildOptions) -> Self {
        let prim_bounds: Vec<AABB> = primitives.iter().map(|p| p.bounding_box()).collect();
        let prim_centroids: Vec<Vector3f> = primitives.iter().map(|p| p.centroid()).collect();
        Self::from_bounds(&prim_bounds, &prim_centroids, options)
    }

    pub fn from_bounds(prim_bounds: &[AABB], prim_centroids: &[Vector3f], options: &BuildOptions) -> Self {
        let count = prim_bounds.len().min(prim_centroids.len());
        let mut octree = Self { nodes: Vec::new(), indices: (0..count).collect(), nodes_used: 0, depth: 0 };
        if count == 0 {
            return octree;
        }

        let max_leaf_size = options.max_leaf_size.max(1);
        let max_depth = options.octree_max_depth as usize;
        octree.nodes = vec![OctreeNode::leaf(AABB::default(), 0, 0); node_capacity(count, max_depth)];
        octree.nodes_used = 1;

        let mut scratch = Vec::with_capacity(count);
        let mut pending = vec![(0usize, 0usize, count, 0usize)];
        while let Some((node_idx, start, end, depth)) = pending.pop() {
            octree.depth = octree.depth.max(depth);
            let bounds = range_bounds(&octree.indices[start..end], prim_bounds);
            octree.nodes[node_idx] = OctreeNode::leaf(bounds, start, end);
            if end - start <= max_leaf_size || depth >= max_depth {
                continue;
            }

            let center = bounds.center();
            let code_of = |idx: usize| octant_code(&prim_centroids[idx], &center);
            let mut counts = [0usize; 8];
            for &idx in &octree.indices[start..end] {
                counts[code_of(idx)] += 1;
            }
            if counts.iter().any(|&c| c == end - start) {
                continue;
            }

            // Stable counting sort of the range by octant code.
            let mut offsets = [0usize; 8];
            for code in 1..8 {
                offsets[code] = offsets[code - 1] + counts[code - 1];
            }
            scratch.clear();
            scratch.resize(end - start, 0);
            let mut cursor = offsets;
            for &idx in &octree.indices[start..end] {
                let code = code_of(idx);
                scratch[cursor[code]] = idx;
                cursor[code] += 1;
            }
            octree.indices[start..end].copy_from_slice(&scratch);

            for code in (0..8).filter(|&code| counts[code] > 0) {
                let child = octree.nodes_used;
                octree.nodes_used += 1;
                octree.nodes[node_idx].children[code] = Some(child as u32);
                let child_start = start + offsets[code];
                pending.push((child, child_start, child_start + counts[code], depth + 1));
            }
        }

        octree.nodes.truncate(octree.nodes_used);
        log::debug!("octree: {} primitives, {} nodes, depth {}", count, octree.nodes_used, octree.depth);
        octree
    }

    pub fn nodes(&self) -> &[OctreeNode] {
        &self.nodes
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn nodes_used(&self) -> usize {
        self.nodes_used
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
        if self.nodes.is_empty() {
            return None;
        }

        let mut segment = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.bounds.ray_intersect(&segment) {
                continue;
            }

            if node.is_leaf() {
                for &prim_idx in &self.indices[node.start..node.end] {
                    if let Some((hit, t)) = hit_fn(prim_idx, &segment) {
                        if segment.shrink_to(t) {
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            } else {
                stack.extend(node.children.iter().flatten().map(|&c| c as usize));
            }
        }

        closest
    }
}

fn octant_code(p: &Vector3f, center: &Vector3f) -> usize {
    (0..3).filter(|&axis| p[axis] >= center[axis]).fold(0, |code, axis| code | (1 << axis))
}

/// Every interior node has at least two non-empty octants and every leaf
/// holds at least one primitive, so `2N - 1` bounds the node count; a full
/// tree of `max_depth` levels bounds it too.
fn node_capacity(count: usize, max_depth: usize) -> usize {
    let by_depth = u32::try_from(max_depth + 1)
        .ok()
        .and_then(|levels| 8usize.checked_pow(levels))
        .map(|full| (full - 1) / 7)
        .unwrap_or(usize::MAX);
    (2 * count - 1).min(by_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::tests::{naive_closest, random_rays, random_triangles};

    fn check_node(octree: &Octree, prim_bounds: &[AABB], node_idx: usize, depth: usize, max_depth: usize) {
        let node = &octree.nodes()[node_idx];
        assert!(node.start < node.end);
        assert!(depth <= max_depth);
        for &idx in &octree.indices()[node.start..node.end] {
            assert!(node.bounds.contains_aabb(&prim_bounds[idx]));
        }
        if node.is_leaf() {
            return;
        }

        let mut children: Vec<&OctreeNode> = node.children.iter().flatten().map(|&c| &octree.nodes()[c as usize]).collect();
        assert!(children.len() >= 2);
        children.sort_by_key(|c| c.start);
        assert_eq!(children[0].start, node.start);
        assert_eq!(children[children.len() - 1].end, node.end);
        for pair in children.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for &child in node.children.iter().flatten() {
            assert!(child as usize > node_idx);
            check_node(octree, prim_bounds, child as usize, depth + 1, max_depth);
        }
    }

    #[test]
    fn test_structure_invariants() {
        let triangles = random_triangles(400, 31);
        let prim_bounds: Vec<AABB> = triangles.iter().map(|t| t.bounding_box()).collect();
        for max_depth in [1u32, 3, 8] {
            let options = BuildOptions { octree_max_depth: max_depth, ..BuildOptions::default() };
            let octree = Octree::build(&triangles, &options);
            check_node(&octree, &prim_bounds, 0, 0, max_depth as usize);
            assert!(octree.nodes_used() <= node_capacity(triangles.len(), max_depth as usize));

            // Leaves cover every primitive exactly once.
            let mut seen: Vec<usize> = octree
                .nodes()
                .iter()
                .filter(|n| n.is_leaf())
                .flat_map(|n| octree.indices()[n.start..n.end].iter().copied())
                .collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..triangles.len()).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_depth_zero_is_single_leaf() {
        let triangles = random_triangles(20, 32);
        let options = BuildOptions { octree_max_depth: 0, ..BuildOptions::default() };
        let octree = Octree::build(&triangles, &options);
        assert_eq!(octree.nodes_used(), 1);
        assert!(octree.nodes()[0].is_leaf());
    }

    #[test]
    fn test_single_octant_becomes_leaf() {
        let p0 = Vector3f::new(0.0, 0.0, 0.0);
        let p1 = Vector3f::new(1.0, 0.0, 0.0);
        let p2 = Vector3f::new(0.0, 1.0, 0.0);
        let triangles = vec![Triangle::new(p0, p1, p2, 0); 5];
        let octree = Octree::build(&triangles, &BuildOptions::default());
        assert_eq!(octree.nodes_used(), 1);
        assert_eq!((octree.nodes()[0].start, octree.nodes()[0].end), (0, 5));
    }

    #[test]
    fn test_octant_code_uses_upper_half_inclusive() {
        let center = Vector3f::new(1.0, 1.0, 1.0);
        assert_eq!(octant_code(&Vector3f::new(0.0, 0.0, 0.0), &center), 0);
        assert_eq!(octant_code(&Vector3f::new(1.0, 0.0, 0.0), &center), 1);
        assert_eq!(octant_code(&Vector3f::new(0.0, 2.0, 1.0), &center), 6);
    }

    #[test]
    fn test_octree_vs_naive() {
        let triangles = random_triangles(300, 33);
        let octree = Octree::build(&triangles, &BuildOptions::default());
        for ray in random_rays(300, 34) {
            let expected = naive_closest(&triangles, &ray).map(|(_, t)| t);
            let got = octree
                .ray_intersection(&ray, |prim_idx, ray| {
                    triangles[prim_idx].ray_intersection(ray).map(|h| (h.t, h.t))
                })
                .map(|(_, t)| t);
            assert_eq!(expected.is_some(), got.is_some());
            if let (Some(a), Some(b)) = (expected, got) {
                assert!((a - b).abs() < 1e-4);
            }
        }
    }
}
