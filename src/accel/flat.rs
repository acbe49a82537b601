// Copyright @yucwang 2026

use super::bvh::{NodeKind, BVH};
use super::BuildStats;

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f};
use crate::math::ray::Ray3f;

const ORDERINGS: usize = 6;

/// Entry of a threaded BVH. The hit link is always the next entry; `miss`
/// skips the whole subtree. Interior entries have `start == end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatNode {
    pub bounds: AABB,
    pub start: u32,
    pub end: u32,
    pub miss: u32,
}

impl FlatNode {
    pub fn is_leaf(&self) -> bool {
        self.end > self.start
    }
}

/// Stackless BVH: one depth-first ordering per signed axis
/// (+X, -X, +Y, -Y, +Z, -Z), so a ray walks the children nearer to its
/// origin first. A cursor equal to the ordering length ends the walk.
pub struct FlatBVH {
    orderings: [Vec<FlatNode>; ORDERINGS],
    indices: Vec<usize>,
    depth: usize,
}

impl FlatBVH {
    pub fn from_bvh(bvh: &BVH) -> Self {
        let subtree_sizes = subtree_sizes(bvh);
        let orderings: [Vec<FlatNode>; ORDERINGS] = std::array::from_fn(|ordering| {
            linearize(bvh, &subtree_sizes, ordering / 2, ordering % 2 == 0)
        });

        Self { orderings, indices: bvh.indices().to_vec(), depth: bvh.stats().depth }
    }

    /// Ordering index for a direction: dominant axis, then its sign.
    pub fn ordering_for(dir: &Vector3f) -> usize {
        let abs = dir.abs();
        let axis = if abs.x >= abs.y && abs.x >= abs.z {
            0
        } else if abs.y >= abs.z {
            1
        } else {
            2
        };
        axis * 2 + if dir[axis] >= 0.0 { 0 } else { 1 }
    }

    pub fn ordering(&self, idx: usize) -> &[FlatNode] {
        &self.orderings[idx]
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.orderings[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.orderings[0].is_empty()
    }

    pub fn stats(&self) -> BuildStats {
        BuildStats {
            nodes: self.len(),
            leaves: self.orderings[0].iter().filter(|n| n.is_leaf()).count(),
            depth: self.depth,
        }
    }

    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize, &Ray3f) -> Option<(T, Float)>,
    {
        let nodes = &self.orderings[Self::ordering_for(&ray.dir())];
        let mut segment = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut cursor = 0usize;

        while cursor < nodes.len() {
            let node = &nodes[cursor];
            if !node.bounds.ray_intersect(&segment) {
                cursor = node.miss as usize;
                continue;
            }

            if node.is_leaf() {
                for &prim_idx in &self.indices[node.start as usize..node.end as usize] {
                    if let Some((hit, t)) = hit_fn(prim_idx, &segment) {
                        if segment.shrink_to(t) {
                            closest = Some((prim_idx, hit));
                        }
                    }
                }
            }
            cursor += 1;
        }

        closest
    }
}

// Child ids are always larger than the parent's, so one reverse sweep suffices.
fn subtree_sizes(bvh: &BVH) -> Vec<usize> {
    let nodes = bvh.nodes();
    let mut sizes = vec![1usize; nodes.len()];
    for idx in (0..nodes.len()).rev() {
        if let NodeKind::Interior { left, right } = nodes[idx].kind {
            sizes[idx] = 1 + sizes[left] + sizes[right];
        }
    }
    sizes
}

fn linearize(bvh: &BVH, subtree_sizes: &[usize], axis: usize, positive: bool) -> Vec<FlatNode> {
    let nodes = bvh.nodes();
    let mut flat = Vec::with_capacity(nodes.len());
    let mut stack = match bvh.root() {
        Some(root) => vec![root],
        None => return flat,
    };

    while let Some(node_idx) = stack.pop() {
        let node = &nodes[node_idx];
        let miss = (flat.len() + subtree_sizes[node_idx]) as u32;
        match node.kind {
            NodeKind::Leaf { start, end } => {
                flat.push(FlatNode { bounds: node.bounds, start: start as u32, end: end as u32, miss });
            }
            NodeKind::Interior { left, right } => {
                flat.push(FlatNode { bounds: node.bounds, start: 0, end: 0, miss });
                let left_first = nodes[left].bounds.center()[axis] <= nodes[right].bounds.center()[axis];
                let (first, second) = if left_first == positive { (left, right) } else { (right, left) };
                stack.push(second);
                stack.push(first);
            }
        }
    }

    flat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::tests::{naive_closest, random_rays, random_triangles};
    use crate::accel::BuildOptions;

    #[test]
    fn test_threading_links() {
        let triangles = random_triangles(128, 21);
        let bvh = BVH::build(&triangles, &BuildOptions::default());
        let flat = FlatBVH::from_bvh(&bvh);
        assert_eq!(flat.len(), bvh.nodes_used());

        for ordering in 0..6 {
            let nodes = flat.ordering(ordering);
            assert_eq!(nodes[0].miss as usize, nodes.len());
            let mut covered = 0usize;
            for (idx, node) in nodes.iter().enumerate() {
                assert!(node.miss as usize > idx);
                assert!(node.miss as usize <= nodes.len());
                if node.is_leaf() {
                    assert_eq!(node.miss as usize, idx + 1);
                    covered += (node.end - node.start) as usize;
                } else {
                    // A subtree's entries are contained in its parent box.
                    for child in &nodes[idx + 1..node.miss as usize] {
                        assert!(node.bounds.contains_aabb(&child.bounds));
                    }
                }
            }
            assert_eq!(covered, triangles.len());
        }
    }

    #[test]
    fn test_orderings_visit_near_child_first() {
        let triangles = random_triangles(64, 22);
        let bvh = BVH::build(&triangles, &BuildOptions::default());
        let flat = FlatBVH::from_bvh(&bvh);
        for ordering in 0..6 {
            let axis = ordering / 2;
            let nodes = flat.ordering(ordering);
            for (idx, node) in nodes.iter().enumerate() {
                if node.is_leaf() {
                    continue;
                }
                let first = &nodes[idx + 1];
                let second = &nodes[first.miss as usize];
                let (a, b) = (first.bounds.center()[axis], second.bounds.center()[axis]);
                if ordering % 2 == 0 {
                    assert!(a <= b);
                } else {
                    assert!(a >= b);
                }
            }
        }
    }

    #[test]
    fn test_ordering_for_direction() {
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(1.0, 0.2, -0.3)), 0);
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(-1.0, 0.2, -0.3)), 1);
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(0.1, 0.9, -0.3)), 2);
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(0.1, -0.9, -0.3)), 3);
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(0.1, 0.2, 0.7)), 4);
        assert_eq!(FlatBVH::ordering_for(&Vector3f::new(0.1, 0.2, -0.7)), 5);
    }

    #[test]
    fn test_flat_matches_stack_traversal() {
        let triangles = random_triangles(250, 23);
        let bvh = BVH::build(&triangles, &BuildOptions::default());
        let flat = FlatBVH::from_bvh(&bvh);
        for ray in random_rays(300, 24) {
            let from_flat = flat.ray_intersection(&ray, |prim_idx, ray| {
                triangles[prim_idx].ray_intersection(ray).map(|h| (h.t, h.t))
            });
            let from_stack = bvh.ray_intersection(&ray, |prim_idx, ray| {
                triangles[prim_idx].ray_intersection(ray).map(|h| (h.t, h.t))
            });
            let expected = naive_closest(&triangles, &ray);
            assert_eq!(from_flat.is_some(), expected.is_some());
            assert_eq!(from_flat.is_some(), from_stack.is_some());
            if let (Some((_, a)), Some((_, b))) = (from_flat, expected) {
                assert!((a - b).abs() < 1e-4);
            }
        }
    }
}
