// Copyright @yucwang 2026

use super::path::PathSegment;

use crate::core::interaction::ShadeableIntersection;

use rayon::prelude::*;

/// Stable partition into `(kept, removed)`; both halves keep input order.
pub fn stable_partition<T, F>(items: Vec<T>, keep: F) -> (Vec<T>, Vec<T>)
where
    T: Send,
    F: Fn(&T) -> bool + Sync + Send,
{
    items.into_par_iter().partition(keep)
}

/// Splits the pool into still-active paths and finished ones, whose
/// radiance is ready to be gathered into the image.
pub fn compact_paths(paths: Vec<PathSegment>) -> (Vec<PathSegment>, Vec<PathSegment>) {
    stable_partition(paths, PathSegment::is_active)
}

/// Stable reorder of (path, hit) pairs by material id so lanes sharing a
/// material shade together. Misses go last.
pub fn sort_by_material(pairs: &mut [(PathSegment, Option<ShadeableIntersection>)]) {
    pairs.par_sort_by_key(|(_, hit)| hit.map_or(usize::MAX, |h| h.material_id));
}
