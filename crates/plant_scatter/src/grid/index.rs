//! Hash-bucket index from points to the cells that may contain them.
//!
//! Every cell is registered in each unit bucket its closed rectangle overlaps,
//! so a lookup only floors the query point and scans a handful of candidates.
use std::collections::HashMap;

use glam::Vec2;

use super::CellBounds;

#[derive(Clone, Debug, Default)]
pub(crate) struct CellIndex {
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl CellIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bucket_of(p: Vec2) -> (i32, i32) {
        (p.x.floor() as i32, p.y.floor() as i32)
    }

    /// Register `cell` in every bucket its bounds overlap.
    pub(crate) fn insert(&mut self, cell: usize, bounds: &CellBounds) {
        let (min_x, min_y) = Self::bucket_of(bounds.min);
        let (max_x, max_y) = Self::bucket_of(bounds.max);
        for bx in min_x..=max_x {
            for by in min_y..=max_y {
                self.buckets.entry((bx, by)).or_default().push(cell);
            }
        }
    }

    /// Candidate cells for the bucket holding `p`, in registration order.
    pub(crate) fn candidates(&self, p: Vec2) -> &[usize] {
        self.buckets
            .get(&Self::bucket_of(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_land_in_every_overlapped_bucket() {
        let mut index = CellIndex::new();
        index.insert(0, &CellBounds::new(Vec2::ZERO, Vec2::new(2.0, 1.0)));
        index.insert(1, &CellBounds::new(Vec2::new(2.0, 0.0), Vec2::new(4.0, 1.0)));

        assert_eq!(index.candidates(Vec2::new(0.5, 0.5)), &[0]);
        assert_eq!(index.candidates(Vec2::new(2.5, 0.5)), &[0, 1]);
        assert_eq!(index.candidates(Vec2::new(3.5, 1.0)), &[1]);
        assert!(index.candidates(Vec2::new(9.0, 9.0)).is_empty());
        assert_eq!(index.bucket_count(), 10);
    }
}
