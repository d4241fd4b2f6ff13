//! Per-cell point budgets.
use rand::RngCore;

use crate::sampling::{rand_index, rand_int_inclusive};

/// Split `total` points over `cells` cells.
///
/// Each cell gets `total / cells` plus a seeded perturbation of up to
/// `base / variance_divisor` in either direction; the leftover (or surplus) is
/// then added (or removed) one point at a time on randomly chosen cells so the
/// budgets sum to exactly `total`. Budgets never go below zero.
pub(crate) fn distribute(
    total: usize,
    cells: usize,
    variance_divisor: usize,
    rng: &mut dyn RngCore,
) -> Vec<usize> {
    if cells == 0 {
        return Vec::new();
    }

    let base = (total / cells) as i64;
    let variance = base / variance_divisor.max(1) as i64;

    let mut budgets: Vec<usize> = (0..cells)
        .map(|_| (base + rand_int_inclusive(rng, -variance, variance)).max(0) as usize)
        .collect();

    let assigned: usize = budgets.iter().sum();
    if assigned < total {
        for _ in 0..(total - assigned) {
            budgets[rand_index(rng, cells)] += 1;
        }
    } else {
        let mut surplus = assigned - total;
        while surplus > 0 {
            let i = rand_index(rng, cells);
            if budgets[i] > 0 {
                budgets[i] -= 1;
                surplus -= 1;
            }
        }
    }

    budgets
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn budgets_sum_to_total() {
        let mut rng = StdRng::seed_from_u64(11);
        for (total, cells, div) in [(4000, 37, 20), (8000, 37, 40), (5, 9, 20), (0, 4, 20)] {
            let budgets = distribute(total, cells, div, &mut rng);
            assert_eq!(budgets.len(), cells);
            assert_eq!(budgets.iter().sum::<usize>(), total);
        }
    }

    #[test]
    fn perturbation_stays_near_base() {
        let mut rng = StdRng::seed_from_u64(3);
        let budgets = distribute(10_000, 10, 20, &mut rng);
        // base 1000, variance 50; remainder redistribution adds at most a few more
        assert!(budgets.iter().all(|b| (850..=1150).contains(b)));
    }

    #[test]
    fn same_seed_same_budgets() {
        let a = distribute(777, 13, 40, &mut StdRng::seed_from_u64(5));
        let b = distribute(777, 13, 40, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn no_cells_no_budgets() {
        assert!(distribute(10, 0, 20, &mut StdRng::seed_from_u64(1)).is_empty());
    }
}
