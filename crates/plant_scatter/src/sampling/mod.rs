//! Random helpers and the pink-noise point sampler.
//!
//! All randomness in the crate flows through [`rand::RngCore`] trait objects so
//! that callers can supply any seeded generator and tests can pin exact draws.
use rand::RngCore;

pub mod pink_noise;

pub use pink_noise::PinkNoiseSampler;

/// Uniform `f32` in `[0, 1]`.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() as f32) / ((u32::MAX as f32) + 1.0)
}

/// Uniform `f64` in `[0, 1)` built from the top 53 bits of a `u64`.
#[inline]
pub(crate) fn rand01_f64(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Uniform `f32` in `[lo, hi)`; returns `lo` for an empty range.
#[inline]
pub(crate) fn rand_range(rng: &mut dyn RngCore, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    (lo + rand01(rng) * (hi - lo)).clamp(lo, next_down(hi))
}

/// Uniform integer in `[lo, hi]`; returns `lo` when `hi <= lo`.
pub(crate) fn rand_int_inclusive(rng: &mut dyn RngCore, lo: i64, hi: i64) -> i64 {
    if hi <= lo {
        return lo;
    }
    let span = (hi - lo) as u64 + 1;
    let offset = ((rng.next_u64() as u128 * span as u128) >> 64) as u64;
    lo + offset as i64
}

/// Uniform index in `0..n`. `n` must be non-zero.
#[inline]
pub(crate) fn rand_index(rng: &mut dyn RngCore, n: usize) -> usize {
    debug_assert!(n > 0);
    rand_int_inclusive(rng, 0, n as i64 - 1) as usize
}

/// Compute the next smaller representable float value.
#[inline]
pub(crate) fn next_down(val: f32) -> f32 {
    if val.is_nan() {
        return f32::NAN;
    }
    if val == f32::NEG_INFINITY {
        return f32::NEG_INFINITY;
    }
    if val == f32::INFINITY {
        return f32::MAX;
    }
    if val == 0.0 {
        return -f32::MIN_POSITIVE;
    }

    let bits = val.to_bits();
    if val > 0.0 {
        f32::from_bits(bits - 1)
    } else {
        f32::from_bits(bits + 1)
    }
}

/// Draw one child seed per task from `parent`, in submission order.
pub(crate) fn split_seeds(parent: &mut dyn RngCore, tasks: &[usize]) -> Vec<(usize, u64)> {
    tasks.iter().map(|&t| (t, parent.next_u64())).collect()
}
