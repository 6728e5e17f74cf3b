//! Seeded randomness.
//!
//! Each stage opens its own stream with `stage_rng(seed, SALT)`, so turning a
//! stage off never shifts the rolls another stage sees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn stage_rng(seed: u64, salt: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ salt)
}

/// Uniform integer in `0..n`; always 0 when `n` is 0.
pub fn roll<R: Rng>(rng: &mut R, n: u32) -> u32 {
    if n == 0 {
        0
    } else {
        rng.gen_range(0..n)
    }
}

/// True with probability `percent / 100`.
pub fn chance<R: Rng>(rng: &mut R, percent: f64) -> bool {
    if percent <= 0.0 {
        return false;
    }
    rng.gen::<f64>() * 100.0 < percent
}

/// True one time in `den`. A denominator of 0 or 1 always succeeds.
pub fn one_in<R: Rng>(rng: &mut R, den: u32) -> bool {
    den <= 1 || rng.gen_range(0..den) == 0
}

/// Index drawn with probability proportional to its weight.
/// `None` when no weight is positive.
pub fn weighted_pick<R: Rng>(rng: &mut R, weights: &[f64]) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let mut target = rng.gen::<f64>() * total;
    let mut last = None;
    for (i, w) in weights.iter().enumerate() {
        if *w <= 0.0 {
            continue;
        }
        last = Some(i);
        if target < *w {
            return Some(i);
        }
        target -= w;
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_salt_repeat() {
        let mut a = stage_rng(7, 0xAB);
        let mut b = stage_rng(7, 0xAB);
        let xs: Vec<u32> = (0..16).map(|_| roll(&mut a, 1000)).collect();
        let ys: Vec<u32> = (0..16).map(|_| roll(&mut b, 1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let mut rng = stage_rng(1, 2);
        assert_eq!(roll(&mut rng, 0), 0);
        assert!(!chance(&mut rng, 0.0));
        assert!(chance(&mut rng, 100.0));
        assert!(one_in(&mut rng, 0));
        assert_eq!(weighted_pick(&mut rng, &[0.0, -1.0]), None);
    }

    #[test]
    fn weighted_pick_skips_zero_weights() {
        let mut rng = stage_rng(3, 4);
        for _ in 0..200 {
            assert_eq!(weighted_pick(&mut rng, &[0.0, 2.0, 0.0]), Some(1));
        }
    }
}
