//! Weighted sampling without replacement across several pools.
//!
//! Each pool has a fixed per-item weight. At every draw pool `i` is picked
//! with probability proportional to `weight[i] * remaining[i]`, then one of
//! its remaining items is taken uniformly.
//!
//! ## Algorithm
//!
//! Cumulative bounds `c[i] = sum(weight[j] * len[j] for j <= i)` are kept.
//! A draw takes `x` uniform in `[0, c[last])` and picks the first pool with
//! `c[i] > x` (binary search). Removing an item from pool `i` subtracts
//! `weight[i]` from every bound at or after `i`.
//!
//! Weights are integers, so there is no rounding and no NaN: the all-zero
//! case is reported as [`SamplerError::ZeroWeight`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::rng::GameRng;

/// Sampling failure. Returned before any item is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SamplerError {
    #[error("requested {requested} items but only {available} are available")]
    Exhausted { requested: usize, available: usize },
    #[error("every non-empty pool has zero weight")]
    ZeroWeight,
}

/// One pool of candidate items with its per-item weight.
#[derive(Debug, Clone, Copy)]
pub struct WeightedPool<'a, T> {
    pub items: &'a [T],
    pub weight: u32,
}

impl<'a, T> WeightedPool<'a, T> {
    #[must_use]
    pub fn new(items: &'a [T], weight: u32) -> Self {
        Self { items, weight }
    }

    /// Items this pool can contribute.
    #[must_use]
    pub fn available(&self) -> usize {
        if self.weight == 0 {
            0
        } else {
            self.items.len()
        }
    }
}

/// Draw exactly `count` items, or fail with [`SamplerError::Exhausted`].
///
/// ```
/// use tavern::core::GameRng;
/// use tavern::sampler::{sample, SamplerError, WeightedPool};
///
/// let mut rng = GameRng::new(1);
/// let common = ["a", "b", "c"];
/// let rare = ["x"];
/// let pools = [WeightedPool::new(&common, 4), WeightedPool::new(&rare, 1)];
///
/// let picked = sample(&mut rng, &pools, 3).unwrap();
/// assert_eq!(picked.len(), 3);
///
/// assert_eq!(
///     sample(&mut rng, &pools, 5),
///     Err(SamplerError::Exhausted { requested: 5, available: 4 })
/// );
/// ```
pub fn sample<T: Clone>(
    rng: &mut GameRng,
    pools: &[WeightedPool<'_, T>],
    count: usize,
) -> Result<Vec<T>, SamplerError> {
    draw(rng, pools, count, true)
}

/// Draw `min(count, available)` items.
pub fn sample_clamped<T: Clone>(
    rng: &mut GameRng,
    pools: &[WeightedPool<'_, T>],
    count: usize,
) -> Result<Vec<T>, SamplerError> {
    draw(rng, pools, count, false)
}

fn draw<T: Clone>(
    rng: &mut GameRng,
    pools: &[WeightedPool<'_, T>],
    count: usize,
    strict: bool,
) -> Result<Vec<T>, SamplerError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let available: usize = pools.iter().map(WeightedPool::available).sum();
    let present: usize = pools.iter().map(|p| p.items.len()).sum();
    if available == 0 && present > 0 {
        return Err(SamplerError::ZeroWeight);
    }
    if count > available && strict {
        return Err(SamplerError::Exhausted { requested: count, available });
    }
    let count = count.min(available);

    let mut remaining: Vec<Vec<usize>> = pools
        .iter()
        .map(|p| if p.weight == 0 { Vec::new() } else { (0..p.items.len()).collect() })
        .collect();
    let mut cumulative: Vec<u64> = pools
        .iter()
        .zip(&remaining)
        .scan(0u64, |total, (pool, left)| {
            *total += u64::from(pool.weight) * left.len() as u64;
            Some(*total)
        })
        .collect();

    let mut chosen = Vec::with_capacity(count);
    for _ in 0..count {
        let total = cumulative.last().copied().unwrap_or(0);
        let x = rng.gen_below(total);
        let pool = cumulative.partition_point(|&bound| bound <= x);

        let left = &mut remaining[pool];
        let pick = rng.gen_range_usize(0..left.len());
        let index = left.swap_remove(pick);
        chosen.push(pools[pool].items[index].clone());

        let weight = u64::from(pools[pool].weight);
        for bound in &mut cumulative[pool..] {
            *bound -= weight;
        }
    }
    Ok(chosen)
}
