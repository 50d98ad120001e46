//! Reduce a series over a [`Partition`], one value per group.
//!
//! The same partition is applied to every axis of a series, so reducing the
//! location and value axes separately keeps them co-indexed.
use std::ops::Range;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use num_traits::{Float, FromPrimitive};

use crate::arrayops::{mean, nan_median};
use crate::boxcar::Reduction;
use crate::partition::Partition;

/// Partitions with fewer groups than this are always reduced sequentially
pub const PARALLEL_GROUP_THRESHOLD: usize = 4096;

// Can't inline cfg-if
cfg_if::cfg_if! {
    if #[cfg(feature = "parallelism")] {
        fn map_groups<F, R>(groups: &[Range<usize>], reducer: R) -> Vec<F>
        where
            F: Float + Send + Sync,
            R: Fn(&Range<usize>) -> F + Send + Sync,
        {
            if groups.len() < PARALLEL_GROUP_THRESHOLD {
                groups.iter().map(reducer).collect()
            } else {
                groups.par_iter().map(reducer).collect()
            }
        }
    } else {
        fn map_groups<F, R>(groups: &[Range<usize>], reducer: R) -> Vec<F>
        where
            F: Float + Send + Sync,
            R: Fn(&Range<usize>) -> F + Send + Sync,
        {
            groups.iter().map(reducer).collect()
        }
    }
}

/// Average `data` over each group of `partition`
pub fn index_list_average<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    partition: &Partition,
) -> Vec<F> {
    map_groups(partition.as_slice(), |g| mean(&data[g.clone()]))
}

/// The `NaN`-ignoring median of `data` over each group of `partition`
pub fn index_list_median<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    partition: &Partition,
) -> Vec<F> {
    map_groups(partition.as_slice(), |g| nan_median(&data[g.clone()]))
}

/// Sum each group of `data` and divide by `width` rather than the group's own
/// length, as if short groups were zero-padded to `width`.
pub fn index_list_padded_average<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    partition: &Partition,
    width: usize,
) -> Vec<F> {
    let divisor = F::from_usize(width).unwrap();
    map_groups(partition.as_slice(), |g| {
        data[g.clone()].iter().fold(F::zero(), |acc, v| acc + *v) / divisor
    })
}

/// Reduce `data` over `partition` with `reduction`.
///
/// When `pad_to` is given, mean reduction divides by that width. Medians ignore
/// padding.
pub fn reduce_partition<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    partition: &Partition,
    reduction: Reduction,
    pad_to: Option<usize>,
) -> Vec<F> {
    match (reduction, pad_to) {
        (Reduction::Mean, None) => index_list_average(data, partition),
        (Reduction::Mean, Some(width)) => index_list_padded_average(data, partition, width),
        (Reduction::Median, _) => index_list_median(data, partition),
    }
}
