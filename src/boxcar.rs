//! Fixed-window ("box") binning.
//!
//! Indices are split into consecutive, non-overlapping windows of
//! `window_size` samples. What happens to a trailing remainder shorter than a
//! full window is governed by [`TrailingPolicy`].
//!
//! Besides the plain mean and median reductions, windows can be reduced by an
//! inverse-variance weighted mean, which also yields the propagated uncertainty
//! of each bin.
use std::fmt;

use log::debug;
use num_traits::{Float, FromPrimitive};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::binning::{check_lengths, BinningError};
use crate::partition::Partition;
use crate::reduce::reduce_partition;

/// What to do with the samples left over after the last full window
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TrailingPolicy {
    /// Leave the remainder out of the output
    #[default]
    Drop,
    /// Treat the remainder as a full window whose missing samples are zero
    Pad,
    /// Emit the remainder as its own, shorter group
    ShortGroup,
}

impl fmt::Display for TrailingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drop => "drop",
            Self::Pad => "pad",
            Self::ShortGroup => "short-group",
        };
        f.write_str(name)
    }
}

/// How the samples of one window are combined
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Reduction {
    /// The arithmetic mean
    #[default]
    Mean,
    /// The median, ignoring `NaN` samples
    Median,
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => f.write_str("mean"),
            Self::Median => f.write_str("median"),
        }
    }
}

/// Split `n` indices into consecutive windows of `window_size`.
///
/// With [`TrailingPolicy::Drop`] the partition stops at the last full window, so
/// it holds exactly `n / window_size` groups and is not exhaustive when `n` is
/// not a multiple of `window_size`. Both other policies keep the remainder as a
/// final short group; [`TrailingPolicy::Pad`] only differs at reduction time.
pub fn box_partition(
    n: usize,
    window_size: usize,
    trailing: TrailingPolicy,
) -> Result<Partition, BinningError> {
    if window_size == 0 {
        return Err(BinningError::InvalidWindowSize(window_size));
    }
    if n == 0 {
        return Err(BinningError::EmptyInput);
    }
    let full = n / window_size;
    let mut partition = Partition::with_capacity(n, full + 1);
    for i in 0..full {
        let start = i * window_size;
        partition.push(start..start + window_size);
    }
    let covered = full * window_size;
    if covered < n && trailing != TrailingPolicy::Drop {
        partition.push(covered..n);
    }
    Ok(partition)
}

/// Reduce `data` over consecutive windows of `window_size` with `reduction`
pub fn box_reduce<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    window_size: usize,
    trailing: TrailingPolicy,
    reduction: Reduction,
) -> Result<Vec<F>, BinningError> {
    let partition = box_partition(data.len(), window_size, trailing)?;
    let pad_to = (trailing == TrailingPolicy::Pad).then_some(window_size);
    Ok(reduce_partition(data, &partition, reduction, pad_to))
}

/// The mean of consecutive windows of `window_size` samples.
///
/// ```
/// use xsecbin::boxcar::{box_average, TrailingPolicy};
///
/// let binned = box_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, TrailingPolicy::Drop).unwrap();
/// assert_eq!(binned, vec![1.5, 3.5]);
/// ```
pub fn box_average<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    window_size: usize,
    trailing: TrailingPolicy,
) -> Result<Vec<F>, BinningError> {
    box_reduce(data, window_size, trailing, Reduction::Mean)
}

/// The `NaN`-ignoring median of consecutive windows of `window_size` samples
pub fn box_median<F: Float + FromPrimitive + Send + Sync>(
    data: &[F],
    window_size: usize,
    trailing: TrailingPolicy,
) -> Result<Vec<F>, BinningError> {
    box_reduce(data, window_size, trailing, Reduction::Median)
}

/// The inverse-variance weighted means of a set of windows with their
/// propagated uncertainties
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightedBins<F> {
    pub value: Vec<F>,
    pub uncertainty: Vec<F>,
}

impl<F> WeightedBins<F> {
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

/// The weight `1 / error²` of a sample, rejecting zero and non-finite errors
#[inline]
fn inverse_variance<F: Float + FromPrimitive>(index: usize, error: F) -> Result<F, BinningError> {
    let weight = error.powi(-2);
    if error.is_zero() || !error.is_finite() || !weight.is_finite() {
        return Err(BinningError::DegenerateWeight {
            index,
            error: error.to_f64().unwrap_or(f64::NAN),
        });
    }
    Ok(weight)
}

/// Compute the inverse-variance weighted mean `Σ xᵢwᵢ / Σ wᵢ` and its uncertainty
/// `1 / √Σ wᵢ` over every group of `partition`, with `wᵢ = 1 / errorᵢ²`.
pub fn weighted_partition_average<F: Float + FromPrimitive>(
    data: &[F],
    error: &[F],
    partition: &Partition,
) -> Result<(Vec<F>, Vec<F>), BinningError> {
    check_lengths(data, error)?;
    let mut values = Vec::with_capacity(partition.len());
    let mut uncertainties = Vec::with_capacity(partition.len());
    for group in partition.iter() {
        let mut weighted_sum = F::zero();
        let mut weight_sum = F::zero();
        for i in group.clone() {
            let w = inverse_variance(i, error[i])?;
            weighted_sum = weighted_sum + data[i] * w;
            weight_sum = weight_sum + w;
        }
        if !weight_sum.is_finite() || !weighted_sum.is_finite() {
            return Err(BinningError::DegenerateWeight {
                index: group.start,
                error: error[group.start].to_f64().unwrap_or(f64::NAN),
            });
        }
        values.push(weighted_sum / weight_sum);
        uncertainties.push(weight_sum.sqrt().recip());
    }
    Ok((values, uncertainties))
}

/// The inverse-variance weighted mean of consecutive windows of `window_size`
/// samples of `data`, with per-sample uncertainties `error`.
///
/// A zero or non-finite uncertainty, or a window whose weight sums overflow, fails
/// with [`BinningError::DegenerateWeight`].
/// [`TrailingPolicy::Pad`] is treated as [`TrailingPolicy::ShortGroup`].
pub fn weighted_box_average<F: Float + FromPrimitive>(
    data: &[F],
    error: &[F],
    window_size: usize,
    trailing: TrailingPolicy,
) -> Result<WeightedBins<F>, BinningError> {
    check_lengths(data, error)?;
    let trailing = if trailing == TrailingPolicy::Pad {
        debug!("Padding is not defined for weighted means, keeping the short trailing group");
        TrailingPolicy::ShortGroup
    } else {
        trailing
    };
    let partition = box_partition(data.len(), window_size, trailing)?;
    let (value, uncertainty) = weighted_partition_average(data, error, &partition)?;
    Ok(WeightedBins { value, uncertainty })
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_box_average_drops_remainder() {
        let binned = box_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, TrailingPolicy::Drop).unwrap();
        assert_eq!(binned, vec![1.5, 3.5]);
    }

    #[rstest]
    #[case(10, 3)]
    #[case(7, 7)]
    #[case(7, 8)]
    #[case(100, 9)]
    fn test_drop_length(#[case] n: usize, #[case] window_size: usize) {
        let data: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let binned = box_average(&data, window_size, TrailingPolicy::Drop).unwrap();
        assert_eq!(binned.len(), n / window_size);
    }

    #[rstest]
    #[case(TrailingPolicy::Drop)]
    #[case(TrailingPolicy::Pad)]
    #[case(TrailingPolicy::ShortGroup)]
    fn test_window_of_one_is_identity(#[case] trailing: TrailingPolicy) {
        let data = [3.0, -1.0, 4.5, 1e-20, 9.0];
        let binned = box_average(&data, 1, trailing).unwrap();
        assert_eq!(binned, data.to_vec());
    }

    #[rstest]
    #[case(TrailingPolicy::Drop, 3)]
    #[case(TrailingPolicy::Pad, 4)]
    #[case(TrailingPolicy::ShortGroup, 4)]
    fn test_partition_shape(#[case] trailing: TrailingPolicy, #[case] groups: usize) {
        let part = box_partition(11, 3, trailing).unwrap();
        assert_eq!(part.len(), groups);
        assert!(part.is_contiguous());
        assert_eq!(part.is_exhaustive(), trailing != TrailingPolicy::Drop);
    }

    #[test]
    fn test_invalid_window() {
        assert_eq!(
            box_partition(4, 0, TrailingPolicy::Drop).unwrap_err(),
            BinningError::InvalidWindowSize(0)
        );
        assert_eq!(
            box_average::<f64>(&[], 2, TrailingPolicy::Drop).unwrap_err(),
            BinningError::EmptyInput
        );
    }

    #[test]
    fn test_box_median_ignores_nan() {
        let data = [1.0, f64::NAN, 3.0, f64::NAN, f64::NAN, 2.0];
        let binned = box_median(&data, 3, TrailingPolicy::Drop).unwrap();
        assert_eq!(binned, vec![2.0, 2.0]);
    }

    #[test]
    fn test_weighted_constant_error_is_mean() {
        let data = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let error = [0.3; 6];
        let weighted = weighted_box_average(&data, &error, 3, TrailingPolicy::Drop).unwrap();
        let plain = box_average(&data, 3, TrailingPolicy::Drop).unwrap();
        assert_eq!(weighted.len(), 2);
        for (w, p) in weighted.value.iter().zip(plain.iter()) {
            assert!((w - p).abs() < 1e-12, "{w} != {p}");
        }
        let expected = 0.3 / 3.0f64.sqrt();
        for u in weighted.uncertainty.iter() {
            assert!((u - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_weighted_small_error_dominates() {
        let data = [1.0, 2.0, 10.0];
        let error = [1.0, 1.0, 1e-6];
        let weighted = weighted_box_average(&data, &error, 3, TrailingPolicy::Drop).unwrap();
        assert!((weighted.value[0] - 10.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn test_weighted_degenerate(#[case] bad: f64) {
        let data = [1.0, 2.0, 3.0, 4.0];
        let error = [1.0, 1.0, bad, 1.0];
        let err = weighted_box_average(&data, &error, 2, TrailingPolicy::Drop).unwrap_err();
        match err {
            BinningError::DegenerateWeight { index, .. } => assert_eq!(index, 2),
            other => panic!("Unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_weighted_sum_overflow() {
        let err = weighted_box_average(&[1.0, 3.0], &[1e-154, 1e-154], 2, TrailingPolicy::Drop)
            .unwrap_err();
        assert_eq!(
            err,
            BinningError::DegenerateWeight {
                index: 0,
                error: 1e-154
            }
        );
    }

    #[test]
    fn test_weighted_length_mismatch() {
        let err = weighted_box_average(&[1.0, 2.0], &[1.0], 1, TrailingPolicy::Drop).unwrap_err();
        assert_eq!(err, BinningError::LengthMismatch(2, 1));
    }
}
