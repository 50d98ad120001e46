//! The binning entry point.
//!
//! [`bin_series`] takes a location axis, a co-indexed value axis and a
//! [`BinningConfig`], builds a [`Partition`] for the configured mode and reduces
//! both axes over it so the outputs stay co-indexed.
//!
//! ```
//! use xsecbin::bin_series;
//! use xsecbin::config::BinningConfig;
//!
//! let location = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let value = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
//! let binned = bin_series(&location, &value, &BinningConfig::resolution(2.0)).unwrap();
//! assert_eq!(binned.location, vec![1.5, 4.0, 6.0]);
//! assert_eq!(binned.value, vec![15.0, 40.0, 60.0]);
//! ```
use log::{debug, warn};
use num_traits::{Float, FromPrimitive};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::is_monotonic;
use crate::boxcar::{box_partition, weighted_partition_average, TrailingPolicy};
use crate::config::{BinMode, BinningConfig};
use crate::partition::Partition;
use crate::reduce::{index_list_average, reduce_partition};
use crate::resolution::resolution_partition;

/// All the ways binning can fail
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BinningError {
    #[error("The input arrays are empty")]
    EmptyInput,
    #[error("The co-indexed arrays do not match in length, received {0} and {1}")]
    LengthMismatch(usize, usize),
    #[error("The target resolving power {0} must be finite, positive and below the seed resolving power")]
    InvalidTarget(f64),
    #[error("The resolution tolerance must be finite and non-negative, received {0}")]
    InvalidTolerance(f64),
    #[error("The window size must be at least 1, received {0}")]
    InvalidWindowSize(usize),
    #[error("The uncertainty {error} at index {index} cannot be used as a weight")]
    DegenerateWeight { index: usize, error: f64 },
}

/// The reduced location and value axes, co-indexed, along with the partition
/// they were reduced over
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinnedSeries<F> {
    pub location: Vec<F>,
    pub value: Vec<F>,
    pub partition: Partition,
    /// The human readable binning description, see [`BinningConfig::describe`]
    pub description: String,
}

impl<F: Float> BinnedSeries<F> {
    pub fn len(&self) -> usize {
        self.location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }

    /// Reverse both axes, e.g. to turn a wavenumber-ordered series into ascending
    /// wavelength. The partition is left in input order.
    pub fn reversed(mut self) -> Self {
        self.location.reverse();
        self.value.reverse();
        self
    }
}

/// The reduced location axis with inverse-variance weighted values and their
/// propagated uncertainties
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeightedBinnedSeries<F> {
    pub location: Vec<F>,
    pub value: Vec<F>,
    pub uncertainty: Vec<F>,
    pub partition: Partition,
}

impl<F: Float> WeightedBinnedSeries<F> {
    pub fn len(&self) -> usize {
        self.location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty()
    }
}

pub(crate) fn check_lengths<A, B>(a: &[A], b: &[B]) -> Result<usize, BinningError> {
    if a.len() != b.len() {
        return Err(BinningError::LengthMismatch(a.len(), b.len()));
    }
    if a.is_empty() {
        return Err(BinningError::EmptyInput);
    }
    Ok(a.len())
}

/// Build the partition `config` describes over `location`
pub fn partition_for<F: Float + FromPrimitive>(
    location: &[F],
    config: &BinningConfig,
) -> Result<Partition, BinningError> {
    match &config.mode {
        BinMode::Resolution(params) => resolution_partition(location, params),
        BinMode::Box {
            window_size,
            trailing,
            ..
        } => box_partition(location.len(), *window_size, *trailing),
    }
}

/// Bin `location` and `value` as described by `config`.
///
/// Both axes are reduced over the same partition with the configured reduction,
/// the output keeps the input's axis order.
pub fn bin_series<F: Float + FromPrimitive + Send + Sync>(
    location: &[F],
    value: &[F],
    config: &BinningConfig,
) -> Result<BinnedSeries<F>, BinningError> {
    let n = check_lengths(location, value)?;
    if !is_monotonic(location) {
        warn!("Binning a location axis that is not monotonic");
    }

    let partition = partition_for(location, config)?;

    let (location_binned, value_binned) = match &config.mode {
        BinMode::Box {
            window_size,
            trailing: TrailingPolicy::Pad,
            reduction,
        } => (
            reduce_partition(location, &partition, *reduction, Some(*window_size)),
            reduce_partition(value, &partition, *reduction, Some(*window_size)),
        ),
        BinMode::Box { reduction, .. } => (
            reduce_partition(location, &partition, *reduction, None),
            reduce_partition(value, &partition, *reduction, None),
        ),
        BinMode::Resolution(_) => (
            index_list_average(location, &partition),
            index_list_average(value, &partition),
        ),
    };

    debug!(
        "Binned {n} samples into {} groups ({})",
        partition.len(),
        config
    );

    Ok(BinnedSeries {
        location: location_binned,
        value: value_binned,
        partition,
        description: config.describe(),
    })
}

/// Box-bin `location` by plain mean and `value` by inverse-variance weighted mean
/// using the per-sample uncertainties in `error`.
///
/// [`TrailingPolicy::Pad`] has no meaning for weighted means and is treated as
/// [`TrailingPolicy::ShortGroup`].
pub fn bin_series_weighted<F: Float + FromPrimitive + Send + Sync>(
    location: &[F],
    value: &[F],
    error: &[F],
    window_size: usize,
    trailing: TrailingPolicy,
) -> Result<WeightedBinnedSeries<F>, BinningError> {
    check_lengths(location, value)?;
    check_lengths(value, error)?;
    let trailing = match trailing {
        TrailingPolicy::Pad => {
            debug!("Padding is not defined for weighted means, keeping the short trailing group");
            TrailingPolicy::ShortGroup
        }
        policy => policy,
    };
    let partition = box_partition(location.len(), window_size, trailing)?;
    let (value_binned, uncertainty) = weighted_partition_average(value, error, &partition)?;
    let location_binned = index_list_average(location, &partition);
    Ok(WeightedBinnedSeries {
        location: location_binned,
        value: value_binned,
        uncertainty,
        partition,
    })
}
