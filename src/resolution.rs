//! Partition a sampled axis into groups of roughly constant resolving power.
//!
//! For a group of locations `λ[a..=b]`, the local resolving power is
//!
//! ```text
//! R = mean(λ[a..=b]) / |λ[b] - λ[a]|
//! ```
//!
//! Starting from the first unused index, a group is grown one index at a time,
//! recomputing `R` over the candidate group each step, until `R - target` drops
//! to at most the configured tolerance. The group is closed with the index that
//! crossed the threshold, so it may slightly overshoot below the target, and
//! the next group opens on the following index. Because `R` only makes sense
//! for two or more samples, a single index left over at the end of the axis is
//! emitted as its own group without a check, and the final group may stop
//! short of the target when the axis runs out.
//!
//! # Example
//!
//! ```
//! use xsecbin::resolution::resolution_partition;
//! use xsecbin::config::ResolutionParams;
//!
//! let location = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let partition = resolution_partition(&location, &ResolutionParams::new(2.0)).unwrap();
//! assert_eq!(partition.as_slice(), &[0..2, 2..5, 5..6]);
//! ```
use log::{debug, log_enabled, trace};
use num_traits::{Float, FromPrimitive};

use crate::arrayops::{first_non_finite, mean};
use crate::binning::BinningError;
use crate::config::ResolutionParams;
use crate::partition::Partition;

/// The local resolving power of `locations`, `mean / |last - first|`.
///
/// A zero span gives infinite resolving power. Returns `None` for fewer than two
/// samples.
pub fn local_resolving_power<F: Float + FromPrimitive>(locations: &[F]) -> Option<F> {
    if locations.len() < 2 {
        return None;
    }
    let first = locations[0];
    let last = locations[locations.len() - 1];
    let span = (last - first).abs();
    let central = mean(locations);
    if span.is_zero() {
        Some(F::infinity())
    } else {
        Some(central / span)
    }
}

/// Check that `params` describes a partitioning that can make progress
pub fn validate_params(params: &ResolutionParams) -> Result<(), BinningError> {
    if !params.target.is_finite() || params.target <= 0.0 {
        return Err(BinningError::InvalidTarget(params.target));
    }
    if !params.tolerance.is_finite() || params.tolerance < 0.0 {
        return Err(BinningError::InvalidTolerance(params.tolerance));
    }
    // A seed at or under the threshold would never let a group grow
    if params.seed.value() - params.target <= params.tolerance {
        return Err(BinningError::InvalidTarget(params.target));
    }
    Ok(())
}

/// Partition `location` into contiguous groups whose resolving power is driven
/// down to `params.target`.
///
/// The groups cover `[0, location.len())` exactly once, in order. See the
/// [module documentation](self) for the growth rule.
pub fn resolution_partition<F: Float + FromPrimitive>(
    location: &[F],
    params: &ResolutionParams,
) -> Result<Partition, BinningError> {
    validate_params(params)?;
    let n = location.len();
    if n == 0 {
        return Err(BinningError::EmptyInput);
    }
    if let Some(i) = first_non_finite(location) {
        debug!("Location {i} is not finite, resolving powers around it are undefined");
    }

    let target = F::from_f64(params.target).unwrap();
    let tolerance = F::from_f64(params.tolerance).unwrap();

    let mut partition = Partition::new(n);
    let mut start = 0;

    // Invariant: start < n, and every index before start belongs to a group.
    while start < n {
        if start == n - 1 {
            partition.push(start..n);
            break;
        }

        let mut end = start + 1;
        let mut current = local_resolving_power(&location[start..=end]).unwrap();
        // end strictly increases and never passes n - 1
        while current - target > tolerance && end + 1 < n {
            end += 1;
            current = local_resolving_power(&location[start..=end]).unwrap();
        }

        if log_enabled!(log::Level::Trace) {
            trace!(
                "Closing group {start}..{} with R = {:0.3}",
                end + 1,
                current.to_f64().unwrap_or(f64::NAN)
            );
        }
        partition.push(start..end + 1);
        start = end + 1;
    }

    debug!(
        "Partitioned {n} samples into {} groups at R = {}",
        partition.len(),
        params.target
    );
    Ok(partition)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::SeedPolicy;
    use rstest::rstest;

    fn log_spaced(start: f64, stop: f64, n: usize) -> Vec<f64> {
        let ratio = (stop / start).powf(1.0 / (n - 1) as f64);
        (0..n).map(|i| start * ratio.powi(i as i32)).collect()
    }

    #[test_log::test]
    fn test_golden_path() {
        let location = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let part = resolution_partition(&location, &ResolutionParams::new(2.0)).unwrap();
        assert_eq!(part.as_slice(), &[0..2, 2..5, 5..6]);
        assert!(part.is_exhaustive());
    }

    #[test]
    fn test_resolving_power() {
        assert_eq!(local_resolving_power(&[3.0, 4.0, 5.0]), Some(2.0));
        assert_eq!(local_resolving_power(&[5.0, 4.0, 3.0]), Some(2.0));
        assert_eq!(local_resolving_power(&[2.0, 2.0]), Some(f64::INFINITY));
        assert_eq!(local_resolving_power::<f64>(&[2.0]), None);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(3, 2)]
    fn test_short_inputs(#[case] n: usize, #[case] groups: usize) {
        let location: Vec<f64> = (1..=n).map(|i| i as f64).collect();
        let part = resolution_partition(&location, &ResolutionParams::new(1e3)).unwrap();
        assert!(part.is_exhaustive());
        assert_eq!(part.len(), groups);
        assert_eq!(part.last().map(|g| g.end), Some(n));
    }

    #[test]
    fn test_empty_input() {
        let err = resolution_partition::<f64>(&[], &ResolutionParams::new(10.0)).unwrap_err();
        assert_eq!(err, BinningError::EmptyInput);
    }

    #[rstest]
    #[case(ResolutionParams::new(15000.0))]
    #[case(ResolutionParams::new(14999.995))]
    #[case(ResolutionParams::new(0.0))]
    #[case(ResolutionParams::new(-3.0))]
    #[case(ResolutionParams::new(f64::NAN))]
    fn test_invalid_target(#[case] params: ResolutionParams) {
        let err = resolution_partition(&[1.0, 2.0, 3.0], &params).unwrap_err();
        assert!(matches!(err, BinningError::InvalidTarget(_)), "{err:?}");
    }

    #[test]
    fn test_invalid_tolerance() {
        let params = ResolutionParams::new(10.0).with_tolerance(-1.0);
        let err = resolution_partition(&[1.0, 2.0, 3.0], &params).unwrap_err();
        assert_eq!(err, BinningError::InvalidTolerance(-1.0));
    }

    #[test]
    fn test_unbounded_seed_accepts_high_target() {
        let location = log_spaced(1e-6, 2e-6, 50_000);
        let params = ResolutionParams::new(20000.0).with_seed(SeedPolicy::Unbounded);
        let part = resolution_partition(&location, &params).unwrap();
        assert!(part.is_exhaustive());
        assert!(part.len() < location.len());
    }

    #[rstest]
    #[case(100.0)]
    #[case(250.0)]
    #[case(1000.0)]
    fn test_threshold_crossing(#[case] target: f64) {
        let params = ResolutionParams::new(target);
        // Pairwise resolving power of roughly 3900, descending like a wavenumber grid
        let mut location = log_spaced(0.3e-6, 50e-6, 20_000);
        location.reverse();
        let part = resolution_partition(&location, &params).unwrap();
        assert!(part.is_exhaustive());

        let n_groups = part.len();
        for (i, group) in part.iter().enumerate() {
            if i == n_groups - 1 {
                break;
            }
            let slice = &location[group.clone()];
            let r = local_resolving_power(slice).unwrap();
            assert!(
                r - target <= params.tolerance,
                "group {i} {group:?} closed at R = {r}"
            );
            if slice.len() > 2 {
                let before = local_resolving_power(&slice[..slice.len() - 1]).unwrap();
                assert!(
                    before - target > params.tolerance,
                    "group {i} {group:?} should have closed earlier, R = {before}"
                );
            }
        }
    }

    #[test]
    fn test_duplicate_locations_keep_growing() {
        let location = [1.0, 1.0, 1.0, 2.0, 3.0];
        let part = resolution_partition(&location, &ResolutionParams::new(1.25)).unwrap();
        assert_eq!(part.as_slice(), &[0..4, 4..5]);
    }
}
