//! Explicit binning configuration.
//!
//! Everything a binning call needs is carried by a [`BinningConfig`] value,
//! there is no process-wide state.
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::boxcar::{Reduction, TrailingPolicy};

/// The resolving power a freshly opened group starts from unless told otherwise
pub const DEFAULT_SEED_RESOLVING_POWER: f64 = 15000.0;

/// How far above the target the resolving power of a group may stay before the
/// group is closed
pub const DEFAULT_RESOLUTION_TOLERANCE: f64 = 1e-2;

/// The resolving power assumed for a group before its span has been measured.
///
/// The seed only decides whether growth of a group starts at all, so it must lie
/// above `target + tolerance`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeedPolicy {
    /// A fixed starting resolving power
    Fixed(f64),
    /// Start every group at infinite resolving power
    Unbounded,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self::Fixed(DEFAULT_SEED_RESOLVING_POWER)
    }
}

impl SeedPolicy {
    pub fn value(&self) -> f64 {
        match self {
            Self::Fixed(r) => *r,
            Self::Unbounded => f64::INFINITY,
        }
    }
}

/// Parameters for resolution-mode binning, see [`crate::resolution`]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResolutionParams {
    /// The resolving power `λ̄/Δλ` each group is driven down to
    pub target: f64,
    /// Groups are closed once `R - target` is at or below this value
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: SeedPolicy,
}

#[cfg(feature = "serde")]
fn default_tolerance() -> f64 {
    DEFAULT_RESOLUTION_TOLERANCE
}

impl ResolutionParams {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: DEFAULT_RESOLUTION_TOLERANCE,
            seed: SeedPolicy::default(),
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_seed(mut self, seed: SeedPolicy) -> Self {
        self.seed = seed;
        self
    }
}

/// Which partitioning scheme to bin with
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BinMode {
    /// Groups of roughly constant resolving power
    Resolution(ResolutionParams),
    /// Fixed-size windows
    Box {
        window_size: usize,
        #[cfg_attr(feature = "serde", serde(default))]
        trailing: TrailingPolicy,
        #[cfg_attr(feature = "serde", serde(default))]
        reduction: Reduction,
    },
}

impl Default for BinMode {
    fn default() -> Self {
        Self::Resolution(ResolutionParams::new(100.0))
    }
}

/// A complete description of how to bin a series
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinningConfig {
    pub mode: BinMode,
}

impl BinningConfig {
    pub fn new(mode: BinMode) -> Self {
        Self { mode }
    }

    pub fn resolution(target: f64) -> Self {
        Self::new(BinMode::Resolution(ResolutionParams::new(target)))
    }

    pub fn boxcar(window_size: usize) -> Self {
        Self::new(BinMode::Box {
            window_size,
            trailing: TrailingPolicy::default(),
            reduction: Reduction::default(),
        })
    }

    pub fn builder() -> BinningConfigBuilder {
        BinningConfigBuilder::new()
    }

    /// A one-line, human readable description of the binning, as written into
    /// table headers
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BinningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            BinMode::Resolution(params) => write!(f, "Binned using R={}", params.target),
            BinMode::Box {
                window_size,
                trailing,
                reduction,
            } => {
                write!(f, "Binned box of size {window_size}")?;
                if *reduction != Reduction::Mean {
                    write!(f, " ({reduction})")?;
                }
                if *trailing != TrailingPolicy::Drop {
                    write!(f, ", trailing samples: {trailing}")?;
                }
                Ok(())
            }
        }
    }
}

/// A builder for configuring [`BinningConfig`]
#[derive(Debug, Clone)]
pub struct BinningConfigBuilder {
    target: Option<f64>,
    tolerance: f64,
    seed: SeedPolicy,
    window_size: Option<usize>,
    trailing: TrailingPolicy,
    reduction: Reduction,
}

impl Default for BinningConfigBuilder {
    fn default() -> Self {
        Self {
            target: None,
            tolerance: DEFAULT_RESOLUTION_TOLERANCE,
            seed: SeedPolicy::default(),
            window_size: None,
            trailing: TrailingPolicy::default(),
            reduction: Reduction::default(),
        }
    }
}

impl BinningConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bin by resolving power. Clears any window size set earlier.
    pub fn target_resolving_power(&mut self, target: f64) -> &mut Self {
        self.target = Some(target);
        self.window_size = None;
        self
    }

    pub fn tolerance(&mut self, tolerance: f64) -> &mut Self {
        self.tolerance = tolerance;
        self
    }

    pub fn seed(&mut self, seed: SeedPolicy) -> &mut Self {
        self.seed = seed;
        self
    }

    /// Bin by fixed windows. Clears any resolving power set earlier.
    pub fn window_size(&mut self, window_size: usize) -> &mut Self {
        self.window_size = Some(window_size);
        self.target = None;
        self
    }

    pub fn trailing(&mut self, trailing: TrailingPolicy) -> &mut Self {
        self.trailing = trailing;
        self
    }

    pub fn reduction(&mut self, reduction: Reduction) -> &mut Self {
        self.reduction = reduction;
        self
    }

    pub fn build(&self) -> BinningConfig {
        let mode = match (self.window_size, self.target) {
            (Some(window_size), _) => BinMode::Box {
                window_size,
                trailing: self.trailing,
                reduction: self.reduction,
            },
            (None, Some(target)) => BinMode::Resolution(ResolutionParams {
                target,
                tolerance: self.tolerance,
                seed: self.seed,
            }),
            (None, None) => BinMode::default(),
        };
        BinningConfig::new(mode)
    }
}

impl From<BinningConfigBuilder> for BinningConfig {
    fn from(value: BinningConfigBuilder) -> Self {
        value.build()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(BinningConfig::resolution(100.0).describe(), "Binned using R=100");
        assert_eq!(BinningConfig::boxcar(10).describe(), "Binned box of size 10");
        let config = BinningConfig::builder()
            .window_size(4)
            .trailing(TrailingPolicy::ShortGroup)
            .reduction(Reduction::Median)
            .build();
        assert_eq!(
            config.describe(),
            "Binned box of size 4 (median), trailing samples: short-group"
        );
    }

    #[test]
    fn test_builder_last_mode_wins() {
        let config = BinningConfig::builder()
            .window_size(4)
            .target_resolving_power(250.0)
            .seed(SeedPolicy::Unbounded)
            .build();
        match config.mode {
            BinMode::Resolution(params) => {
                assert_eq!(params.target, 250.0);
                assert_eq!(params.seed, SeedPolicy::Unbounded);
                assert_eq!(params.tolerance, DEFAULT_RESOLUTION_TOLERANCE);
            }
            BinMode::Box { .. } => panic!("Expected resolution mode"),
        }
        assert_eq!(BinningConfigBuilder::new().build(), BinningConfig::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize() -> Result<(), serde_json::Error> {
        let config: BinningConfig =
            serde_json::from_str(r#"{"mode": {"resolution": {"target": 50.0}}}"#)?;
        assert_eq!(config, BinningConfig::resolution(50.0));

        let config: BinningConfig = serde_json::from_str(
            r#"{"mode": {"box": {"window_size": 3, "trailing": "Pad"}}}"#,
        )?;
        assert_eq!(
            config.mode,
            BinMode::Box {
                window_size: 3,
                trailing: TrailingPolicy::Pad,
                reduction: Reduction::Mean
            }
        );
        Ok(())
    }
}
