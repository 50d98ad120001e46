pub use crate::binning::{bin_series, BinnedSeries, BinningError};
pub use crate::boxcar::{Reduction, TrailingPolicy};
pub use crate::config::{BinMode, BinningConfig, ResolutionParams, SeedPolicy};
pub use crate::partition::Partition;
