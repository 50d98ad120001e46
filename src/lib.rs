//! `xsecbin` is a library for resampling high-resolution spectra, such as
//! absorption cross-sections tabulated over a fine wavenumber grid, to a lower
//! resolution suitable for plotting and comparison.
//!
//! Two binning modes are provided. [`resolution`] groups samples so that each
//! group's resolving power `R = λ̄/Δλ` is driven down to a target value, giving
//! bins of constant relative width. [`boxcar`] groups samples into fixed-size
//! windows, optionally reducing them by an inverse-variance weighted mean. Both
//! produce a [`partition::Partition`] which the [`reduce`] functions apply to each axis of
//! a series, keeping the binned axes co-indexed.
//!
//! # Usage
//! ```
//! use xsecbin::bin_series;
//! use xsecbin::config::BinningConfig;
//!
//! // A descending wavelength axis, as obtained from an ascending wavenumber grid
//! let wavelength: Vec<f64> = (0..2000).rev().map(|i| 1e-6 * (1.0 + i as f64 * 1e-4)).collect();
//! let cross_section: Vec<f64> = wavelength.iter().map(|w| (w * 1e7).sin().abs()).collect();
//!
//! let binned = bin_series(&wavelength, &cross_section, &BinningConfig::resolution(100.0))
//!     .unwrap()
//!     .reversed();
//! assert!(binned.len() < wavelength.len());
//! assert!(binned.location.windows(2).all(|w| w[0] < w[1]));
//! assert_eq!(binned.description, "Binned using R=100");
//! ```
//!
//! Tabulated cross-sections over pressure and temperature can be prepared in
//! one step with [`xsec::prepare_cross_section`] and written out with
//! [`text::write_binned_table`].
pub mod arrayops;
pub mod binning;
pub mod boxcar;
pub mod config;
pub mod partition;
pub mod reduce;
pub mod resolution;
pub mod text;
pub mod xsec;

pub mod prelude;

pub use crate::binning::{
    bin_series, bin_series_weighted, BinnedSeries, BinningError, WeightedBinnedSeries,
};
pub use crate::boxcar::{
    box_average, box_median, weighted_box_average, Reduction, TrailingPolicy, WeightedBins,
};
