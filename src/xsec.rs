//! Prepare a tabulated absorption cross-section for plotting at low resolution.
//!
//! A [`CrossSectionGrid`] holds cross-sections tabulated over pressure,
//! temperature and wavenumber. [`prepare_cross_section`] picks the
//! pressure/temperature point closest to an [`XsecSelection`], converts the
//! wavenumber axis to wavelength, bins both axes and returns them in ascending
//! wavelength order together with the metadata written into the table header
//! by [`crate::text::write_binned_table`].
//!
//! Reading the grid from its on-disk container is left to the caller.
use log::{debug, info};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::arrayops::{argmin, minmax};
use crate::binning::{bin_series, BinningError};
use crate::config::BinningConfig;
use crate::text::TableMetadata;

/// All the ways preparing a cross-section can fail
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XsecError {
    #[error("The {0} axis is empty")]
    EmptyAxis(&'static str),
    #[error("Expected {expected} cross-section values for the grid shape, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("Pressures must be positive to be compared in log space, found {0}")]
    NonPositivePressure(f64),
    #[error("Cannot select the {axis} nearest to {value}")]
    InvalidSelection { axis: &'static str, value: f64 },
    #[error(transparent)]
    Binning(#[from] BinningError),
}

/// Convert a wavenumber in cm⁻¹ to a wavelength in metres
#[inline]
pub fn wavenumber_to_wavelength(wavenumber: f64) -> f64 {
    1.0 / (wavenumber * 1e2)
}

/// Render a molecular formula with every digit as a LaTeX subscript, so `"H2O"`
/// becomes `"H$_2$O"`.
pub fn latex_name(formula: &str) -> String {
    let mut name = String::with_capacity(formula.len() * 2);
    for c in formula.chars() {
        if c.is_ascii_digit() {
            name.push_str("$_");
            name.push(c);
            name.push('$');
        } else {
            name.push(c);
        }
    }
    name
}

/// Absorption cross-sections tabulated over pressure, temperature and wavenumber
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CrossSectionGrid {
    /// The molecule's formula, e.g. `H2O`
    pub molecule: String,
    /// A citation for the line list, usually a DOI
    pub reference: String,
    /// Pressures in bar
    pub pressures: Vec<f64>,
    /// Temperatures in K
    pub temperatures: Vec<f64>,
    /// Wavenumbers in cm⁻¹
    pub wavenumbers: Vec<f64>,
    /// Cross-sections in row-major `[pressure][temperature][wavenumber]` order
    pub values: Vec<f64>,
}

impl CrossSectionGrid {
    pub fn new(
        molecule: String,
        reference: String,
        pressures: Vec<f64>,
        temperatures: Vec<f64>,
        wavenumbers: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self, XsecError> {
        let inst = Self {
            molecule,
            reference,
            pressures,
            temperatures,
            wavenumbers,
            values,
        };
        inst.validate()?;
        Ok(inst)
    }

    fn validate(&self) -> Result<(), XsecError> {
        if self.pressures.is_empty() {
            return Err(XsecError::EmptyAxis("pressure"));
        }
        if self.temperatures.is_empty() {
            return Err(XsecError::EmptyAxis("temperature"));
        }
        if self.wavenumbers.is_empty() {
            return Err(XsecError::EmptyAxis("wavenumber"));
        }
        if let Some(p) = self.pressures.iter().find(|p| **p <= 0.0) {
            return Err(XsecError::NonPositivePressure(*p));
        }
        let expected = self.pressures.len() * self.temperatures.len() * self.wavenumbers.len();
        if self.values.len() != expected {
            return Err(XsecError::ShapeMismatch {
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }

    /// The index of the pressure closest to `target` in log space
    pub fn nearest_pressure_index(&self, target: f64) -> Option<usize> {
        let log_target = target.log10();
        argmin(self.pressures.iter().map(|p| (p.log10() - log_target).abs()))
    }

    /// The index of the temperature closest to `target`
    pub fn nearest_temperature_index(&self, target: f64) -> Option<usize> {
        argmin(self.temperatures.iter().map(|t| (t - target).abs()))
    }

    /// The cross-section row at pressure index `p_idx` and temperature index `t_idx`
    pub fn slice(&self, p_idx: usize, t_idx: usize) -> Option<&[f64]> {
        if p_idx >= self.pressures.len() || t_idx >= self.temperatures.len() {
            return None;
        }
        let n = self.wavenumbers.len();
        let offset = (p_idx * self.temperatures.len() + t_idx) * n;
        self.values.get(offset..offset + n)
    }

    /// The wavenumber axis converted to wavelength in metres. The order is kept,
    /// so an ascending wavenumber axis gives a descending wavelength axis.
    pub fn wavelengths(&self) -> Vec<f64> {
        self.wavenumbers
            .iter()
            .copied()
            .map(wavenumber_to_wavelength)
            .collect()
    }
}

/// Which pressure/temperature point to pick and how to bin it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct XsecSelection {
    /// Target pressure in bar
    pub pressure: f64,
    /// Target temperature in K
    pub temperature: f64,
    pub binning: BinningConfig,
}

impl Default for XsecSelection {
    fn default() -> Self {
        Self {
            pressure: 1e-3,
            temperature: 1000.0,
            binning: BinningConfig::resolution(100.0),
        }
    }
}

/// A binned cross-section in ascending wavelength order with its provenance
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PreparedCrossSection {
    /// Wavelength in metres, ascending
    pub wavelength: Vec<f64>,
    pub cross_section: Vec<f64>,
    pub metadata: TableMetadata,
    /// The molecule name formatted for LaTeX labels
    pub latex_name: String,
    pub pressure: f64,
    pub temperature: f64,
}

/// Select the pressure/temperature point closest to `selection`, bin it and
/// turn it around to ascending wavelength. `source_name` is recorded as the
/// originating file in the metadata.
pub fn prepare_cross_section(
    grid: &CrossSectionGrid,
    selection: &XsecSelection,
    source_name: &str,
) -> Result<PreparedCrossSection, XsecError> {
    grid.validate()?;
    if !selection.pressure.is_finite() || selection.pressure <= 0.0 {
        return Err(XsecError::InvalidSelection {
            axis: "pressure",
            value: selection.pressure,
        });
    }
    if !selection.temperature.is_finite() {
        return Err(XsecError::InvalidSelection {
            axis: "temperature",
            value: selection.temperature,
        });
    }
    let p_idx = grid
        .nearest_pressure_index(selection.pressure)
        .ok_or(XsecError::EmptyAxis("pressure"))?;
    let t_idx = grid
        .nearest_temperature_index(selection.temperature)
        .ok_or(XsecError::EmptyAxis("temperature"))?;
    let pressure = grid.pressures[p_idx];
    let temperature = grid.temperatures[t_idx];
    let values = grid
        .slice(p_idx, t_idx)
        .ok_or(XsecError::EmptyAxis("wavenumber"))?;

    let wavelength = grid.wavelengths();
    let descending = wavelength.first() > wavelength.last();
    let (lo, hi) = minmax(&wavelength);
    debug!(
        "Binning {} at p = {pressure} bar, T = {temperature} K over {lo:e} to {hi:e} m",
        grid.molecule
    );

    let binned = bin_series(&wavelength, values, &selection.binning)?;
    let binned = if descending { binned.reversed() } else { binned };
    info!(
        "{}: {} samples binned to {} ({})",
        grid.molecule,
        wavelength.len(),
        binned.len(),
        binned.description
    );

    let metadata = TableMetadata {
        name: grid.molecule.clone(),
        source: grid.reference.clone(),
        from_file: source_name.to_string(),
        selection: format!("Selected xsec at p = {pressure} bar and T = {temperature} K"),
        binning: binned.description.clone(),
    };

    Ok(PreparedCrossSection {
        wavelength: binned.location,
        cross_section: binned.value,
        metadata,
        latex_name: latex_name(&grid.molecule),
        pressure,
        temperature,
    })
}
