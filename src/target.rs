//! Fit targets produced by the pair-counting collaborators.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Target data for a fit: a table of correlation functions (separation
/// bins × mass-bin columns) and a galaxy number density.
///
/// Loaded once before fitting, optionally rescaled by the precomputed
/// cosmology factor, then read-only for the lifetime of the fit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FitTarget {
    correlation: Array2<f64>,
    number_density: f64,
}

impl FitTarget {
    pub fn new(correlation: Array2<f64>, number_density: f64) -> Self {
        Self {
            correlation,
            number_density,
        }
    }

    /// Apply the precomputed cosmology rescaling factor to every
    /// correlation column before fitting
    pub fn rescaled(mut correlation: Array2<f64>, number_density: f64, cosmo_factor: f64) -> Self {
        correlation *= cosmo_factor;
        Self {
            correlation,
            number_density,
        }
    }

    pub fn number_density(&self) -> f64 {
        self.number_density
    }

    pub fn n_separation_bins(&self) -> usize {
        self.correlation.nrows()
    }

    pub fn n_columns(&self) -> usize {
        self.correlation.ncols()
    }

    /// One target correlation function, e.g. one mass-bin or
    /// projected-distance variant
    pub fn column(&self, index: usize) -> Array1<f64> {
        self.correlation.column(index).to_owned()
    }
}
