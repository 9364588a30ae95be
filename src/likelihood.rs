//! Likelihood terms combined into the log-posterior: the clustering term
//! over the retained separation bins and the additive number-density
//! constraint. Both use fractional residuals with a constant noise scale.

use crate::error::FitError;

use itertools::zip_eq;
use ndarray::{Array1, ArrayView1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of separation bins retained by default; everything beyond lies
/// at the BAO scale and is excluded from the fit.
pub const DEFAULT_FIT_BINS: usize = 75;

/// Default fractional error on every retained correlation-function bin.
/// Values below ~0.1 sharpen the posterior enough that walkers get stuck
/// in local minima.
pub const DEFAULT_CLUSTERING_ERR: f64 = 0.7;

/// Default noise scale of the number-density constraint
pub const DEFAULT_NUMBER_DENSITY_ERR: f64 = 0.1;

/// Fractional-residual likelihood of a predicted correlation function
/// against the target one:
/// `-0.5 * sum((1 - model/target)^2) / frac_err^2` over the first
/// `fit_bins` separation bins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClusteringLikelihood {
    target: Array1<f64>,
    frac_err: f64,
    fit_bins: usize,
}

impl ClusteringLikelihood {
    pub fn new(target: Array1<f64>, frac_err: f64, fit_bins: usize) -> Result<Self, FitError> {
        if frac_err <= 0.0 {
            return Err(FitError::NonPositive {
                what: "clustering fractional error",
                value: frac_err,
            });
        }
        Ok(Self {
            target,
            frac_err,
            fit_bins,
        })
    }

    /// The standard fit setup: first [`DEFAULT_FIT_BINS`] bins with a
    /// fractional error of [`DEFAULT_CLUSTERING_ERR`]
    pub fn with_defaults(target: Array1<f64>) -> Self {
        Self {
            target,
            frac_err: DEFAULT_CLUSTERING_ERR,
            fit_bins: DEFAULT_FIT_BINS,
        }
    }

    pub fn target(&self) -> ArrayView1<f64> {
        self.target.view()
    }

    /// Number of bins actually entering the sum; the configured cut capped
    /// at the target length
    pub fn fit_bins(&self) -> usize {
        self.fit_bins.min(self.target.len())
    }

    /// Log-likelihood of a predicted correlation function.
    ///
    /// The model must cover at least [`Self::fit_bins`] bins; a shorter
    /// model is a contract violation and panics. A zero target bin inside
    /// the retained range makes the result non-finite; this is not
    /// guarded, the sampler rejects the proposal.
    pub fn ln_likelihood(&self, model: ArrayView1<f64>) -> f64 {
        let nbins = self.fit_bins();
        let chi2: f64 = zip_eq(
            model.iter().take(nbins),
            self.target.iter().take(nbins),
        )
        .map(|(&model_xi, &target_xi)| (1.0 - model_xi / target_xi).powi(2))
        .sum();
        -0.5 * chi2 / self.frac_err.powi(2)
    }
}

/// Fractional-residual likelihood of the predicted galaxy number density
/// against the target one
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumberDensityLikelihood {
    target: f64,
    err: f64,
}

impl NumberDensityLikelihood {
    pub fn new(target: f64, err: f64) -> Result<Self, FitError> {
        if err <= 0.0 {
            return Err(FitError::NonPositive {
                what: "number density error",
                value: err,
            });
        }
        Ok(Self { target, err })
    }

    /// Noise scale [`DEFAULT_NUMBER_DENSITY_ERR`]
    pub fn with_defaults(target: f64) -> Self {
        Self {
            target,
            err: DEFAULT_NUMBER_DENSITY_ERR,
        }
    }

    pub fn ln_likelihood(&self, model: f64) -> f64 {
        -0.5 * (1.0 - model / self.target).powi(2) / self.err.powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn non_positive_errors_are_rejected() {
        assert!(ClusteringLikelihood::new(Array1::ones(10), 0.0, 5).is_err());
        assert!(ClusteringLikelihood::new(Array1::ones(10), -0.7, 5).is_err());
        assert!(NumberDensityLikelihood::new(1e-3, 0.0).is_err());
    }

    #[test]
    fn exact_match_gives_zero() {
        let target = Array1::linspace(10.0, 1.0, 100);
        let likelihood = ClusteringLikelihood::with_defaults(target.clone());
        assert_eq!(likelihood.ln_likelihood(target.view()), 0.0);

        let num_den = NumberDensityLikelihood::with_defaults(3.2e-3);
        assert_eq!(num_den.ln_likelihood(3.2e-3), 0.0);
    }

    #[test]
    fn bins_beyond_the_cut_are_ignored() {
        let target = Array1::ones(100);
        let likelihood = ClusteringLikelihood::with_defaults(target);
        let mut model = Array1::ones(100);
        // Perturbing excluded bins changes nothing
        for i in DEFAULT_FIT_BINS..100 {
            model[i] = 1e6;
        }
        assert_eq!(likelihood.ln_likelihood(model.view()), 0.0);
        // Perturbing a retained bin does
        model[0] = 2.0;
        assert!(likelihood.ln_likelihood(model.view()) < 0.0);
    }

    #[test]
    fn matches_direct_formula() {
        let target = Array1::from(vec![2.0, 4.0, 8.0]);
        let likelihood = ClusteringLikelihood::new(target, 0.7, 75).unwrap();
        let model = Array1::from(vec![1.0, 4.0, 10.0]);
        let expected = -0.5 * ((1.0 - 0.5_f64).powi(2) + (1.0 - 1.25_f64).powi(2)) / 0.7_f64.powi(2);
        assert_relative_eq!(
            likelihood.ln_likelihood(model.view()),
            expected,
            epsilon = 1e-15,
        );
    }

    #[test]
    fn short_target_caps_the_cut() {
        // Python slice semantics: a 3-bin target with a 75-bin cut uses 3 bins
        let target = Array1::from(vec![1.0, 2.0, 3.0]);
        let likelihood = ClusteringLikelihood::with_defaults(target.clone());
        assert_eq!(likelihood.fit_bins(), 3);
        assert_eq!(likelihood.ln_likelihood(target.view()), 0.0);
    }

    #[test]
    fn zero_target_bin_is_non_finite() {
        let target = Array1::from(vec![1.0, 0.0, 3.0]);
        let likelihood = ClusteringLikelihood::with_defaults(target);
        let model = Array1::from(vec![1.0, 1.0, 3.0]);
        assert!(!likelihood.ln_likelihood(model.view()).is_finite());
    }

    #[test]
    fn noisy_model_is_penalized_but_finite() {
        use rand::prelude::*;
        use rand_distr::StandardNormal;

        let mut rng = StdRng::seed_from_u64(0);
        let target = Array1::linspace(10.0, 1.0, 80);
        let likelihood = ClusteringLikelihood::with_defaults(target.clone());
        let model =
            target.mapv(|y| y * (1.0 + 0.05 * rng.sample::<f64, _>(StandardNormal)));
        let lnlike = likelihood.ln_likelihood(model.view());
        assert!(lnlike.is_finite());
        assert!(lnlike < 0.0);
    }

    #[test]
    fn number_density_term_is_symmetric_in_fractional_residual() {
        let num_den = NumberDensityLikelihood::new(1e-3, 0.1).unwrap();
        let expected = -0.5 * 0.04 / 0.01; // 20% offset, err 0.1
        assert_relative_eq!(num_den.ln_likelihood(0.8e-3), expected, epsilon = 1e-12);
        assert_relative_eq!(num_den.ln_likelihood(1.2e-3), expected, epsilon = 1e-12);
    }
}
