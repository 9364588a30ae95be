//! Log-posterior assembly and the ensemble MCMC driver.
//!
//! The posterior is a pure function of the flat parameter vector; the
//! sampler proposes vectors and receives log-probabilities, nothing else
//! crosses the boundary. Predicted occupations are turned into clustering
//! statistics by an external pair-counting collaborator behind
//! [`ClusteringModel`].

use crate::error::FitError;
use crate::hod::{central_occupation, satellite_occupation};
use crate::likelihood::{ClusteringLikelihood, NumberDensityLikelihood};
use crate::params::ParamSpace;

use emcee::{EnsembleSampler, Guess, Prob};
use emcee_rand::{Rng, SeedableRng, StdRng};
use itertools::zip_eq;
use ndarray::{Array1, ArrayView1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Clustering statistics implied by a pair of occupation arrays
#[derive(Clone, Debug)]
pub struct ClusteringPrediction {
    /// Predicted correlation function, one entry per separation bin
    pub correlation: Array1<f64>,
    /// Predicted galaxy number density
    pub number_density: f64,
}

/// Seam to the pair-counting collaborator: converts per-mass-bin central
/// and satellite occupations into predicted clustering statistics.
///
/// Implementations are called once per posterior evaluation and must be
/// pure; the sampler may run walkers in parallel.
pub trait ClusteringModel {
    fn predict(
        &self,
        central: ArrayView1<f64>,
        satellite: ArrayView1<f64>,
    ) -> ClusteringPrediction;
}

/// The log-posterior the sampler evaluates at every step.
///
/// Owns the immutable fit configuration and the target likelihood terms;
/// every method is a stateless function of `theta`, safe to call
/// concurrently.
pub struct HodPosterior<M> {
    space: ParamSpace,
    mass: Array1<f64>,
    model: M,
    clustering: ClusteringLikelihood,
    number_density: Option<NumberDensityLikelihood>,
}

impl<M> HodPosterior<M>
where
    M: ClusteringModel,
{
    pub fn new(
        space: ParamSpace,
        mass: Array1<f64>,
        model: M,
        clustering: ClusteringLikelihood,
        number_density: Option<NumberDensityLikelihood>,
    ) -> Self {
        Self {
            space,
            mass,
            model,
            clustering,
            number_density,
        }
    }

    pub fn space(&self) -> &ParamSpace {
        &self.space
    }

    /// Flat prior over the canonical bounds of the free parameters
    pub fn ln_prior(&self, theta: &[f64]) -> f64 {
        self.space.ln_prior(theta)
    }

    /// Clustering log-likelihood plus the optional number-density term.
    ///
    /// Out-of-domain proposals (e.g. mass bins below `10^M0`) surface as
    /// NaN from the occupation functions; any non-finite total is
    /// reported as `-inf`, the standard rejection signal.
    pub fn ln_likelihood(&self, theta: &[f64]) -> f64 {
        let central = central_occupation(&self.space, theta, self.mass.view());
        let satellite =
            satellite_occupation(&self.space, theta, central.view(), self.mass.view());
        let prediction = self.model.predict(central.view(), satellite.view());

        let mut lnlike = self.clustering.ln_likelihood(prediction.correlation.view());
        if let Some(number_density) = &self.number_density {
            lnlike += number_density.ln_likelihood(prediction.number_density);
        }
        if lnlike.is_finite() {
            lnlike
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Log-posterior: prior plus likelihood, skipping the likelihood
    /// entirely for proposals outside the prior box
    pub fn ln_prob(&self, theta: &[f64]) -> f64 {
        let lnprior = self.ln_prior(theta);
        if lnprior.is_finite() {
            lnprior + self.ln_likelihood(theta)
        } else {
            f64::NEG_INFINITY
        }
    }
}

/// How walker starting positions are drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum WalkerInit {
    /// Tight ball around the canonical initial values
    NearInitial,
    /// Uniform over the prior box
    UniformPrior,
}

/// Ensemble MCMC driver for the HOD fit.
///
/// Wraps the affine-invariant emcee sampler: seeds `nwalkers` walkers,
/// advances each for `niterations` steps and returns the
/// maximum-posterior sample of the flattened chain.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct McmcHodFit {
    pub nwalkers: usize,
    pub niterations: usize,
    pub walker_init: WalkerInit,
    pub random_seed: usize,
}

impl McmcHodFit {
    pub fn new(nwalkers: usize, niterations: usize) -> Self {
        Self {
            nwalkers,
            niterations,
            walker_init: Self::default_walker_init(),
            random_seed: Self::default_random_seed(),
        }
    }

    #[inline]
    pub fn default_nwalkers() -> usize {
        20
    }

    #[inline]
    pub fn default_niterations() -> usize {
        5000
    }

    #[inline]
    pub fn default_walker_init() -> WalkerInit {
        WalkerInit::NearInitial
    }

    #[inline]
    pub fn default_random_seed() -> usize {
        10
    }

    /// Run the sampler against the posterior and return the best sample
    /// of the flattened chain
    pub fn run<M>(&self, posterior: &HodPosterior<M>) -> Result<FitResult, FitError>
    where
        M: ClusteringModel,
    {
        let ndim = posterior.space().ndim();
        let mut rng = StdRng::from_seed(&[self.random_seed]);
        let walkers = self.initial_walkers(posterior.space(), &mut rng);

        let model = EmceePosterior { posterior };
        let mut sampler = EnsembleSampler::new(self.nwalkers, ndim, &model)
            .map_err(|err| FitError::Sampler(err.to_string()))?;
        sampler
            .run_mcmc(&walkers, self.niterations)
            .map_err(|err| FitError::Sampler(err.to_string()))?;

        let mut best = FitResult {
            params: posterior.space().initial(),
            ln_prob: f64::NEG_INFINITY,
        };
        best.ln_prob = posterior.ln_prob(&best.params);
        for guess in sampler.flatchain() {
            let theta = theta_from_guess(&guess);
            let ln_prob = posterior.ln_prob(&theta);
            if ln_prob > best.ln_prob {
                best = FitResult {
                    params: theta,
                    ln_prob,
                };
            }
        }
        Ok(best)
    }

    fn initial_walkers(&self, space: &ParamSpace, rng: &mut StdRng) -> Vec<Guess> {
        let initial = space.initial();
        let lower = space.lower_bounds();
        let upper = space.upper_bounds();
        (0..self.nwalkers)
            .map(|_| {
                let values: Vec<f32> = match self.walker_init {
                    WalkerInit::NearInitial => initial
                        .iter()
                        .map(|&x| (x + 1e-4 * (rng.next_f64() - 0.5)) as f32)
                        .collect(),
                    WalkerInit::UniformPrior => zip_eq(lower.iter(), upper.iter())
                        .map(|(&lo, &hi)| rng.gen_range(lo, hi) as f32)
                        .collect(),
                };
                Guess::new(&values)
            })
            .collect()
    }
}

impl Default for McmcHodFit {
    fn default() -> Self {
        Self::new(Self::default_nwalkers(), Self::default_niterations())
    }
}

/// Maximum-posterior sample found by [`McmcHodFit`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Flat parameter vector, ordered by the fit's [`ParamSpace`]
    pub params: Vec<f64>,
    pub ln_prob: f64,
}

fn theta_from_guess(guess: &Guess) -> Vec<f64> {
    guess.values.iter().map(|&v| v as f64).collect()
}

// emcee works in f32, the posterior in f64; convert at the boundary
struct EmceePosterior<'a, M> {
    posterior: &'a HodPosterior<M>,
}

impl<M> Prob for EmceePosterior<'_, M>
where
    M: ClusteringModel,
{
    fn lnlike(&self, params: &Guess) -> f32 {
        self.posterior.ln_likelihood(&theta_from_guess(params)) as f32
    }

    fn lnprior(&self, params: &Guess) -> f32 {
        self.posterior.ln_prior(&theta_from_guess(params)) as f32
    }
}
