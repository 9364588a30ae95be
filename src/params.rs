//! Mapping between the five physical HOD parameters and the flat vector
//! manipulated by the sampler.
//!
//! Each parameter is either fitted ("free", read from the flat vector) or
//! held at a supplied value ("fixed"). Free parameters get contiguous
//! flat-vector indices assigned in canonical order, and the prior box and
//! walker starting positions are derived from the same mapping, so the
//! sampler, the priors and the initial state cannot disagree on which
//! entry means which parameter.

use crate::error::FitError;

use itertools::zip_eq;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of physical parameters of the HOD model
pub const NPARAMS: usize = 5;

/// The canonical HOD parameters, in the fixed order that determines
/// flat-vector index assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum HodParam {
    /// Halo mass threshold for hosting a central galaxy, log10(M)
    Mmin,
    /// Width of the central occupation step, dex
    SigmaLogM,
    /// Satellite cut-off mass, log10(M)
    M0,
    /// Satellite normalization mass, log10(M)
    M1,
    /// Slope of the satellite power law
    Alpha,
}

impl HodParam {
    pub const ALL: [Self; NPARAMS] = [
        Self::Mmin,
        Self::SigmaLogM,
        Self::M0,
        Self::M1,
        Self::Alpha,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Mmin => "Mmin",
            Self::SigmaLogM => "sigma_logM",
            Self::M0 => "M0",
            Self::M1 => "M1",
            Self::Alpha => "alpha",
        }
    }

    /// Flat prior box, fixed constants independent of the target data
    pub fn prior_bounds(self) -> (f64, f64) {
        match self {
            Self::Mmin => (11.0, 16.0),
            Self::SigmaLogM => (0.0, 4.0),
            Self::M0 => (8.0, 14.0),
            Self::M1 => (11.0, 17.0),
            Self::Alpha => (0.0, 4.0),
        }
    }

    /// Canonical walker starting value
    pub fn initial_value(self) -> f64 {
        match self {
            Self::Mmin => 12.0,
            Self::SigmaLogM => 0.1,
            Self::M0 => 10.0,
            Self::M1 => 13.0,
            Self::Alpha => 0.9,
        }
    }
}

/// Values used for the parameters held out of the fit
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FixedParams {
    pub mmin: f64,
    pub sigma_logm: f64,
    pub m0: f64,
    pub m1: f64,
    pub alpha: f64,
}

impl FixedParams {
    pub fn get(&self, param: HodParam) -> f64 {
        match param {
            HodParam::Mmin => self.mmin,
            HodParam::SigmaLogM => self.sigma_logm,
            HodParam::M0 => self.m0,
            HodParam::M1 => self.m1,
            HodParam::Alpha => self.alpha,
        }
    }
}

impl Default for FixedParams {
    /// The canonical initial values
    fn default() -> Self {
        Self {
            mmin: HodParam::Mmin.initial_value(),
            sigma_logm: HodParam::SigmaLogM.initial_value(),
            m0: HodParam::M0.initial_value(),
            m1: HodParam::M1.initial_value(),
            alpha: HodParam::Alpha.initial_value(),
        }
    }
}

/// Whether a parameter is held fixed or read from the sampler's flat vector
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum ParamState {
    Fixed(f64),
    Free(usize),
}

/// Immutable per-fit configuration: which parameters are free and where
/// each of them lives in the flat parameter vector.
///
/// Built once before sampling and never mutated; all posterior evaluations
/// borrow it read-only, so it is safe to share across walker threads.
/// Changing the selection requires building a new `ParamSpace` — the prior
/// box and initial positions are not independently valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParamSpace {
    states: [ParamState; NPARAMS],
    ndim: usize,
}

impl ParamSpace {
    /// `selection[i]` selects whether `HodParam::ALL[i]` is fitted; the
    /// rest take their values from `fixed`. Free parameters get
    /// flat-vector indices `0..ndim` in canonical order.
    ///
    /// A selection of any other length is a configuration error.
    pub fn new(selection: &[bool], fixed: &FixedParams) -> Result<Self, FitError> {
        if selection.len() != NPARAMS {
            return Err(FitError::SelectionLength {
                actual: selection.len(),
                expected: NPARAMS,
            });
        }
        let mut states = [ParamState::Fixed(0.0); NPARAMS];
        let mut ndim = 0;
        for (state, (&free, &param)) in
            zip_eq(states.iter_mut(), zip_eq(selection, HodParam::ALL.iter()))
        {
            *state = if free {
                let index = ndim;
                ndim += 1;
                ParamState::Free(index)
            } else {
                ParamState::Fixed(fixed.get(param))
            };
        }
        Ok(Self { states, ndim })
    }

    /// All five parameters fitted
    pub fn all_free() -> Self {
        let mut states = [ParamState::Free(0); NPARAMS];
        for (index, state) in states.iter_mut().enumerate() {
            *state = ParamState::Free(index);
        }
        Self {
            states,
            ndim: NPARAMS,
        }
    }

    /// Length of the flat parameter vector
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn state(&self, param: HodParam) -> ParamState {
        self.states[param as usize]
    }

    /// Position in the flat vector, `None` for fixed parameters
    pub fn index(&self, param: HodParam) -> Option<usize> {
        match self.state(param) {
            ParamState::Free(index) => Some(index),
            ParamState::Fixed(_) => None,
        }
    }

    /// Resolve a parameter against the sampler's flat vector
    pub fn value(&self, param: HodParam, theta: &[f64]) -> f64 {
        debug_assert_eq!(theta.len(), self.ndim);
        match self.state(param) {
            ParamState::Fixed(value) => value,
            ParamState::Free(index) => theta[index],
        }
    }

    fn free_params(&self) -> impl Iterator<Item = HodParam> + '_ {
        HodParam::ALL
            .into_iter()
            .filter(|&param| self.index(param).is_some())
    }

    /// Lower prior bounds, one entry per free parameter, in flat-vector order
    pub fn lower_bounds(&self) -> Vec<f64> {
        self.free_params()
            .map(|param| param.prior_bounds().0)
            .collect()
    }

    /// Upper prior bounds, one entry per free parameter, in flat-vector order
    pub fn upper_bounds(&self) -> Vec<f64> {
        self.free_params()
            .map(|param| param.prior_bounds().1)
            .collect()
    }

    /// Walker starting positions, one entry per free parameter, in
    /// flat-vector order
    pub fn initial(&self) -> Vec<f64> {
        self.free_params()
            .map(|param| param.initial_value())
            .collect()
    }

    /// Flat prior: zero inside the prior box, `-inf` outside
    pub fn ln_prior(&self, theta: &[f64]) -> f64 {
        for param in self.free_params() {
            let (lower, upper) = param.prior_bounds();
            let value = self.value(param, theta);
            if value < lower || value > upper {
                return f64::NEG_INFINITY;
            }
        }
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(selection: &[bool]) -> ParamSpace {
        ParamSpace::new(selection, &FixedParams::default()).unwrap()
    }

    #[test]
    fn wrong_selection_length_is_rejected() {
        let err = ParamSpace::new(&[true; 4], &FixedParams::default()).unwrap_err();
        assert_eq!(
            err,
            FitError::SelectionLength {
                actual: 4,
                expected: NPARAMS
            }
        );
        assert!(ParamSpace::new(&[true; 6], &FixedParams::default()).is_err());
    }

    #[test]
    fn free_count_and_index_contiguity() {
        for bits in 0..(1 << NPARAMS) {
            let selection: Vec<bool> = (0..NPARAMS).map(|i| bits & (1 << i) != 0).collect();
            let space = space(&selection);
            let k = selection.iter().filter(|&&free| free).count();
            assert_eq!(space.ndim(), k);

            let mut indices: Vec<usize> = HodParam::ALL
                .iter()
                .filter_map(|&param| space.index(param))
                .collect();
            // Assigned in increasing canonical order and contiguous
            assert!(indices.windows(2).all(|w| w[1] == w[0] + 1));
            indices.sort_unstable();
            assert_eq!(indices, (0..k).collect::<Vec<_>>());
        }
    }

    #[test]
    fn sigma_and_m1_free_scenario() {
        let space = space(&[false, true, false, true, false]);
        assert_eq!(space.ndim(), 2);
        assert_eq!(space.index(HodParam::SigmaLogM), Some(0));
        assert_eq!(space.index(HodParam::M1), Some(1));
        assert_eq!(space.index(HodParam::Mmin), None);
        assert_eq!(space.index(HodParam::M0), None);
        assert_eq!(space.index(HodParam::Alpha), None);

        // Fixed parameters ignore the flat vector contents
        let theta = [3.3, 15.5];
        assert_eq!(space.value(HodParam::SigmaLogM, &theta), 3.3);
        assert_eq!(space.value(HodParam::M1, &theta), 15.5);
        assert_eq!(space.value(HodParam::Mmin, &theta), 12.0);
        assert_eq!(space.value(HodParam::M0, &theta), 10.0);
        assert_eq!(space.value(HodParam::Alpha, &theta), 0.9);
    }

    #[test]
    fn fixing_one_parameter_resequences_later_indices() {
        let all = space(&[true; NPARAMS]);
        let without_m0 = space(&[true, true, false, true, true]);

        assert_eq!(without_m0.ndim(), all.ndim() - 1);
        assert_eq!(without_m0.index(HodParam::Mmin), Some(0));
        assert_eq!(without_m0.index(HodParam::SigmaLogM), Some(1));
        assert_eq!(without_m0.index(HodParam::M0), None);
        // M1 and alpha shift down by one
        assert_eq!(without_m0.index(HodParam::M1), Some(2));
        assert_eq!(without_m0.index(HodParam::Alpha), Some(3));
    }

    #[test]
    fn bounds_and_initial_rows_describe_the_same_parameter() {
        for selection in [
            [true; NPARAMS],
            [false, true, false, true, false],
            [true, false, false, false, true],
        ] {
            let space = space(&selection);
            let lower = space.lower_bounds();
            let upper = space.upper_bounds();
            let init = space.initial();
            assert_eq!(lower.len(), space.ndim());
            assert_eq!(upper.len(), space.ndim());
            assert_eq!(init.len(), space.ndim());
            for i in 0..space.ndim() {
                assert!(lower[i] <= init[i] && init[i] <= upper[i]);
            }
        }
    }

    #[test]
    fn all_free_matches_explicit_selection() {
        assert_eq!(space(&[true; NPARAMS]), ParamSpace::all_free());
    }

    #[test]
    fn flat_prior_rejects_out_of_box() {
        let space = ParamSpace::all_free();
        let inside: Vec<f64> = space.initial();
        assert_eq!(space.ln_prior(&inside), 0.0);

        let mut outside = inside.clone();
        outside[0] = 10.0; // Mmin below its lower bound of 11
        assert_eq!(space.ln_prior(&outside), f64::NEG_INFINITY);

        let mut above = inside;
        above[4] = 4.5; // alpha above its upper bound of 4
        assert_eq!(space.ln_prior(&above), f64::NEG_INFINITY);
    }

    #[test]
    fn parameter_names() {
        let names: Vec<_> = HodParam::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["Mmin", "sigma_logM", "M0", "M1", "alpha"]);
    }
}
