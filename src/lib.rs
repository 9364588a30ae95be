#![doc = include_str!("../README.md")]

mod error;
pub use error::FitError;

pub mod kernel;
pub use kernel::{cumulative_spline_kernel, cumulative_spline_kernel_arr, spline_kernel_integral};

mod params;
pub use params::{FixedParams, HodParam, NPARAMS, ParamSpace, ParamState};

mod hod;
pub use hod::{central_occupation, log_mass_grid, satellite_occupation};

mod likelihood;
pub use likelihood::{
    ClusteringLikelihood, DEFAULT_CLUSTERING_ERR, DEFAULT_FIT_BINS, DEFAULT_NUMBER_DENSITY_ERR,
    NumberDensityLikelihood,
};

mod target;
pub use target::FitTarget;

mod mcmc;
pub use mcmc::{
    ClusteringModel, ClusteringPrediction, FitResult, HodPosterior, McmcHodFit, WalkerInit,
};

pub use ndarray;
