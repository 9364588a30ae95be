/// Error returned from fit configuration and the MCMC driver
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FitError {
    #[error("parameter selection length is {actual}, expected {expected}")]
    SelectionLength { actual: usize, expected: usize },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("MCMC sampler failed: {0}")]
    Sampler(String),
}
