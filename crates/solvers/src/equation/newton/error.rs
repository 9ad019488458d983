use std::error::Error as StdError;

use thiserror::Error;

use crate::equation::EvalError;

use super::config::ConfigError;

/// Errors that can occur during Newton solving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid bounds: [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },

    #[error("starting point {x} is not finite or lies outside the bounds")]
    InvalidStart { x: f64 },

    #[error("problem error")]
    Problem(#[source] Box<dyn StdError + Send + Sync>),

    #[error("model call failed")]
    Model(#[source] Box<dyn StdError + Send + Sync>),

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },

    #[error("non-finite derivative {derivative} at x = {x}")]
    NonFiniteDerivative { x: f64, derivative: f64 },

    #[error("zero derivative at x = {x}")]
    ZeroDerivative { x: f64 },

    #[error("residual stopped improving after {iters} iterations: f({x}) = {residual}")]
    Diverged { x: f64, residual: f64, iters: usize },
}

impl<ME, PE> From<EvalError<ME, PE>> for Error
where
    ME: StdError + Send + Sync + 'static,
    PE: StdError + Send + Sync + 'static,
{
    fn from(err: EvalError<ME, PE>) -> Self {
        match err {
            EvalError::Model(e) => Self::Model(Box::new(e)),
            EvalError::Problem(e) => Self::Problem(Box::new(e)),
        }
    }
}
