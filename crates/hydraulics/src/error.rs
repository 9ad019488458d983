use petrosim_core::constraint::{Constrained, Constraint, ConstraintError};
use petrosim_solvers::equation::newton;
use thiserror::Error;

use crate::{CellId, WellId};

/// Errors raised by the hydraulics engine.
///
/// Depletion and non-flowing wells are ordinary outcomes and are reported
/// through return values, never through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// A physical quantity was negative, zero, or not a number where that is
    /// not allowed.
    #[error("invalid argument `{name}` = {value}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The requested rate exceeds what the layer can deliver at zero
    /// bottom-hole pressure.
    #[error("rate {rate} exceeds the maximum deliverable rate {max_rate}")]
    RateOutOfDomain { rate: f64, max_rate: f64 },

    /// A correlation produced a non-finite value.
    #[error("{quantity} is not finite")]
    NonFinite { quantity: &'static str },

    #[error("unknown {0}")]
    UnknownCell(CellId),

    #[error("unknown {0}")]
    UnknownWell(WellId),

    /// The well rate solve failed.
    #[error("well rate solve did not converge")]
    NonConvergence(#[from] newton::Error),

    /// The well rate solve ran out of iterations or was stopped before
    /// meeting its tolerance.
    #[error("well rate solve stopped ({status:?}) at rate {rate} with residual {residual}")]
    IterationLimit {
        status: newton::Status,
        rate: f64,
        residual: f64,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidArgument {
            name,
            value,
            reason,
        }
    }

    /// Returns true for either flavour of failed well rate solve.
    #[must_use]
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, Self::NonConvergence(_) | Self::IterationLimit { .. })
    }
}

/// Checks that `value` is a finite, non-negative number.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_nan() {
        return Err(Error::invalid(name, value, "is not a number"));
    }
    if value < 0.0 {
        return Err(Error::invalid(name, value, "must not be negative"));
    }
    if value.is_infinite() {
        return Err(Error::invalid(name, value, "must be finite"));
    }
    Ok(value)
}

/// Wraps a finite value in a [`Constrained`], naming it in any error.
pub(crate) fn constrained<C: Constraint<f64>>(
    name: &'static str,
    value: f64,
) -> Result<Constrained<f64, C>, Error> {
    if value.is_infinite() {
        return Err(Error::invalid(name, value, "must be finite"));
    }
    Constrained::new(value).map_err(|err| Error::invalid(name, value, reason(err)))
}

pub(crate) fn reason(err: ConstraintError) -> &'static str {
    match err {
        ConstraintError::Negative => "must not be negative",
        ConstraintError::Zero => "must not be zero",
        ConstraintError::NotANumber => "is not a number",
        _ => "violates a numeric constraint",
    }
}
