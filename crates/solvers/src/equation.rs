//! Solvers for equation problems — finding roots of scalar equations.
//!
//! An [`EquationProblem`] maps a solver variable `x` to a model input, calls
//! the model, and computes a residual and its slope. Solvers in this module
//! drive that residual toward zero.
//!
//! # Solvers
//!
//! - [`newton`] — bounded, safeguarded Newton–Raphson iteration
//!
//! [`EquationProblem`]: petrosim_core::EquationProblem

mod evaluate;

pub use evaluate::{EvalError, EvaluateResult, Evaluation, evaluate};

pub mod newton;
