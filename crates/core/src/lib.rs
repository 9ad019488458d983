//! Core traits and types for petrosim.
//!
//! This crate defines the shared abstractions that the solvers, the
//! hydraulics engine, and observers build on:
//!
//! - [`Model`] — a callable that maps a typed input to a typed output
//! - [`Snapshot`] — a captured input/output pair from a model call
//! - [`Observer`] — receives solver or driver events and optionally returns
//!   control actions
//! - [`EquationProblem`] — adapts a scalar solver variable to model input and
//!   extracts a residual and its slope from the output
//! - [`constraint`] — numeric wrappers checked once at construction

pub mod constraint;

mod model;
mod observer;
mod problems;

pub use observer::Observer;
pub use problems::EquationProblem;
pub use {model::Model, model::Snapshot};
