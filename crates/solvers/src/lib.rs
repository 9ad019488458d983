//! Numerical solvers for petrosim.
//!
//! Solvers operate on a [`Model`] paired with a problem trait from
//! `petrosim-core`, and report progress to an [`Observer`].
//!
//! # Modules
//!
//! - [`equation`] — root finding for scalar equation problems
//!
//! [`Model`]: petrosim_core::Model
//! [`Observer`]: petrosim_core::Observer

pub mod equation;
