//! Reusable observers for petrosim.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work across the Newton rate solver and the depletion driver.
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for cross-solver observers
//!   ([`HasResidual`], [`HasProduction`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`TraceObserver`] logs every event through `tracing`.
//! - [`EconomicLimit`] stops a run when production falls below a floor.
//!
//! [`Observer`]: petrosim_core::Observer
//! [`HasResidual`]: traits::HasResidual
//! [`HasProduction`]: traits::HasProduction
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod limit;
mod trace;

pub use limit::EconomicLimit;
pub use trace::TraceObserver;
