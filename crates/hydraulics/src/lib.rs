//! Reservoir depletion and well deliverability.
//!
//! The engine models a reservoir as a set of material-balance [`VolumeCell`]s
//! joined by [`VolumeCellConnection`]s, produced by [`Well`]s that balance
//! reservoir inflow (a quadratic IPR, see [`LayerWellConnection`]) against a
//! tubing pressure-drop correlation (see [`well_flow`]).
//!
//! A [`Reservoir`] owns every cell and hands out [`CellId`] handles, so cells
//! can be shared by several connections and wells. [`Reservoir::step`]
//! advances one timestep in two phases: every transfer and withdrawal is
//! planned against the same read-only state, then committed together. The
//! [`simulation`] driver repeats that step and reports to an observer.
//!
//! Units are engine units throughout: pressure in bar, volume in 1000 m³,
//! rate in 1000 m³/day, time in days, water–gas ratio in g/m³. Well geometry
//! is passed as [`uom`] lengths.

mod cell;
mod connection;
mod error;
mod layer;
mod reservoir;
mod well;

pub mod config;
pub mod generate;
pub mod simulation;
pub mod well_flow;

pub use cell::{CellId, Cells, MAX_WGR, VolumeCell};
pub use connection::{Transfer, VolumeCellConnection};
pub use error::Error;
pub use layer::LayerWellConnection;
pub use reservoir::{
    ConnectionId, Reservoir, StepReport, TransferOutcome, WellControl, WellControls, WellId,
    WellOutcome,
};
pub use well::{BalancePoint, NON_FLOWING_RATE, Well, WellGeometry, WellMode, WellRate};
