//! Empirical tubing performance correlation.
//!
//! The pressure drop from the well bottom to the tubing head is split into a
//! static head that grows with tubing pressure and water content, and a
//! friction term linear in rate:
//!
//! ```text
//! Δp = (0.04·thp + 1.2)(1 + 0.0025·wgr)·tvd/700 + 0.025·q·(0.0275/d² − 1.8871)·md/1200
//! ```
//!
//! with pressures in bar, `wgr` in g/m³, `q` in 1000 m³/day and lengths in
//! metres. The correlation was fitted on a reference well of 1200 m measured
//! and 700 m vertical depth.

use uom::si::length::meter;

use crate::{Error, WellGeometry, error::ensure_non_negative};

const THP_FACTOR: f64 = 0.04;
const THP_OFFSET: f64 = 1.2;
const WGR_FACTOR: f64 = 0.0025;
const RATE_FACTOR: f64 = 0.025;
const DIAMETER_FACTOR: f64 = 0.0275;
const DIAMETER_OFFSET: f64 = -1.8871;
const REFERENCE_MEASURED_DEPTH: f64 = 1200.0;
const REFERENCE_VERTICAL_DEPTH: f64 = 700.0;

/// Pressure drop along the tubing, in bar, for gas flowing at `rate`.
///
/// The bottom-hole pressure of the well is `thp + pressure_gradient(..)`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if any input is negative or not finite.
pub fn pressure_gradient(
    thp: f64,
    wgr: f64,
    rate: f64,
    geometry: &WellGeometry,
) -> Result<f64, Error> {
    let thp = ensure_non_negative("thp", thp)?;
    let wgr = ensure_non_negative("wgr", wgr)?;
    let rate = ensure_non_negative("rate", rate)?;

    Ok(static_head(thp, wgr, geometry) + friction(geometry) * rate)
}

/// Slope of [`pressure_gradient`] with respect to rate.
///
/// Constant for a given geometry, and negative for tubing wider than about
/// 121 mm.
#[must_use]
pub fn pressure_rate_derivative(geometry: &WellGeometry) -> f64 {
    friction(geometry)
}

/// Rate at which the tubing carries gas from `bhp` at the bottom to `thp` at
/// the head.
///
/// The result is negative when `bhp` cannot even lift the static column.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for negative inputs and
/// [`Error::NonFinite`] for a tubing diameter at which friction vanishes.
pub fn rate(thp: f64, bhp: f64, wgr: f64, geometry: &WellGeometry) -> Result<f64, Error> {
    let thp = ensure_non_negative("thp", thp)?;
    let bhp = ensure_non_negative("bhp", bhp)?;
    let wgr = ensure_non_negative("wgr", wgr)?;

    finite(
        "rate",
        (bhp - thp - static_head(thp, wgr, geometry)) / friction(geometry),
    )
}

/// Tubing head pressure of a well flowing at `rate` from `bhp`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for negative inputs.
pub fn tubing_pressure(
    bhp: f64,
    wgr: f64,
    rate: f64,
    geometry: &WellGeometry,
) -> Result<f64, Error> {
    let bhp = ensure_non_negative("bhp", bhp)?;
    let wgr = ensure_non_negative("wgr", wgr)?;
    let rate = ensure_non_negative("rate", rate)?;

    let column = water_loading(wgr) * depth_ratio(geometry);
    finite(
        "tubing_pressure",
        (bhp - friction(geometry) * rate - THP_OFFSET * column) / (1.0 + THP_FACTOR * column),
    )
}

fn static_head(thp: f64, wgr: f64, geometry: &WellGeometry) -> f64 {
    (THP_FACTOR * thp + THP_OFFSET) * water_loading(wgr) * depth_ratio(geometry)
}

fn water_loading(wgr: f64) -> f64 {
    1.0 + WGR_FACTOR * wgr
}

fn depth_ratio(geometry: &WellGeometry) -> f64 {
    geometry.vertical_depth().get::<meter>() / REFERENCE_VERTICAL_DEPTH
}

fn friction(geometry: &WellGeometry) -> f64 {
    let d = geometry.inner_diameter().get::<meter>();
    let md = geometry.measured_depth().get::<meter>();
    RATE_FACTOR * (DIAMETER_FACTOR / (d * d) + DIAMETER_OFFSET) * md / REFERENCE_MEASURED_DEPTH
}

fn finite(quantity: &'static str, value: f64) -> Result<f64, Error> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::NonFinite { quantity })
    }
}
