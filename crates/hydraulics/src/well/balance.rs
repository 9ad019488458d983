use std::convert::Infallible;

use petrosim_core::{EquationProblem, Model};

use crate::{Cells, Error, LayerWellConnection, WellGeometry, well_flow};

/// Bottom-hole pressures seen from the reservoir and from the tubing at one
/// trial rate, with their slopes in rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePoint {
    /// Pressure at which the layer delivers the trial rate.
    pub layer_bhp: f64,
    /// Pressure needed to lift the trial rate to the tubing head.
    pub well_bhp: f64,
    pub layer_slope: f64,
    pub well_slope: f64,
}

impl BalancePoint {
    /// Pressure surplus of the reservoir over the tubing, zero at the
    /// operating point.
    #[must_use]
    pub fn residual(&self) -> f64 {
        self.layer_bhp - self.well_bhp
    }

    #[must_use]
    pub fn slope(&self) -> f64 {
        self.layer_slope - self.well_slope
    }
}

/// Inflow and tubing curves of one well, evaluated at a trial rate.
pub(super) struct WellBalance<'a> {
    pub(super) layer: &'a LayerWellConnection,
    pub(super) geometry: &'a WellGeometry,
    pub(super) cells: &'a Cells,
    pub(super) thp: f64,
    pub(super) wgr: f64,
}

impl Model for WellBalance<'_> {
    type Input = f64;
    type Output = BalancePoint;
    type Error = Error;

    fn call(&self, rate: &f64) -> Result<BalancePoint, Error> {
        Ok(BalancePoint {
            layer_bhp: self.layer.estimate_pressure(self.cells, *rate)?,
            well_bhp: self.thp
                + well_flow::pressure_gradient(self.thp, self.wgr, *rate, self.geometry)?,
            layer_slope: self.layer.estimate_pressure_rate_derivative(self.cells, *rate)?,
            well_slope: well_flow::pressure_rate_derivative(self.geometry),
        })
    }
}

/// Drives the inflow and tubing bottom-hole pressures together.
pub(super) struct PressureMatch;

impl EquationProblem for PressureMatch {
    type Input = f64;
    type Output = BalancePoint;
    type Error = Infallible;

    fn input(&self, x: f64) -> Result<f64, Infallible> {
        Ok(x)
    }

    fn residual(&self, _rate: &f64, point: &BalancePoint) -> Result<f64, Infallible> {
        Ok(point.residual())
    }

    fn derivative(&self, _rate: &f64, point: &BalancePoint) -> Result<f64, Infallible> {
        Ok(point.slope())
    }
}
