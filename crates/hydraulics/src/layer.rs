use petrosim_core::constraint::{Constrained, StrictlyPositive};

use crate::{
    CellId, Cells, Error, VolumeCell,
    error::{constrained, ensure_non_negative},
};

/// Quadratic inflow performance between one cell and a well bottom.
///
/// The deliverable rate at bottom-hole pressure `bhp` is
/// `J × (p² − bhp²)`, where `p` is the live pressure of the cell and `J` the
/// productivity index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerWellConnection {
    cell: CellId,
    productivity: Constrained<f64, StrictlyPositive>,
}

impl LayerWellConnection {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `productivity` is finite and
    /// strictly positive.
    pub fn new(cell: CellId, productivity: f64) -> Result<Self, Error> {
        Ok(Self {
            cell,
            productivity: constrained("productivity", productivity)?,
        })
    }

    #[must_use]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    #[must_use]
    pub fn productivity(&self) -> f64 {
        self.productivity.into_inner()
    }

    /// Current pressure of the connected cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if the cell is not in `cells`.
    pub fn reservoir_pressure(&self, cells: &Cells) -> Result<f64, Error> {
        Ok(self.layer(cells)?.current_pressure())
    }

    /// Current water–gas ratio of the connected cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if the cell is not in `cells`.
    pub fn wgr(&self, cells: &Cells) -> Result<f64, Error> {
        Ok(self.layer(cells)?.wgr())
    }

    /// Absolute open flow potential `J × p²`, the rate at zero bottom-hole
    /// pressure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if the cell is not in `cells`.
    pub fn max_rate(&self, cells: &Cells) -> Result<f64, Error> {
        let p = self.reservoir_pressure(cells)?;
        Ok(self.productivity() * p * p)
    }

    /// Rate delivered at bottom-hole pressure `bhp`.
    ///
    /// A well bottom above reservoir pressure takes nothing in.
    ///
    /// # Errors
    ///
    /// Fails for a negative or non-finite `bhp` or an unknown cell.
    pub fn estimate_rate(&self, cells: &Cells, bhp: f64) -> Result<f64, Error> {
        let bhp = ensure_non_negative("bhp", bhp)?;
        let p = self.reservoir_pressure(cells)?;
        if bhp > p {
            return Ok(0.0);
        }

        Ok(self.productivity() * (p * p - bhp * bhp))
    }

    /// Bottom-hole pressure at which the layer delivers `rate`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::InvalidArgument`] for a negative rate and
    /// [`Error::RateOutOfDomain`] above [`max_rate`](Self::max_rate).
    pub fn estimate_pressure(&self, cells: &Cells, rate: f64) -> Result<f64, Error> {
        Ok(self.radicand(cells, rate)?.sqrt())
    }

    /// Slope `d(bhp)/d(rate)` of the inverse inflow curve at `rate`.
    ///
    /// The slope is unbounded at [`max_rate`](Self::max_rate).
    ///
    /// # Errors
    ///
    /// Same domain checks as [`estimate_pressure`](Self::estimate_pressure).
    pub fn estimate_pressure_rate_derivative(
        &self,
        cells: &Cells,
        rate: f64,
    ) -> Result<f64, Error> {
        let radicand = self.radicand(cells, rate)?;
        Ok(-0.5 / (self.productivity() * radicand.sqrt()))
    }

    /// Withdraws `estimate_rate(bhp) × dt` from the cell and returns the
    /// volume actually produced.
    ///
    /// # Errors
    ///
    /// Fails for a negative `bhp` or `dt`, or an unknown cell.
    pub fn produce(&self, cells: &mut Cells, bhp: f64, dt: f64) -> Result<f64, Error> {
        let dt = ensure_non_negative("dt", dt)?;
        let rate = self.estimate_rate(cells, bhp)?;
        Ok(cells.get_mut(self.cell)?.produce(rate * dt))
    }

    fn layer<'a>(&self, cells: &'a Cells) -> Result<&'a VolumeCell, Error> {
        cells.get(self.cell)
    }

    /// `p² − rate / J`, checked against the rate domain.
    fn radicand(&self, cells: &Cells, rate: f64) -> Result<f64, Error> {
        let rate = ensure_non_negative("rate", rate)?;
        let max_rate = self.max_rate(cells)?;
        if rate > max_rate {
            return Err(Error::RateOutOfDomain { rate, max_rate });
        }

        let p = self.reservoir_pressure(cells)?;
        Ok((p * p - rate / self.productivity()).max(0.0))
    }
}
