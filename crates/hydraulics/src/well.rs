mod balance;
mod geometry;
mod mode;

pub use balance::BalancePoint;
pub use geometry::WellGeometry;
pub use mode::{NON_FLOWING_RATE, WellMode, WellRate};

use petrosim_core::{Model, Observer};
use petrosim_solvers::equation::newton;
use tracing::{debug, warn};

use crate::{CellId, Cells, Error, LayerWellConnection, error::ensure_non_negative};

use balance::{PressureMatch, WellBalance};

/// Largest acceptable mismatch, in bar, between the inflow and tubing
/// bottom-hole pressures at the solved rate.
const PRESSURE_TOLERANCE: f64 = 0.1;
const MAX_ITERS: usize = 50;
const DIVERGENCE_LIMIT: usize = 5;

/// A producing well completed in a single layer.
///
/// The production rate at a given tubing head pressure is where the inflow
/// curve of the layer meets the tubing curve of the well. It is found with a
/// bounded Newton iteration over `[0, J·p²]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Well {
    layer: LayerWellConnection,
    geometry: WellGeometry,
    solver: newton::Config,
}

impl Well {
    /// Completes a well in `cell`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless `productivity` is finite and
    /// strictly positive.
    pub fn new(geometry: WellGeometry, cell: CellId, productivity: f64) -> Result<Self, Error> {
        let solver = newton::Config::new(MAX_ITERS, PRESSURE_TOLERANCE, DIVERGENCE_LIMIT)
            .map_err(newton::Error::from)?;

        Ok(Self {
            layer: LayerWellConnection::new(cell, productivity)?,
            geometry,
            solver,
        })
    }

    /// Replaces the rate solver settings.
    #[must_use]
    pub fn with_solver_config(self, solver: newton::Config) -> Self {
        Self { solver, ..self }
    }

    #[must_use]
    pub fn geometry(&self) -> &WellGeometry {
        &self.geometry
    }

    #[must_use]
    pub fn layer(&self) -> &LayerWellConnection {
        &self.layer
    }

    #[must_use]
    pub fn cell(&self) -> CellId {
        self.layer.cell()
    }

    #[must_use]
    pub fn solver_config(&self) -> &newton::Config {
        &self.solver
    }

    /// Production rate at tubing head pressure `thp`.
    ///
    /// # Errors
    ///
    /// Fails for a negative `thp` or an unknown cell, and with a
    /// non-convergence error when the rate solve does not meet its tolerance.
    pub fn estimate_rate(&self, cells: &Cells, thp: f64) -> Result<WellRate, Error> {
        self.estimate_rate_observed(cells, thp, ())
    }

    /// Like [`estimate_rate`](Self::estimate_rate), reporting every Newton
    /// iterate to `observer`.
    ///
    /// An observer that stops the iteration early before the tolerance is met
    /// makes the solve fail with [`Error::IterationLimit`].
    ///
    /// # Errors
    ///
    /// See [`estimate_rate`](Self::estimate_rate).
    pub fn estimate_rate_observed<Obs>(
        &self,
        cells: &Cells,
        thp: f64,
        observer: Obs,
    ) -> Result<WellRate, Error>
    where
        Obs: for<'a> Observer<newton::Event<'a, f64, BalancePoint>, newton::Action>,
    {
        Ok(match self.solve(cells, thp, observer)? {
            Some((rate, _)) => WellRate::Flowing(rate),
            None => WellRate::NonFlowing,
        })
    }

    /// Operating point of the well at tubing head pressure `thp`.
    ///
    /// # Errors
    ///
    /// See [`estimate_rate`](Self::estimate_rate).
    pub fn well_mode(&self, cells: &Cells, thp: f64) -> Result<WellMode, Error> {
        let reservoir_pressure = self.layer.reservoir_pressure(cells)?;
        let wgr = self.layer.wgr(cells)?;

        let (rate, bottom_pressure) = match self.solve(cells, thp, ())? {
            Some((rate, point)) => (WellRate::Flowing(rate), point.layer_bhp),
            None => (WellRate::NonFlowing, reservoir_pressure),
        };

        Ok(WellMode {
            tubing_pressure: thp,
            rate,
            bottom_pressure,
            reservoir_pressure,
            wgr,
        })
    }

    /// Produces for `dt` at a fixed bottom-hole pressure and returns the
    /// volume withdrawn.
    ///
    /// # Errors
    ///
    /// Fails for a negative `bhp` or `dt`, or an unknown cell.
    pub fn produce(&self, cells: &mut Cells, bhp: f64, dt: f64) -> Result<f64, Error> {
        self.layer.produce(cells, bhp, dt)
    }

    /// Produces for `dt` at the rate the well delivers against `thp` and
    /// returns the volume withdrawn. A non-flowing well produces nothing.
    ///
    /// # Errors
    ///
    /// See [`estimate_rate`](Self::estimate_rate). A negative `dt` is also
    /// rejected.
    pub fn produce_at_tubing_pressure(
        &self,
        cells: &mut Cells,
        thp: f64,
        dt: f64,
    ) -> Result<f64, Error> {
        let dt = ensure_non_negative("dt", dt)?;
        let rate = self.estimate_rate(cells, thp)?.flowing().unwrap_or(0.0);
        Ok(cells.get_mut(self.cell())?.produce(rate * dt))
    }

    /// Solves for the flowing rate, or `None` when even a closed-in well has
    /// more tubing back-pressure than the layer can overcome.
    fn solve<Obs>(
        &self,
        cells: &Cells,
        thp: f64,
        observer: Obs,
    ) -> Result<Option<(f64, BalancePoint)>, Error>
    where
        Obs: for<'a> Observer<newton::Event<'a, f64, BalancePoint>, newton::Action>,
    {
        let balance = WellBalance {
            layer: &self.layer,
            geometry: &self.geometry,
            cells,
            thp,
            wgr: self.layer.wgr(cells)?,
        };

        let shut_in = balance.call(&0.0)?;
        if shut_in.residual() < 0.0 {
            debug!(thp, residual = shut_in.residual(), "well is not flowing");
            return Ok(None);
        }

        let max_rate = self.layer.max_rate(cells)?;
        let solution = newton::solve(
            &balance,
            &PressureMatch,
            0.0,
            [0.0, max_rate],
            &self.solver,
            observer,
        )
        .inspect_err(|err| warn!(thp, %err, "well rate solve failed"))?;

        if !solution.is_converged() {
            warn!(
                thp,
                status = ?solution.status,
                rate = solution.x,
                residual = solution.residual,
                "well rate solve stopped before converging"
            );
            return Err(Error::IterationLimit {
                status: solution.status,
                rate: solution.x,
                residual: solution.residual,
            });
        }

        debug!(
            thp,
            rate = solution.x,
            iters = solution.iters,
            "solved well rate"
        );
        Ok(Some((solution.x, solution.snapshot.output)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::VolumeCell;

    /// The reference well on a 200 bar dry cell.
    fn reference() -> (Cells, Well) {
        let mut cells = Cells::new();
        let cell = cells.insert(VolumeCell::new(1000.0, 200.0, 0.0, 0.0).unwrap());
        let geometry = WellGeometry::from_meters(1200.0, 700.0, 0.1).unwrap();
        (cells, Well::new(geometry, cell, 0.01).unwrap())
    }

    #[test]
    fn solves_for_the_operating_rate() {
        let (cells, well) = reference();

        let rate = well.estimate_rate(&cells, 20.0).unwrap();

        let WellRate::Flowing(q) = rate else {
            panic!("expected a flowing well, got {rate:?}");
        };
        assert_relative_eq!(q, 390.74, epsilon = 0.1);

        let layer_bhp = well.layer().estimate_pressure(&cells, q).unwrap();
        let well_bhp =
            20.0 + crate::well_flow::pressure_gradient(20.0, 0.0, q, well.geometry()).unwrap();
        assert!((layer_bhp - well_bhp).abs() <= PRESSURE_TOLERANCE);
    }

    #[test]
    fn wide_tubing_with_rising_balance_at_zero_rate() {
        // Friction falls with rate in 150 mm tubing, so at zero rate the
        // balance still rises and the first Newton step points below zero.
        let mut cells = Cells::new();
        let cell = cells.insert(VolumeCell::new(1000.0, 200.0, 0.0, 0.0).unwrap());
        let geometry = WellGeometry::from_meters(1200.0, 700.0, 0.15).unwrap();
        let well = Well::new(geometry, cell, 0.2).unwrap();
        assert!(crate::well_flow::pressure_rate_derivative(&geometry) < 0.0);

        let rate = well.estimate_rate(&cells, 140.0).unwrap();

        let WellRate::Flowing(q) = rate else {
            panic!("expected a flowing well, got {rate:?}");
        };
        assert_relative_eq!(q, 7957.8, epsilon = 1.0);
        let layer_bhp = well.layer().estimate_pressure(&cells, q).unwrap();
        let well_bhp =
            140.0 + crate::well_flow::pressure_gradient(140.0, 0.0, q, &geometry).unwrap();
        assert!((layer_bhp - well_bhp).abs() <= PRESSURE_TOLERANCE);
    }

    #[test]
    fn high_back_pressure_stops_flow() {
        let (cells, well) = reference();

        let rate = well.estimate_rate(&cells, 200.0).unwrap();

        assert_eq!(rate, WellRate::NonFlowing);
        assert_eq!(rate.value(), NON_FLOWING_RATE);
    }

    #[test]
    fn well_mode_snapshots_the_operating_point() {
        let (cells, well) = reference();

        let flowing = well.well_mode(&cells, 20.0).unwrap();
        assert_eq!(flowing.tubing_pressure, 20.0);
        assert_eq!(flowing.reservoir_pressure, 200.0);
        assert_eq!(flowing.wgr, 0.0);
        assert!(flowing.rate.is_flowing());
        assert!(flowing.bottom_pressure > 20.0 && flowing.bottom_pressure < 200.0);

        let dead = well.well_mode(&cells, 250.0).unwrap();
        assert_eq!(dead.rate, WellRate::NonFlowing);
        assert_eq!(dead.bottom_pressure, dead.reservoir_pressure);
    }

    #[test]
    fn capped_solve_reports_non_convergence() {
        let (cells, well) = reference();
        let well = well.with_solver_config(newton::Config::new(2, 0.1, 5).unwrap());

        let err = well.estimate_rate(&cells, 20.0).unwrap_err();

        assert!(err.is_non_convergence());
        assert!(matches!(
            err,
            Error::IterationLimit {
                status: newton::Status::MaxIters,
                ..
            }
        ));
    }

    #[test]
    fn iterates_stay_inside_the_rate_domain() {
        let (cells, well) = reference();
        let max_rate = well.layer().max_rate(&cells).unwrap();

        let mut iterates = Vec::new();
        let observer = |event: &newton::Event<'_, f64, BalancePoint>| -> Option<newton::Action> {
            iterates.push(event.eval.x);
            None
        };

        well.estimate_rate_observed(&cells, 20.0, observer).unwrap();

        assert!(!iterates.is_empty());
        assert!(iterates.iter().all(|&q| (0.0..max_rate).contains(&q)));
    }

    #[test]
    fn observer_stop_is_not_a_solution() {
        let (cells, well) = reference();

        let observer = |_: &newton::Event<'_, f64, BalancePoint>| Some(newton::Action::StopEarly);
        let err = well.estimate_rate_observed(&cells, 20.0, observer).unwrap_err();

        assert!(matches!(
            err,
            Error::IterationLimit {
                status: newton::Status::StoppedByObserver,
                ..
            }
        ));
    }

    #[test]
    fn produces_at_tubing_pressure() {
        let (mut cells, well) = reference();
        let q = well.estimate_rate(&cells, 20.0).unwrap().value();

        let produced = well.produce_at_tubing_pressure(&mut cells, 20.0, 0.1).unwrap();

        assert_relative_eq!(produced, 0.1 * q);
        assert_relative_eq!(
            cells.get(well.cell()).unwrap().current_volume(),
            1000.0 - 0.1 * q
        );

        // A dead well leaves the cell alone.
        assert_eq!(well.produce_at_tubing_pressure(&mut cells, 500.0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn produces_at_bottom_hole_pressure() {
        let (mut cells, well) = reference();

        assert_relative_eq!(well.produce(&mut cells, 100.0, 1.0).unwrap(), 300.0);
    }

    #[test]
    fn rejects_negative_tubing_pressure() {
        let (cells, well) = reference();

        assert!(matches!(
            well.estimate_rate(&cells, -1.0),
            Err(Error::InvalidArgument { name: "thp", .. })
        ));
    }
}
