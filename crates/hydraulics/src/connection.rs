use petrosim_core::constraint::{Constrained, NonNegative};

use crate::{
    CellId, Cells, Error,
    error::{constrained, ensure_non_negative},
};

/// A volume scheduled to move from one cell to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transfer {
    pub source: CellId,
    pub sink: CellId,
    pub volume: f64,
}

/// Transmissibility link between two [`VolumeCell`](crate::VolumeCell)s.
///
/// Each timestep the connection moves `transmissibility × ΔP × dt` between
/// its cells, where `ΔP = p(second) − p(first)`. A positive amount is drawn
/// from the first cell into the second, a negative one the other way round.
/// Pressure differences smaller than the threshold move nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeCellConnection {
    first: CellId,
    second: CellId,
    transmissibility: Constrained<f64, NonNegative>,
    pressure_threshold: Constrained<f64, NonNegative>,
}

impl VolumeCellConnection {
    /// Connects two distinct cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the transmissibility or the
    /// pressure threshold is negative or not finite, or if both handles refer
    /// to the same cell.
    pub fn new(
        first: CellId,
        second: CellId,
        transmissibility: f64,
        pressure_threshold: f64,
    ) -> Result<Self, Error> {
        if first == second {
            return Err(Error::invalid(
                "second",
                second.index() as f64,
                "a cell cannot be connected to itself",
            ));
        }

        Ok(Self {
            first,
            second,
            transmissibility: constrained("transmissibility", transmissibility)?,
            pressure_threshold: constrained("pressure_threshold", pressure_threshold)?,
        })
    }

    /// Computes the transfer for one timestep without touching the cells.
    ///
    /// Returns `None` inside the pressure dead band and when nothing would
    /// move. The planned volume is the full `|T × ΔP × dt|`; how much the
    /// source can actually give up is settled when the transfer is applied.
    ///
    /// # Errors
    ///
    /// Fails if `dt` is negative or not finite, or if either cell is unknown.
    pub fn plan(&self, cells: &Cells, dt: f64) -> Result<Option<Transfer>, Error> {
        let dt = ensure_non_negative("dt", dt)?;
        let first = cells.get(self.first)?;
        let second = cells.get(self.second)?;

        let gradient = second.current_pressure() - first.current_pressure();
        if gradient.abs() < self.pressure_threshold() {
            return Ok(None);
        }

        let delta = self.transmissibility() * gradient * dt;
        #[allow(clippy::float_cmp)]
        if delta == 0.0 {
            return Ok(None);
        }

        let (source, sink) = if delta > 0.0 {
            (self.first, self.second)
        } else {
            (self.second, self.first)
        };

        Ok(Some(Transfer {
            source,
            sink,
            volume: delta.abs(),
        }))
    }

    /// Moves volume between the cells for one timestep.
    ///
    /// Only what the source actually gives up is injected into the sink.
    /// Returns the moved volume, positive when it flowed from the first cell
    /// to the second.
    ///
    /// # Errors
    ///
    /// Fails if `dt` is negative or not finite, or if either cell is unknown.
    /// The cells are left untouched on error.
    pub fn perform_timestep(&self, cells: &mut Cells, dt: f64) -> Result<f64, Error> {
        let Some(transfer) = self.plan(cells, dt)? else {
            return Ok(0.0);
        };

        let moved = cells.get_mut(transfer.source)?.produce(transfer.volume);
        cells.get_mut(transfer.sink)?.inject(moved);

        Ok(if transfer.source == self.first {
            moved
        } else {
            -moved
        })
    }

    #[must_use]
    pub fn first(&self) -> CellId {
        self.first
    }

    #[must_use]
    pub fn second(&self) -> CellId {
        self.second
    }

    #[must_use]
    pub fn transmissibility(&self) -> f64 {
        self.transmissibility.into_inner()
    }

    #[must_use]
    pub fn pressure_threshold(&self) -> f64 {
        self.pressure_threshold.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::VolumeCell;

    fn two_cells(pa: f64, pb: f64) -> (Cells, CellId, CellId) {
        let mut cells = Cells::new();
        let a = cells.insert(VolumeCell::new(1000.0, pa, 0.0, 0.0).unwrap());
        let b = cells.insert(VolumeCell::new(1000.0, pb, 0.0, 0.0).unwrap());
        (cells, a, b)
    }

    #[test]
    fn negative_gradient_moves_from_second_to_first() {
        let (mut cells, a, b) = two_cells(100.0, 50.0);
        let connection = VolumeCellConnection::new(a, b, 0.1, 1.0).unwrap();

        let moved = connection.perform_timestep(&mut cells, 1.0).unwrap();

        assert_relative_eq!(moved, -5.0);
        assert_relative_eq!(cells.get(a).unwrap().current_volume(), 1005.0);
        assert_relative_eq!(cells.get(b).unwrap().current_volume(), 995.0);
        assert_relative_eq!(cells.total_volume(), 2000.0);
    }

    #[test]
    fn positive_gradient_moves_from_first_to_second() {
        let (cells, a, b) = two_cells(40.0, 60.0);
        let connection = VolumeCellConnection::new(a, b, 0.5, 0.0).unwrap();

        let transfer = connection.plan(&cells, 2.0).unwrap().unwrap();

        assert_eq!(transfer.source, a);
        assert_eq!(transfer.sink, b);
        assert_relative_eq!(transfer.volume, 20.0);
    }

    #[test]
    fn dead_band_moves_nothing() {
        let (mut cells, a, b) = two_cells(100.0, 99.5);
        let connection = VolumeCellConnection::new(a, b, 10.0, 1.0).unwrap();
        let before = cells.clone();

        assert_eq!(connection.perform_timestep(&mut cells, 1.0).unwrap(), 0.0);
        assert_eq!(cells, before);
    }

    #[test]
    fn transfer_is_limited_by_what_the_source_gives_up() {
        let (mut cells, a, b) = two_cells(100.0, 200.0);
        let connection = VolumeCellConnection::new(a, b, 100.0, 0.0).unwrap();

        // Planned 10 000, but the first cell can only give up 950.
        let moved = connection.perform_timestep(&mut cells, 1.0).unwrap();

        assert_relative_eq!(moved, 950.0);
        assert!(cells.get(a).unwrap().is_depleted());
        assert_relative_eq!(cells.get(b).unwrap().current_volume(), 1950.0);
        assert_relative_eq!(cells.total_volume(), 2000.0);
    }

    #[test]
    fn zero_timestep_is_a_no_op() {
        let (mut cells, a, b) = two_cells(100.0, 10.0);
        let connection = VolumeCellConnection::new(a, b, 1.0, 0.0).unwrap();

        assert_eq!(connection.perform_timestep(&mut cells, 0.0).unwrap(), 0.0);
    }

    #[test]
    fn rejects_invalid_parameters() {
        let (mut cells, a, b) = two_cells(100.0, 10.0);

        assert!(VolumeCellConnection::new(a, b, -0.1, 0.0).is_err());
        assert!(VolumeCellConnection::new(a, b, 0.1, -1.0).is_err());
        assert!(VolumeCellConnection::new(a, b, f64::INFINITY, 0.0).is_err());
        assert!(VolumeCellConnection::new(a, a, 0.1, 0.0).is_err());

        let connection = VolumeCellConnection::new(a, b, 0.1, 0.0).unwrap();
        let result = connection.perform_timestep(&mut cells, -1.0);
        assert!(matches!(result, Err(Error::InvalidArgument { name: "dt", .. })));
    }

    #[test]
    fn unknown_cell_leaves_state_untouched() {
        let (mut bigger, _, _) = two_cells(100.0, 10.0);
        let foreign = bigger.insert(VolumeCell::new(1.0, 1.0, 0.0, 0.0).unwrap());

        let mut cells = Cells::new();
        let only = cells.insert(VolumeCell::new(1.0, 1.0, 0.0, 0.0).unwrap());
        let before = cells.clone();

        let connection = VolumeCellConnection::new(only, foreign, 0.1, 0.0).unwrap();

        assert!(matches!(
            connection.perform_timestep(&mut cells, 1.0),
            Err(Error::UnknownCell(id)) if id == foreign
        ));
        assert_eq!(cells, before);
    }
}
