mod control;
mod report;

pub use control::{WellControl, WellControls};
pub use report::{StepReport, TransferOutcome, WellOutcome};

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    CellId, Cells, Error, Transfer, VolumeCell, VolumeCellConnection, Well, WellMode, WellRate,
    error::ensure_non_negative,
};

/// Handle to a connection in a [`Reservoir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConnectionId(usize);

impl ConnectionId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection #{}", self.0)
    }
}

/// Handle to a well in a [`Reservoir`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WellId(usize);

impl WellId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "well #{}", self.0)
    }
}

/// A multi-cell reservoir with its connections and wells.
///
/// The reservoir owns every cell; connections and wells refer to them by
/// [`CellId`]. Elements are only ever added, so handles stay valid for the
/// lifetime of the reservoir.
#[derive(Debug, Clone, Default)]
pub struct Reservoir {
    cells: Cells,
    connections: Vec<VolumeCellConnection>,
    wells: Vec<Well>,
}

/// A withdrawal one well wants to make this step.
struct WellDemand {
    well: WellId,
    cell: CellId,
    control: WellControl,
    rate: WellRate,
    requested: f64,
}

impl Reservoir {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_cell(&mut self, cell: VolumeCell) -> CellId {
        self.cells.insert(cell)
    }

    /// Connects two cells of this reservoir.
    ///
    /// # Errors
    ///
    /// Fails if either cell is unknown or the connection parameters are
    /// invalid.
    pub fn connect(
        &mut self,
        first: CellId,
        second: CellId,
        transmissibility: f64,
        pressure_threshold: f64,
    ) -> Result<ConnectionId, Error> {
        self.ensure_cell(first)?;
        self.ensure_cell(second)?;

        let connection =
            VolumeCellConnection::new(first, second, transmissibility, pressure_threshold)?;
        self.connections.push(connection);
        Ok(ConnectionId(self.connections.len() - 1))
    }

    /// Adds a well completed in one of this reservoir's cells.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if the well's cell is not part of this
    /// reservoir.
    pub fn add_well(&mut self, well: Well) -> Result<WellId, Error> {
        self.ensure_cell(well.cell())?;

        self.wells.push(well);
        Ok(WellId(self.wells.len() - 1))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] for a handle from another reservoir.
    pub fn cell(&self, id: CellId) -> Result<&VolumeCell, Error> {
        self.cells.get(id)
    }

    #[must_use]
    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> Option<&VolumeCellConnection> {
        self.connections.get(id.0)
    }

    pub fn connections(
        &self,
    ) -> impl ExactSizeIterator<Item = (ConnectionId, &VolumeCellConnection)> {
        self.connections
            .iter()
            .enumerate()
            .map(|(index, connection)| (ConnectionId(index), connection))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownWell`] for a handle from another reservoir.
    pub fn well(&self, id: WellId) -> Result<&Well, Error> {
        self.wells.get(id.0).ok_or(Error::UnknownWell(id))
    }

    pub fn wells(&self) -> impl ExactSizeIterator<Item = (WellId, &Well)> {
        self.wells
            .iter()
            .enumerate()
            .map(|(index, well)| (WellId(index), well))
    }

    pub fn well_ids(&self) -> impl ExactSizeIterator<Item = WellId> + use<> {
        (0..self.wells.len()).map(WellId)
    }

    /// Operating point of a well at tubing head pressure `thp`.
    ///
    /// # Errors
    ///
    /// Fails for an unknown well and whenever
    /// [`Well::well_mode`] fails.
    pub fn well_mode(&self, id: WellId, thp: f64) -> Result<WellMode, Error> {
        self.well(id)?.well_mode(&self.cells, thp)
    }

    /// Sum of the current volumes of all cells.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.cells.total_volume()
    }

    /// Returns true once every cell has reached its abandonment volume.
    ///
    /// A reservoir without cells has nothing left to produce and counts as
    /// depleted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.cells.iter().all(|(_, cell)| cell.is_depleted())
    }

    /// Advances the reservoir by `dt` days.
    ///
    /// Every connection transfer and well withdrawal is computed from the
    /// state at the start of the step. Withdrawals from one cell are then
    /// summed; if the cell cannot cover them all, each one is scaled by the
    /// same factor. Transferred volume is injected into its sink only after
    /// all withdrawals have been made. The outcome does not depend on the
    /// order in which connections and wells were added.
    ///
    /// # Errors
    ///
    /// Fails for a negative `dt`, a control for an unknown well, an invalid
    /// control pressure or a failed rate solve. The reservoir is left
    /// unchanged on error.
    pub fn step(&mut self, dt: f64, controls: &WellControls) -> Result<StepReport, Error> {
        let dt = ensure_non_negative("dt", dt)?;
        if let Some(unknown) = controls.wells().find(|id| id.0 >= self.wells.len()) {
            return Err(Error::UnknownWell(unknown));
        }

        let transfers = self.plan_transfers(dt)?;
        let demands = self.plan_wells(dt, controls)?;

        let was_depleted: Vec<bool> = self
            .cells
            .iter()
            .map(|(_, cell)| cell.is_depleted())
            .collect();

        let mut requested: BTreeMap<CellId, f64> = BTreeMap::new();
        for (_, transfer) in &transfers {
            *requested.entry(transfer.source).or_default() += transfer.volume;
        }
        for demand in &demands {
            *requested.entry(demand.cell).or_default() += demand.requested;
        }

        let mut granted: BTreeMap<CellId, f64> = BTreeMap::new();
        for (&cell, &total) in &requested {
            if total <= 0.0 {
                continue;
            }
            let withdrawn = self.cells.get_mut(cell)?.produce(total);
            let factor = withdrawn / total;
            if factor < 1.0 {
                warn!(%cell, requested = total, withdrawn, "curtailed withdrawals");
            }
            granted.insert(cell, factor);
        }
        let factor = |cell: CellId| granted.get(&cell).copied().unwrap_or(0.0);

        let mut transfer_outcomes = Vec::with_capacity(transfers.len());
        for (connection, transfer) in &transfers {
            let moved = transfer.volume * factor(transfer.source);
            self.cells.get_mut(transfer.sink)?.inject(moved);

            let sign = if transfer.source == self.connections[connection.0].first() {
                1.0
            } else {
                -1.0
            };
            transfer_outcomes.push(TransferOutcome {
                connection: *connection,
                requested: sign * transfer.volume,
                moved: sign * moved,
            });
        }

        let well_outcomes: Vec<WellOutcome> = demands
            .into_iter()
            .map(|demand| WellOutcome {
                well: demand.well,
                control: demand.control,
                rate: demand.rate,
                requested: demand.requested,
                produced: demand.requested * factor(demand.cell),
            })
            .collect();

        let depleted: Vec<CellId> = self
            .cells
            .iter()
            .filter(|(id, cell)| cell.is_depleted() && !was_depleted[id.index()])
            .map(|(id, _)| id)
            .collect();
        for cell in &depleted {
            info!(%cell, "cell reached abandonment pressure");
        }

        let report = StepReport {
            wells: well_outcomes,
            transfers: transfer_outcomes,
            depleted,
        };
        debug!(
            dt,
            produced = report.total_produced(),
            volume = self.total_volume(),
            "reservoir step"
        );
        Ok(report)
    }

    fn ensure_cell(&self, id: CellId) -> Result<(), Error> {
        if self.cells.contains(id) {
            Ok(())
        } else {
            Err(Error::UnknownCell(id))
        }
    }

    fn plan_transfers(&self, dt: f64) -> Result<Vec<(ConnectionId, Transfer)>, Error> {
        let mut transfers = Vec::new();
        for (id, connection) in self.connections() {
            if let Some(transfer) = connection.plan(&self.cells, dt)? {
                transfers.push((id, transfer));
            }
        }
        Ok(transfers)
    }

    fn plan_wells(&self, dt: f64, controls: &WellControls) -> Result<Vec<WellDemand>, Error> {
        let mut demands = Vec::with_capacity(self.wells.len());
        for (id, well) in self.wells() {
            let control = controls.get(id);
            let rate = match control {
                WellControl::Shut => WellRate::NonFlowing,
                WellControl::BottomHolePressure(bhp) => {
                    WellRate::Flowing(well.layer().estimate_rate(&self.cells, bhp)?)
                }
                WellControl::TubingHeadPressure(thp) => well.estimate_rate(&self.cells, thp)?,
            };

            demands.push(WellDemand {
                well: id,
                cell: well.cell(),
                control,
                rate,
                requested: rate.flowing().unwrap_or(0.0) * dt,
            });
        }
        Ok(demands)
    }
}
