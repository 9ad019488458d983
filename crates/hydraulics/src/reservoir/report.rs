use serde::Serialize;

use crate::{CellId, WellRate};

use super::{ConnectionId, WellControl, WellId};

/// What happened to one well during a timestep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WellOutcome {
    pub well: WellId,
    pub control: WellControl,
    /// Rate the well would deliver from the start-of-step state.
    pub rate: WellRate,
    /// Volume the well asked for over the step.
    pub requested: f64,
    /// Volume actually produced after curtailment.
    pub produced: f64,
}

impl WellOutcome {
    /// Returns true if the cell could not satisfy the full request.
    #[must_use]
    pub fn is_curtailed(&self) -> bool {
        self.produced < self.requested
    }
}

/// Volume moved by one connection during a timestep.
///
/// Both volumes are signed like
/// [`VolumeCellConnection::perform_timestep`](crate::VolumeCellConnection::perform_timestep):
/// positive from the first cell into the second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransferOutcome {
    pub connection: ConnectionId,
    pub requested: f64,
    pub moved: f64,
}

/// Result of one [`Reservoir::step`](super::Reservoir::step).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    pub wells: Vec<WellOutcome>,
    pub transfers: Vec<TransferOutcome>,
    /// Cells that reached their abandonment volume during this step.
    pub depleted: Vec<CellId>,
}

impl StepReport {
    /// Total volume produced by all wells.
    #[must_use]
    pub fn total_produced(&self) -> f64 {
        self.wells.iter().map(|outcome| outcome.produced).sum()
    }

    #[must_use]
    pub fn well(&self, well: WellId) -> Option<&WellOutcome> {
        self.wells.iter().find(|outcome| outcome.well == well)
    }

    #[must_use]
    pub fn transfer(&self, connection: ConnectionId) -> Option<&TransferOutcome> {
        self.transfers
            .iter()
            .find(|outcome| outcome.connection == connection)
    }
}
