use serde::Serialize;

use crate::StepReport;

/// Indicates how the driver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Completed all requested steps.
    Complete,

    /// Stopped because every cell reached its abandonment volume.
    Depleted,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// One completed step of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub time: f64,
    pub report: StepReport,
    /// Total reservoir volume at the end of the step.
    pub total_volume: f64,
}

/// The result of a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    /// How the driver terminated.
    pub status: Status,

    /// One record per completed step.
    pub history: Vec<StepRecord>,

    /// Number of steps completed.
    pub steps: usize,
}

impl Solution {
    /// Total volume produced by all wells over the run.
    #[must_use]
    pub fn cumulative_production(&self) -> f64 {
        self.history
            .iter()
            .map(|record| record.report.total_produced())
            .sum()
    }
}
