use crate::{Reservoir, StepReport};

/// Event emitted by the driver after each reservoir step.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Step number, starting at 1.
    pub step: usize,

    /// Elapsed time at the end of the step, in days.
    pub time: f64,

    /// What happened during the step.
    pub report: &'a StepReport,

    /// Reservoir state at the end of the step.
    pub reservoir: &'a Reservoir,
}
