use petrosim_core::Observer;
use petrosim_hydraulics::simulation;
use petrosim_solvers::equation::newton;
use tracing::{debug, info};

/// Forwards solver iterations and simulation steps to [`tracing`].
///
/// Newton iterations are logged at `DEBUG`, simulation steps at `INFO`. The
/// observer never requests an action.
#[derive(Debug, Clone, Copy)]
pub struct TraceObserver {
    label: &'static str,
}

impl TraceObserver {
    /// Creates an observer whose events carry `label` as their `run` field.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Default for TraceObserver {
    fn default() -> Self {
        Self::new("petrosim")
    }
}

impl<I, O> Observer<newton::Event<'_, I, O>, newton::Action> for TraceObserver {
    fn observe(&mut self, event: &newton::Event<'_, I, O>) -> Option<newton::Action> {
        debug!(
            run = self.label,
            iter = event.iter,
            x = event.eval.x,
            residual = event.eval.residual,
            derivative = event.eval.derivative,
            safeguarded = event.safeguarded,
            "newton iteration"
        );
        None
    }
}

impl Observer<simulation::Event<'_>, simulation::Action> for TraceObserver {
    fn observe(&mut self, event: &simulation::Event<'_>) -> Option<simulation::Action> {
        info!(
            run = self.label,
            step = event.step,
            time = event.time,
            produced = event.report.total_produced(),
            volume = event.reservoir.total_volume(),
            depleted = event.report.depleted.len(),
            "simulation step"
        );
        None
    }
}
