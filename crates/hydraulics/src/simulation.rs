//! Fixed-step depletion driver.
//!
//! Advances a [`Reservoir`] through a number of equal timesteps under fixed
//! well controls, recording each [`StepReport`]:
//!
//! ```ignore
//! use petrosim_hydraulics::simulation;
//!
//! let solution = simulation::run_unobserved(&mut reservoir, &controls, 30.0, 120)?;
//!
//! for record in &solution.history {
//!     println!("t={}: {}", record.time, record.report.total_produced());
//! }
//! ```

mod action;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status, StepRecord};

use petrosim_core::Observer;
use tracing::info;

use crate::{Reservoir, StepReport, WellControls};

/// Upper bound on the history reserved up front. Runs meant to end on
/// depletion may pass a very large step count.
const PREALLOCATED_STEPS: usize = 1024;

/// Runs up to `steps` reservoir steps of `dt` days each.
///
/// # Algorithm
///
/// 1. Return immediately with [`Status::Depleted`] if there is nothing left
///    to produce.
/// 2. For each step:
///    - Advance the reservoir with [`Reservoir::step`].
///    - Record the step in the history.
///    - Emit an [`Event`] to the observer.
///    - Stop if the observer returns [`Action::StopEarly`], or if the
///      reservoir is now fully depleted.
///
/// # Errors
///
/// Returns an error naming the step if a reservoir step fails. Steps
/// completed before the failure remain applied to the reservoir.
pub fn run<Obs>(
    reservoir: &mut Reservoir,
    controls: &WellControls,
    dt: f64,
    steps: usize,
    mut observer: Obs,
) -> Result<Solution, Error>
where
    Obs: for<'a> Observer<Event<'a>, Action>,
{
    let mut history = Vec::with_capacity(steps.min(PREALLOCATED_STEPS));

    if reservoir.is_depleted() {
        return Ok(Solution {
            status: Status::Depleted,
            history,
            steps: 0,
        });
    }

    for step in 1..=steps {
        let report: StepReport = reservoir
            .step(dt, controls)
            .map_err(|source| Error::Step { step, source })?;
        let time = dt * step as f64;

        let event = Event {
            step,
            time,
            report: &report,
            reservoir,
        };
        let action = observer.observe(&event);

        history.push(StepRecord {
            step,
            time,
            report,
            total_volume: reservoir.total_volume(),
        });

        if let Some(Action::StopEarly) = action {
            return Ok(Solution {
                status: Status::StoppedByObserver,
                history,
                steps: step,
            });
        }

        if reservoir.is_depleted() {
            info!(step, time, "reservoir depleted");
            return Ok(Solution {
                status: Status::Depleted,
                history,
                steps: step,
            });
        }
    }

    Ok(Solution {
        status: Status::Complete,
        history,
        steps,
    })
}

/// Runs the driver without observation.
///
/// # Errors
///
/// See [`run`].
pub fn run_unobserved(
    reservoir: &mut Reservoir,
    controls: &WellControls,
    dt: f64,
    steps: usize,
) -> Result<Solution, Error> {
    run(reservoir, controls, dt, steps, ())
}
