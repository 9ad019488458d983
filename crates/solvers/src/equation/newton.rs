//! Newton–Raphson root finding with bounded iterations.
//!
//! The iterate is kept inside caller-supplied bounds: when a raw Newton step
//! would leave `[lower, upper]`, the solver bisects between the current point
//! and the violated bound instead. Once two iterates with residuals of
//! opposite sign have been seen, the solver switches to a Newton–bisection
//! hybrid on the interval between them and cannot lose the root.
//!
//! Iteration stops on convergence, on the iteration cap, or with an error
//! when the residual of an unbracketed search stops improving for more than
//! [`Config::divergence_limit`] consecutive iterations.

mod bracket;

mod action;
mod config;
mod error;
mod event;
mod solution;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use petrosim_core::{EquationProblem, Model, Observer};

use crate::equation::{Evaluation, evaluate};

use bracket::SignBracket;

/// Finds a root of the equation using Newton's method.
/// Observers see the evaluation at each new iterate.
///
/// # Errors
///
/// Returns an error if the bounds or starting point are invalid, if the model
/// or problem fails during evaluation, if a residual or slope is non-finite,
/// if the slope vanishes, or if the residual diverges.
pub fn solve<I, O, Obs>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<Input = I, Output = O>,
    x0: f64,
    bounds: [f64; 2],
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<I, O>, Error>
where
    Obs: for<'a> Observer<Event<'a, I, O>, Action>,
{
    let (lower, upper) = validate_bounds(bounds)?;
    if !x0.is_finite() || x0 < lower || x0 > upper {
        return Err(Error::InvalidStart { x: x0 });
    }

    let mut best = evaluate(model, problem, x0)?;
    check_finite(&best)?;

    let (mut x, mut residual, mut derivative) = (best.x, best.residual, best.derivative);
    if residual.abs() <= config.residual_tol() {
        return Ok(Solution::from_eval(best, Status::Converged, 0));
    }

    let mut bracket = SignBracket::default();
    bracket.record(x, residual);
    let mut last_step = f64::INFINITY;
    let mut stalled = 0;

    for iter in 1..=config.max_iters() {
        let (next, safeguarded) = if let Some(interval) = bracket.interval() {
            bracketed_iterate(x, residual / derivative, interval, last_step)
        } else {
            #[allow(clippy::float_cmp)]
            if derivative == 0.0 {
                return Err(Error::ZeroDerivative { x });
            }
            bounded_iterate(x, residual / derivative, lower, upper)
        };
        let eval = evaluate(model, problem, next)?;
        check_finite(&eval)?;

        let event = Event {
            iter,
            safeguarded,
            eval: &eval,
        };
        let action = observer.observe(&event);

        let improved = eval.residual.abs() < residual.abs();
        last_step = (eval.x - x).abs();
        (x, residual, derivative) = (eval.x, eval.residual, eval.derivative);
        bracket.record(x, residual);

        if residual.abs() <= config.residual_tol() {
            return Ok(Solution::from_eval(eval, Status::Converged, iter));
        }

        if eval.residual.abs() < best.residual.abs() {
            best = eval;
        }

        if let Some(Action::StopEarly) = action {
            return Ok(Solution::from_eval(best, Status::StoppedByObserver, iter));
        }

        if improved || bracket.interval().is_some() {
            stalled = 0;
        } else {
            stalled += 1;
            if stalled > config.divergence_limit() {
                return Err(Error::Diverged { x, residual, iters: iter });
            }
        }
    }

    Ok(Solution::from_eval(
        best,
        Status::MaxIters,
        config.max_iters(),
    ))
}

/// Runs Newton's method without observation.
///
/// # Errors
///
/// See [`solve`].
pub fn solve_unobserved<I, O>(
    model: &impl Model<Input = I, Output = O>,
    problem: &impl EquationProblem<Input = I, Output = O>,
    x0: f64,
    bounds: [f64; 2],
    config: &Config,
) -> Result<Solution<I, O>, Error> {
    solve(model, problem, x0, bounds, config, ())
}

/// Validates bounds and returns them in normalized (lower < upper) order.
///
/// Infinite bounds are allowed and disable the safeguard on that side.
fn validate_bounds(bounds: [f64; 2]) -> Result<(f64, f64), Error> {
    let [a, b] = bounds;

    #[allow(clippy::float_cmp)]
    if a.is_nan() || b.is_nan() || a == b {
        return Err(Error::InvalidBounds { lower: a, upper: b });
    }

    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Takes the Newton step `x - step`, bisecting toward a bound it would cross.
///
/// An iterate already sitting on the crossed bound moves halfway toward the
/// opposite bound instead, or by `|step|` away from it when the opposite
/// bound is infinite. The upper bound itself is never returned, so a model
/// that is singular at its upper limit (such as a square-root law at full
/// drawdown) stays evaluable.
fn bounded_iterate(x: f64, step: f64, lower: f64, upper: f64) -> (f64, bool) {
    let newton = x - step;

    if newton < lower && lower.is_finite() {
        let next = if x > lower {
            0.5 * (x + lower)
        } else {
            retreat(x, step, upper)
        };
        (next, true)
    } else if newton >= upper && upper.is_finite() {
        let next = if x < upper {
            0.5 * (x + upper)
        } else {
            retreat(x, step, lower)
        };
        (next, true)
    } else {
        (newton, false)
    }
}

/// Moves from a bound toward `other`.
fn retreat(x: f64, step: f64, other: f64) -> f64 {
    if other.is_finite() {
        0.5 * (x + other)
    } else if other > x {
        x + step.abs()
    } else {
        x - step.abs()
    }
}

/// Takes the Newton step if it lands strictly inside the sign-change
/// interval and is at most half the previous step, and bisects the interval
/// otherwise.
///
/// A vanishing slope gives a non-finite step, which always bisects.
fn bracketed_iterate(x: f64, step: f64, [left, right]: [f64; 2], last_step: f64) -> (f64, bool) {
    let newton = x - step;

    if newton > left && newton < right && (newton - x).abs() <= 0.5 * last_step {
        (newton, false)
    } else {
        (0.5 * (left + right), true)
    }
}

fn check_finite<I, O>(eval: &Evaluation<I, O>) -> Result<(), Error> {
    if !eval.residual.is_finite() {
        return Err(Error::NonFiniteResidual {
            x: eval.x,
            residual: eval.residual,
        });
    }
    if !eval.derivative.is_finite() {
        return Err(Error::NonFiniteDerivative {
            x: eval.x,
            derivative: eval.derivative,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    /// Model that squares its input, reporting the value and its slope.
    struct SquareModel;
    impl Model for SquareModel {
        type Input = f64;
        type Output = (f64, f64);
        type Error = Infallible;

        fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
            Ok((input * input, 2.0 * input))
        }
    }

    /// Model evaluating `atan(x)`, the classic case where plain Newton
    /// overshoots and diverges from starting points far from the root.
    struct AtanModel;
    impl Model for AtanModel {
        type Input = f64;
        type Output = (f64, f64);
        type Error = Infallible;

        fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
            Ok((input.atan(), 1.0 / (1.0 + input * input)))
        }
    }

    /// Model evaluating `sin(x)`.
    struct SineModel;
    impl Model for SineModel {
        type Input = f64;
        type Output = (f64, f64);
        type Error = Infallible;

        fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
            Ok((input.sin(), input.cos()))
        }
    }

    /// Drives the model value to a target: `f(x) = value - target`.
    struct TargetOutputProblem {
        target: f64,
    }
    impl EquationProblem for TargetOutputProblem {
        type Input = f64;
        type Output = (f64, f64);
        type Error = Infallible;

        fn input(&self, x: f64) -> Result<Self::Input, Self::Error> {
            Ok(x)
        }

        fn residual(&self, _input: &f64, output: &(f64, f64)) -> Result<f64, Self::Error> {
            Ok(output.0 - self.target)
        }

        fn derivative(&self, _input: &f64, output: &(f64, f64)) -> Result<f64, Self::Error> {
            Ok(output.1)
        }
    }

    const UNBOUNDED: [f64; 2] = [f64::NEG_INFINITY, f64::INFINITY];

    #[test]
    fn finds_square_root() {
        let problem = TargetOutputProblem { target: 9.0 };

        let solution =
            solve_unobserved(&SquareModel, &problem, 1.0, [0.0, 10.0], &Config::default())
                .expect("should solve");

        assert_eq!(solution.status, Status::Converged);
        assert!(solution.iters > 0);
        assert_relative_eq!(solution.x, 3.0, epsilon = 1e-10);
        assert_relative_eq!(solution.snapshot.output.0, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn converged_start_takes_no_iterations() {
        let problem = TargetOutputProblem { target: 4.0 };

        let solution = solve_unobserved(&SquareModel, &problem, 2.0, UNBOUNDED, &Config::default())
            .expect("should solve");

        assert_eq!(solution.status, Status::Converged);
        assert_eq!(solution.iters, 0);
    }

    #[test]
    fn safeguard_keeps_overshooting_steps_in_bounds() {
        let problem = TargetOutputProblem { target: 0.0 };

        let mut safeguarded = 0;
        let observer = |event: &Event<'_, f64, (f64, f64)>| -> Option<Action> {
            assert!((-3.0..3.0).contains(&event.eval.x));
            if event.safeguarded {
                safeguarded += 1;
            }
            None
        };

        // The raw step from x = 3 lands near -9.5.
        let solution = solve(&AtanModel, &problem, 3.0, [-3.0, 3.0], &Config::default(), observer)
            .expect("should solve");

        assert_eq!(solution.status, Status::Converged);
        assert_relative_eq!(solution.x, 0.0, epsilon = 1e-9);
        assert_eq!(safeguarded, 1);
    }

    #[test]
    fn sign_change_recovers_from_unbounded_overshoot() {
        let problem = TargetOutputProblem { target: 0.0 };
        let config = Config::new(50, 1e-10, 2).unwrap();

        let mut bisected = 0;
        let observer = |event: &Event<'_, f64, (f64, f64)>| -> Option<Action> {
            if event.safeguarded {
                bisected += 1;
            }
            None
        };

        // The raw step from x = 3 lands near -9.5, past the root. Plain Newton
        // from there runs off to +124.
        let solution = solve(&AtanModel, &problem, 3.0, UNBOUNDED, &config, observer)
            .expect("should solve");

        assert_eq!(solution.status, Status::Converged);
        assert_relative_eq!(solution.x, 0.0, epsilon = 1e-9);
        assert!(bisected > 0);
    }

    #[test]
    fn rootless_equation_is_reported_as_divergence() {
        // x² = -1 never has a zero residual.
        let problem = TargetOutputProblem { target: -1.0 };
        let config = Config::new(50, 1e-10, 0).unwrap();

        let result = solve_unobserved(&SquareModel, &problem, 2.0, UNBOUNDED, &config);

        assert!(matches!(result, Err(Error::Diverged { iters: 3, .. })));
    }

    #[test]
    fn start_on_a_bound_moves_inward() {
        // sin(0) + 0.5 > 0 and the slope is positive, so the first Newton step
        // points below the lower bound the search starts on.
        let problem = TargetOutputProblem { target: -0.5 };

        let mut first = None;
        let observer = |event: &Event<'_, f64, (f64, f64)>| -> Option<Action> {
            first.get_or_insert((event.eval.x, event.safeguarded));
            None
        };

        let solution = solve(&SineModel, &problem, 0.0, [0.0, 5.0], &Config::default(), observer)
            .expect("should solve");

        assert_eq!(first, Some((2.5, true)));
        assert_eq!(solution.status, Status::Converged);
        assert_relative_eq!(solution.x, 7.0 * std::f64::consts::PI / 6.0, epsilon = 1e-9);
    }

    #[test]
    fn observer_can_stop_iteration() {
        let problem = TargetOutputProblem { target: 9.0 };

        let mut calls = 0usize;
        let observer = |event: &Event<'_, f64, (f64, f64)>| -> Option<Action> {
            calls += 1;
            (event.iter >= 2).then_some(Action::StopEarly)
        };

        let solution = solve(&SquareModel, &problem, 100.0, UNBOUNDED, &Config::default(), observer)
            .expect("should stop cleanly");

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(solution.iters, 2);
        assert_eq!(calls, 2);
    }

    #[test]
    fn zero_iters_returns_start() {
        let problem = TargetOutputProblem { target: 9.0 };
        let config = Config::new(0, 1e-10, 5).unwrap();

        let solution = solve_unobserved(&SquareModel, &problem, 2.0, UNBOUNDED, &config)
            .expect("should return the starting point");

        assert_eq!(solution.status, Status::MaxIters);
        assert!(!solution.is_converged());
        assert_eq!(solution.iters, 0);
        assert_relative_eq!(solution.x, 2.0);
        assert_relative_eq!(solution.residual, -5.0);
    }

    #[test]
    fn errors_on_zero_derivative() {
        let problem = TargetOutputProblem { target: 9.0 };

        let result = solve_unobserved(&SquareModel, &problem, 0.0, UNBOUNDED, &Config::default());

        assert!(matches!(result, Err(Error::ZeroDerivative { .. })));
    }

    #[test]
    fn errors_on_invalid_bounds_or_start() {
        let problem = TargetOutputProblem { target: 9.0 };
        let config = Config::default();

        let result = solve_unobserved(&SquareModel, &problem, 1.0, [2.0, 2.0], &config);
        assert!(matches!(result, Err(Error::InvalidBounds { .. })));

        let result = solve_unobserved(&SquareModel, &problem, 1.0, [f64::NAN, 2.0], &config);
        assert!(matches!(result, Err(Error::InvalidBounds { .. })));

        let result = solve_unobserved(&SquareModel, &problem, 5.0, [0.0, 2.0], &config);
        assert!(matches!(result, Err(Error::InvalidStart { .. })));

        let result = solve_unobserved(&SquareModel, &problem, f64::NAN, UNBOUNDED, &config);
        assert!(matches!(result, Err(Error::InvalidStart { .. })));
    }

    #[test]
    fn normalizes_reversed_bounds() {
        let problem = TargetOutputProblem { target: 36.0 };

        let solution =
            solve_unobserved(&SquareModel, &problem, 1.0, [10.0, 0.0], &Config::default())
                .expect("should solve with reversed bounds");

        assert_relative_eq!(solution.x, 6.0, epsilon = 1e-10);
    }
}
