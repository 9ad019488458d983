use crate::equation::Evaluation;

/// Iteration event emitted by the Newton solver.
pub struct Event<'a, I, O> {
    /// Iteration counter (1-based).
    pub iter: usize,
    /// Whether the raw Newton step left the bounds and was replaced by a
    /// bisection toward the violated bound.
    pub safeguarded: bool,
    /// Evaluation at the new iterate.
    pub eval: &'a Evaluation<I, O>,
}
