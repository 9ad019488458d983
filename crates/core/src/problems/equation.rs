/// Defines a scalar equation `f(x) = 0` to be solved against a [`Model`].
///
/// An equation problem maps the solver variable `x` to a model input, and
/// extracts both the residual and its slope `df/dx` from the model's input and
/// output. Carrying the slope lets derivative-based solvers such as Newton's
/// method drive the residual toward zero without finite differencing.
///
/// [`Model`]: crate::Model
pub trait EquationProblem {
    type Input;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the model input for the solver variable `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if `x` cannot be mapped to a valid input.
    fn input(&self, x: f64) -> Result<Self::Input, Self::Error>;

    /// Computes the residual `f(x)` from the model input and output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residual cannot be computed.
    fn residual(&self, input: &Self::Input, output: &Self::Output) -> Result<f64, Self::Error>;

    /// Computes the slope `df/dx` from the model input and output.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the slope cannot be computed.
    fn derivative(&self, input: &Self::Input, output: &Self::Output)
    -> Result<f64, Self::Error>;
}
