/// Errors that can occur while running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: crate::Error,
    },
}

impl Error {
    /// The step that failed.
    #[must_use]
    pub fn step(&self) -> usize {
        match self {
            Self::Step { step, .. } => *step,
        }
    }
}
