use petrosim_core::Observer;
use tracing::info;

use crate::traits::{CanStopEarly, HasProduction};

/// Stops a run once production stays below an economic floor.
///
/// The floor applies to the volume produced per event. A run is stopped after
/// `patience` consecutive events below it, so a single poor step does not end
/// it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EconomicLimit {
    min_production: f64,
    patience: usize,
    below: usize,
}

impl EconomicLimit {
    /// Stops at the first event below `min_production`.
    #[must_use]
    pub fn new(min_production: f64) -> Self {
        Self::with_patience(min_production, 1)
    }

    /// Stops after `patience` consecutive events below `min_production`.
    ///
    /// A patience of zero behaves like one.
    #[must_use]
    pub fn with_patience(min_production: f64, patience: usize) -> Self {
        Self {
            min_production,
            patience: patience.max(1),
            below: 0,
        }
    }

    #[must_use]
    pub fn min_production(&self) -> f64 {
        self.min_production
    }
}

impl<E: HasProduction, A: CanStopEarly> Observer<E, A> for EconomicLimit {
    fn observe(&mut self, event: &E) -> Option<A> {
        let production = event.production();
        if production >= self.min_production {
            self.below = 0;
            return None;
        }

        self.below += 1;
        if self.below < self.patience {
            return None;
        }

        info!(
            production,
            min_production = self.min_production,
            "production below economic limit"
        );
        Some(A::stop_early())
    }
}
