use serde::Serialize;

/// Rate reported for a well that cannot flow, for consumers that expect a
/// plain number.
pub const NON_FLOWING_RATE: f64 = -1.0;

/// Outcome of solving a well for its production rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "rate", rename_all = "snake_case")]
pub enum WellRate {
    /// The well delivers this rate, in 1000 m³/day.
    Flowing(f64),
    /// The reservoir cannot lift fluid against the tubing head pressure.
    NonFlowing,
}

impl WellRate {
    /// The rate as a number, [`NON_FLOWING_RATE`] for a dead well.
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Self::Flowing(rate) => rate,
            Self::NonFlowing => NON_FLOWING_RATE,
        }
    }

    /// The rate of a flowing well.
    #[must_use]
    pub fn flowing(self) -> Option<f64> {
        match self {
            Self::Flowing(rate) => Some(rate),
            Self::NonFlowing => None,
        }
    }

    #[must_use]
    pub fn is_flowing(self) -> bool {
        matches!(self, Self::Flowing(_))
    }
}

/// Operating point of a well at a given tubing head pressure.
///
/// Taken at one instant; it does not follow later changes to the reservoir.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WellMode {
    pub tubing_pressure: f64,
    pub rate: WellRate,
    /// Bottom-hole pressure. Equal to the reservoir pressure when the well is
    /// not flowing.
    pub bottom_pressure: f64,
    pub reservoir_pressure: f64,
    pub wgr: f64,
}
