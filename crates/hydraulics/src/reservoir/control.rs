use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::WellId;

/// How a well is operated during a timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "pressure", rename_all = "snake_case")]
pub enum WellControl {
    /// Closed in, produces nothing.
    #[default]
    Shut,
    /// Flowing at a fixed bottom-hole pressure, in bar.
    BottomHolePressure(f64),
    /// Flowing against a fixed tubing head pressure, in bar.
    TubingHeadPressure(f64),
}

/// Controls for the wells of a reservoir. Wells without an entry are shut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WellControls {
    controls: BTreeMap<WellId, WellControl>,
}

impl WellControls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the same control to every well in `wells`.
    pub fn uniform(wells: impl IntoIterator<Item = WellId>, control: WellControl) -> Self {
        wells.into_iter().map(|well| (well, control)).collect()
    }

    #[must_use]
    pub fn with(mut self, well: WellId, control: WellControl) -> Self {
        self.set(well, control);
        self
    }

    pub fn set(&mut self, well: WellId, control: WellControl) {
        self.controls.insert(well, control);
    }

    #[must_use]
    pub fn get(&self, well: WellId) -> WellControl {
        self.controls.get(&well).copied().unwrap_or_default()
    }

    /// Wells with an explicit control.
    pub fn wells(&self) -> impl Iterator<Item = WellId> + '_ {
        self.controls.keys().copied()
    }
}

impl FromIterator<(WellId, WellControl)> for WellControls {
    fn from_iter<T: IntoIterator<Item = (WellId, WellControl)>>(iter: T) -> Self {
        Self {
            controls: iter.into_iter().collect(),
        }
    }
}
