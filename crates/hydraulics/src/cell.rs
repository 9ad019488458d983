use std::fmt;

use petrosim_core::constraint::{Constrained, StrictlyPositive};
use serde::Serialize;

use crate::{Error, error::constrained};

/// Asymptotic water–gas ratio of a fully water-swept cell, in g/m³.
pub const MAX_WGR: f64 = 1000.0;

/// Fraction of the initial pressure at which a cell is abandoned.
const ABANDONMENT_PRESSURE_FRACTION: f64 = 0.05;

/// Relative slack, as a fraction of the initial volume, within which a cell
/// counts as sitting at its abandonment volume.
const DEPLETION_TOLERANCE: f64 = 1e-9;

/// A material-balance cell of reservoir fluid.
///
/// Pressure is a linear function of the contained volume,
/// `p = V / V₀ · p₀`, and production stops once the cell reaches its
/// abandonment pressure of 5 % of `p₀`. The water–gas ratio rises toward
/// [`MAX_WGR`] as the cell is drained, weighted by its water inflow ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VolumeCell {
    #[serde(serialize_with = "serialize_constrained")]
    initial_volume: Constrained<f64, StrictlyPositive>,
    #[serde(serialize_with = "serialize_constrained")]
    initial_pressure: Constrained<f64, StrictlyPositive>,
    initial_wgr: f64,
    water_inflow_ratio: f64,
    current_volume: f64,
    current_pressure: f64,
    abandonment_pressure: f64,
    abandonment_volume: f64,
}

impl VolumeCell {
    /// Creates a cell at its initial state.
    ///
    /// Negative `initial_wgr` and `water_inflow_ratio` are clamped to zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the initial volume or pressure is
    /// zero, negative, or not finite.
    pub fn new(
        initial_volume: f64,
        initial_pressure: f64,
        initial_wgr: f64,
        water_inflow_ratio: f64,
    ) -> Result<Self, Error> {
        let initial_volume = constrained::<StrictlyPositive>("initial_volume", initial_volume)?;
        let initial_pressure =
            constrained::<StrictlyPositive>("initial_pressure", initial_pressure)?;

        let v0 = initial_volume.into_inner();
        let p0 = initial_pressure.into_inner();
        let abandonment_pressure = ABANDONMENT_PRESSURE_FRACTION * p0;

        Ok(Self {
            initial_volume,
            initial_pressure,
            initial_wgr: initial_wgr.max(0.0),
            water_inflow_ratio: water_inflow_ratio.max(0.0),
            current_volume: v0,
            current_pressure: p0,
            abandonment_pressure,
            abandonment_volume: abandonment_pressure / p0 * v0,
        })
    }

    /// Withdraws up to `volume` from the cell and returns the amount removed.
    ///
    /// Nothing is removed for a negative request or a depleted cell. A request
    /// larger than [`available_volume`](Self::available_volume) drains the
    /// cell to exactly its abandonment state and returns what was available.
    pub fn produce(&mut self, volume: f64) -> f64 {
        if volume.is_nan() || volume < 0.0 || self.is_depleted() {
            return 0.0;
        }

        let available = self.available_volume();
        if volume >= available {
            self.current_volume = self.abandonment_volume;
            self.current_pressure = self.abandonment_pressure;
            return available;
        }

        self.current_volume -= volume;
        self.current_pressure = self.volume_to_pressure(self.current_volume);
        volume
    }

    /// Adds `volume` to the cell and returns the amount added.
    ///
    /// Negative requests are ignored. There is no upper bound on the volume a
    /// cell can take.
    pub fn inject(&mut self, volume: f64) -> f64 {
        if volume.is_nan() || volume < 0.0 {
            return 0.0;
        }

        self.current_volume += volume;
        self.current_pressure = self.volume_to_pressure(self.current_volume);
        volume
    }

    /// Volume that can still be produced before abandonment.
    #[must_use]
    pub fn available_volume(&self) -> f64 {
        (self.current_volume - self.abandonment_volume).max(0.0)
    }

    /// Returns true once the cell has been drained to its abandonment volume.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current_volume
            <= self.abandonment_volume + DEPLETION_TOLERANCE * self.initial_volume()
    }

    /// Current water–gas ratio.
    ///
    /// Interpolates between the initial ratio of the full cell and
    /// `MAX_WGR × water_inflow_ratio` of an empty one, with the square root
    /// of the remaining volume fraction as weight. Never negative, even for a
    /// cell that has been filled beyond its initial volume.
    #[must_use]
    pub fn wgr(&self) -> f64 {
        let swept = MAX_WGR * self.water_inflow_ratio;
        let remaining = (self.current_volume / self.initial_volume()).sqrt();
        (swept + remaining * (self.initial_wgr - swept)).max(0.0)
    }

    #[must_use]
    pub fn current_pressure(&self) -> f64 {
        self.current_pressure
    }

    #[must_use]
    pub fn current_volume(&self) -> f64 {
        self.current_volume
    }

    #[must_use]
    pub fn initial_volume(&self) -> f64 {
        self.initial_volume.into_inner()
    }

    #[must_use]
    pub fn initial_pressure(&self) -> f64 {
        self.initial_pressure.into_inner()
    }

    #[must_use]
    pub fn initial_wgr(&self) -> f64 {
        self.initial_wgr
    }

    #[must_use]
    pub fn water_inflow_ratio(&self) -> f64 {
        self.water_inflow_ratio
    }

    #[must_use]
    pub fn abandonment_pressure(&self) -> f64 {
        self.abandonment_pressure
    }

    #[must_use]
    pub fn abandonment_volume(&self) -> f64 {
        self.abandonment_volume
    }

    fn volume_to_pressure(&self, volume: f64) -> f64 {
        volume / self.initial_volume() * self.initial_pressure()
    }
}

fn serialize_constrained<S: serde::Serializer>(
    value: &Constrained<f64, StrictlyPositive>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(*value.as_ref())
}

/// Handle to a [`VolumeCell`] stored in a [`Cells`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CellId(usize);

impl CellId {
    /// Position of the cell in its arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell #{}", self.0)
    }
}

/// Arena owning every [`VolumeCell`] of a reservoir.
///
/// Connections and wells refer to cells by [`CellId`], so one cell can be
/// shared by any number of them. Cells are never removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cells {
    cells: Vec<VolumeCell>,
}

impl Cells {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a cell and returns its handle.
    pub fn insert(&mut self, cell: VolumeCell) -> CellId {
        self.cells.push(cell);
        CellId(self.cells.len() - 1)
    }

    /// Returns the cell behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if `id` belongs to another arena.
    pub fn get(&self, id: CellId) -> Result<&VolumeCell, Error> {
        self.cells.get(id.0).ok_or(Error::UnknownCell(id))
    }

    /// Returns the cell behind `id` mutably.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCell`] if `id` belongs to another arena.
    pub fn get_mut(&mut self, id: CellId) -> Result<&mut VolumeCell, Error> {
        self.cells.get_mut(id.0).ok_or(Error::UnknownCell(id))
    }

    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        id.0 < self.cells.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (CellId, &VolumeCell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| (CellId(index), cell))
    }

    /// Sum of the current volumes of all cells.
    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.cells.iter().map(VolumeCell::current_volume).sum()
    }
}
