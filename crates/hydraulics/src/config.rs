//! TOML description of a reservoir.
//!
//! Cells are listed in order; connections and wells refer to them by
//! zero-based index. Well geometry is given in metres.
//!
//! ```toml
//! [solver]
//! residual_tol = 0.1
//!
//! [[cells]]
//! volume = 1000.0
//! pressure = 200.0
//!
//! [[cells]]
//! volume = 500.0
//! pressure = 180.0
//! wgr = 2.0
//! water_inflow_ratio = 0.1
//!
//! [[connections]]
//! cells = [0, 1]
//! transmissibility = 0.05
//! pressure_threshold = 0.5
//!
//! [[wells]]
//! cell = 1
//! productivity = 0.01
//! measured_depth = 1200.0
//! vertical_depth = 700.0
//! inner_diameter = 0.1
//! control = { mode = "tubing_head_pressure", pressure = 20.0 }
//! ```

use std::{fs, io, path::Path, path::PathBuf};

use petrosim_solvers::equation::newton;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{CellId, Reservoir, VolumeCell, Well, WellControl, WellControls, WellGeometry};

/// Errors raised while loading or building a reservoir description.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid reservoir description")]
    Parse(#[from] toml::de::Error),

    #[error("{context} refers to cell {index}, but only {cells} cells are defined")]
    UnknownCellIndex {
        context: &'static str,
        index: usize,
        cells: usize,
    },

    #[error("invalid solver settings")]
    Solver(#[from] newton::ConfigError),

    #[error("invalid reservoir parameters")]
    Invalid(#[from] crate::Error),
}

/// A complete reservoir description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReservoirConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub cells: Vec<CellConfig>,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
    #[serde(default)]
    pub wells: Vec<WellConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellConfig {
    pub volume: f64,
    pub pressure: f64,
    #[serde(default)]
    pub wgr: f64,
    #[serde(default)]
    pub water_inflow_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    pub cells: [usize; 2],
    pub transmissibility: f64,
    #[serde(default)]
    pub pressure_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WellConfig {
    pub cell: usize,
    pub productivity: f64,
    pub measured_depth: f64,
    pub vertical_depth: f64,
    pub inner_diameter: f64,
    /// Initial control of the well, shut when absent.
    #[serde(default)]
    pub control: WellControl,
}

/// Settings of the well rate solver, shared by every well.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    pub max_iters: usize,
    /// Pressure mismatch tolerance, in bar.
    pub residual_tol: f64,
    pub divergence_limit: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iters: 50,
            residual_tol: 0.1,
            divergence_limit: 5,
        }
    }
}

impl SolverConfig {
    /// # Errors
    ///
    /// Fails for a negative or non-finite tolerance.
    pub fn validate(&self) -> Result<newton::Config, newton::ConfigError> {
        newton::Config::new(self.max_iters, self.residual_tol, self.divergence_limit)
    }
}

impl ReservoirConfig {
    /// Parses a description from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, missing fields or
    /// unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a description from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&text)?;
        info!(
            path = %path.display(),
            cells = config.cells.len(),
            connections = config.connections.len(),
            wells = config.wells.len(),
            "loaded reservoir description"
        );
        Ok(config)
    }

    /// Builds the described reservoir.
    ///
    /// Cell `i` of the description becomes the `i`-th cell of the reservoir,
    /// and likewise for connections and wells.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range cell index, invalid solver settings, or any
    /// physical parameter the engine rejects.
    pub fn build(&self) -> Result<Reservoir, ConfigError> {
        let solver = self.solver.validate()?;
        let mut reservoir = Reservoir::new();

        let cells: Vec<CellId> = self
            .cells
            .iter()
            .map(|cell| {
                VolumeCell::new(cell.volume, cell.pressure, cell.wgr, cell.water_inflow_ratio)
                    .map(|cell| reservoir.add_cell(cell))
            })
            .collect::<Result<_, _>>()?;

        let lookup = |context: &'static str, index: usize| {
            cells
                .get(index)
                .copied()
                .ok_or(ConfigError::UnknownCellIndex {
                    context,
                    index,
                    cells: cells.len(),
                })
        };

        for connection in &self.connections {
            let [first, second] = connection.cells;
            reservoir.connect(
                lookup("connection", first)?,
                lookup("connection", second)?,
                connection.transmissibility,
                connection.pressure_threshold,
            )?;
        }

        for well in &self.wells {
            let geometry = WellGeometry::from_meters(
                well.measured_depth,
                well.vertical_depth,
                well.inner_diameter,
            )?;
            let cell = lookup("well", well.cell)?;
            let well = Well::new(geometry, cell, well.productivity)?.with_solver_config(solver);
            reservoir.add_well(well)?;
        }

        Ok(reservoir)
    }

    /// Initial well controls for a reservoir built from this description.
    #[must_use]
    pub fn controls(&self, reservoir: &Reservoir) -> WellControls {
        reservoir
            .well_ids()
            .zip(self.wells.iter().map(|well| well.control))
            .collect()
    }
}
