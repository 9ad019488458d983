//! Random layered reservoirs.
//!
//! A reservoir is built as a vertical stack of layers, some of which are
//! productive zones. Each zone becomes one [`VolumeCell`], and vertically
//! adjacent zones are joined by a [`VolumeCellConnection`](crate::VolumeCellConnection).
//!
//! Generation is deterministic for a given random number generator state:
//!
//! ```
//! use petrosim_hydraulics::generate::{self, GenerationConfig};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let config = GenerationConfig::default();
//! let a = generate::layered(&config, &mut StdRng::seed_from_u64(7)).unwrap();
//! let b = generate::layered(&config, &mut StdRng::seed_from_u64(7)).unwrap();
//!
//! assert_eq!(a.zones, b.zones);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{CellId, ConnectionId, Error, Reservoir, VolumeCell, error::ensure_non_negative};

/// Lower bound of a zone's thickness, as a fraction of the maximum.
const MIN_THICKNESS_FRACTION: f64 = 0.1;
/// Lower bound of a zone's permeability, as a fraction of the maximum.
const MIN_PERMEABILITY_FRACTION: f64 = 0.01;

/// Parameters of a generated reservoir.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Number of stacked layers.
    pub layers: usize,
    /// Number of productive layers among them.
    pub zones: usize,
    /// Upper bound of a zone's permeability, in mD.
    pub max_permeability: f64,
    /// Upper bound of a zone's thickness, in metres.
    pub max_thickness: f64,
    /// Volume shared among all zones, in 1000 m³.
    pub total_volume: f64,
    /// Initial pressure of every zone, in bar.
    pub initial_pressure: f64,
    pub wgr: f64,
    pub water_inflow_ratio: f64,
    /// Scales `harmonic_mean(k) / mean(h)` into a transmissibility.
    pub coupling: f64,
    pub pressure_threshold: f64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            layers: 10,
            zones: 3,
            max_permeability: 100.0,
            max_thickness: 20.0,
            total_volume: 1000.0,
            initial_pressure: 250.0,
            wgr: 0.0,
            water_inflow_ratio: 0.0,
            coupling: 0.01,
            pressure_threshold: 0.5,
        }
    }
}

impl GenerationConfig {
    /// Checks the configuration for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if there are no zones, more zones
    /// than layers, or a non-positive maximum, volume or pressure.
    pub fn validate(&self) -> Result<(), Error> {
        if self.zones == 0 {
            return Err(Error::invalid("zones", 0.0, "must be at least one"));
        }
        if self.zones > self.layers {
            return Err(Error::invalid(
                "zones",
                self.zones as f64,
                "must not exceed the number of layers",
            ));
        }

        for (name, value) in [
            ("max_permeability", self.max_permeability),
            ("max_thickness", self.max_thickness),
            ("total_volume", self.total_volume),
            ("initial_pressure", self.initial_pressure),
        ] {
            #[allow(clippy::float_cmp)]
            if ensure_non_negative(name, value)? == 0.0 {
                return Err(Error::invalid(name, value, "must not be zero"));
            }
        }

        ensure_non_negative("coupling", self.coupling)?;
        ensure_non_negative("pressure_threshold", self.pressure_threshold)?;
        Ok(())
    }
}

/// A productive layer of a generated reservoir.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Zone {
    /// Position in the layer stack, from the top.
    pub layer: usize,
    pub cell: CellId,
    pub thickness: f64,
    pub permeability: f64,
}

/// A generated reservoir with the zones it was built from.
#[derive(Debug, Clone)]
pub struct GeneratedReservoir {
    pub reservoir: Reservoir,
    /// Zones ordered from top to bottom.
    pub zones: Vec<Zone>,
    /// Connection between zone `i` and zone `i + 1`.
    pub connections: Vec<ConnectionId>,
}

/// Generates a layered reservoir using `rng` for every random draw.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if the configuration is invalid.
pub fn layered<R: Rng + ?Sized>(
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<GeneratedReservoir, Error> {
    config.validate()?;

    let mut layers: Vec<usize> = (0..config.layers).collect();
    while layers.len() > config.zones {
        layers.remove(rng.gen_range(0..layers.len()));
    }

    let draws: Vec<(usize, f64, f64)> = layers
        .into_iter()
        .map(|layer| {
            let thickness = rng.gen_range(
                MIN_THICKNESS_FRACTION * config.max_thickness..=config.max_thickness,
            );
            let permeability = rng.gen_range(
                MIN_PERMEABILITY_FRACTION * config.max_permeability..=config.max_permeability,
            );
            (layer, thickness, permeability)
        })
        .collect();

    let total_thickness: f64 = draws.iter().map(|&(_, thickness, _)| thickness).sum();

    let mut reservoir = Reservoir::new();
    let mut zones = Vec::with_capacity(draws.len());
    for (layer, thickness, permeability) in draws {
        let cell = reservoir.add_cell(VolumeCell::new(
            config.total_volume * thickness / total_thickness,
            config.initial_pressure,
            config.wgr,
            config.water_inflow_ratio,
        )?);
        zones.push(Zone {
            layer,
            cell,
            thickness,
            permeability,
        });
    }

    let mut connections = Vec::with_capacity(zones.len().saturating_sub(1));
    for pair in zones.windows(2) {
        let [upper, lower] = [pair[0], pair[1]];
        let transmissibility = config.coupling
            * harmonic_mean(upper.permeability, lower.permeability)
            / (0.5 * (upper.thickness + lower.thickness));
        connections.push(reservoir.connect(
            upper.cell,
            lower.cell,
            transmissibility,
            config.pressure_threshold,
        )?);
    }

    debug!(
        zones = zones.len(),
        layers = config.layers,
        "generated layered reservoir"
    );

    Ok(GeneratedReservoir {
        reservoir,
        zones,
        connections,
    })
}

fn harmonic_mean(a: f64, b: f64) -> f64 {
    2.0 * a * b / (a + b)
}
