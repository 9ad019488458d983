//! Depletes a randomly generated layered reservoir.
//!
//! ```text
//! RUST_LOG=info cargo run -p petrosim-observers --example depletion -- 42
//! ```
//!
//! The optional argument seeds the generator.

use std::error::Error;

use petrosim_core::Observer;
use petrosim_hydraulics::{
    Well, WellControl, WellControls, WellGeometry,
    generate::{self, GenerationConfig},
    simulation,
};
use petrosim_observers::{EconomicLimit, TraceObserver};
use rand::{SeedableRng, rngs::StdRng};
use tracing_subscriber::EnvFilter;

const TIMESTEP_DAYS: f64 = 10.0;
const MAX_STEPS: usize = 500;
const TUBING_HEAD_PRESSURE: f64 = 20.0;
const PRODUCTIVITY: f64 = 0.002;
/// Field rate below which production stops, in 1000 m³ per step.
const ECONOMIC_LIMIT: f64 = 5.0;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 42,
    };

    let config = GenerationConfig {
        layers: 12,
        zones: 4,
        total_volume: 5000.0,
        ..GenerationConfig::default()
    };
    let generate::GeneratedReservoir {
        mut reservoir,
        zones,
        connections,
    } = generate::layered(&config, &mut StdRng::seed_from_u64(seed))?;

    println!("seed {seed}: {} zones, {} connections", zones.len(), connections.len());
    for zone in &zones {
        println!(
            "  layer {:>2}  h = {:5.1} m  k = {:6.2} mD  V = {:7.1}",
            zone.layer,
            zone.thickness,
            zone.permeability,
            reservoir.cell(zone.cell)?.initial_volume(),
        );
    }

    let geometry = WellGeometry::from_meters(1200.0, 700.0, 0.1)?;
    let mut controls = WellControls::new();
    for zone in &zones {
        let well = reservoir.add_well(Well::new(geometry, zone.cell, PRODUCTIVITY)?)?;
        controls.set(well, WellControl::TubingHeadPressure(TUBING_HEAD_PRESSURE));
    }

    let mut trace = TraceObserver::new("depletion");
    let mut limit = EconomicLimit::with_patience(ECONOMIC_LIMIT, 3);
    let observer = |event: &simulation::Event<'_>| -> Option<simulation::Action> {
        let _: Option<simulation::Action> = trace.observe(event);
        limit.observe(event)
    };

    let initial_volume = reservoir.total_volume();
    let solution = simulation::run(&mut reservoir, &controls, TIMESTEP_DAYS, MAX_STEPS, observer)?;

    let produced = solution.cumulative_production();
    println!(
        "{:?} after {} steps ({} days)",
        solution.status,
        solution.steps,
        solution.steps as f64 * TIMESTEP_DAYS,
    );
    println!(
        "produced {produced:.1} of {initial_volume:.1} ({:.1} %)",
        100.0 * produced / initial_volume,
    );

    for (id, well) in reservoir.wells() {
        let mode = reservoir.well_mode(id, TUBING_HEAD_PRESSURE)?;
        println!(
            "  {id} on {}: p = {:6.1} bar, wgr = {:6.1}, rate = {:?}",
            well.cell(),
            mode.reservoir_pressure,
            mode.wgr,
            mode.rate,
        );
    }

    Ok(())
}
