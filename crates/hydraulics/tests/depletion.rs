//! Multi-cell depletion runs through the reservoir and the driver.

use approx::assert_relative_eq;
use petrosim_hydraulics::{
    CellId, Reservoir, VolumeCell, Well, WellControl, WellControls, WellGeometry,
    config::ReservoirConfig,
    generate::{self, GenerationConfig},
    simulation::{self, Status},
};
use rand::{SeedableRng, rngs::StdRng};

const THREE_ZONE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/three_zone.toml");

#[test]
fn configured_reservoir_conserves_volume() {
    let config = ReservoirConfig::load(THREE_ZONE).unwrap();
    let mut reservoir = config.build().unwrap();
    let controls = config.controls(&reservoir);
    let initial_volume = reservoir.total_volume();
    let producing_cell = reservoir.wells().next().unwrap().1.cell();
    let initial_wgr = reservoir.cell(producing_cell).unwrap().wgr();

    let solution = simulation::run_unobserved(&mut reservoir, &controls, 5.0, 60).unwrap();

    assert_eq!(solution.status, Status::Complete);
    assert_eq!(solution.history.len(), 60);
    assert_relative_eq!(
        initial_volume - solution.cumulative_production(),
        reservoir.total_volume(),
        max_relative = 1e-9
    );

    let first = solution.history.first().unwrap().report.wells[0].rate.value();
    let last = solution.history.last().unwrap().report.wells[0].rate.value();
    assert!(last >= 0.0 && last < first);
    assert!(reservoir.cell(producing_cell).unwrap().wgr() > initial_wgr);

    for (_, cell) in reservoir.cells().iter() {
        assert!(cell.current_volume() >= cell.abandonment_volume());
    }
}

/// Cells as `(volume, pressure, wgr, water inflow ratio)`.
const CELLS: [(f64, f64, f64, f64); 3] = [
    (500.0, 180.0, 0.0, 0.0),
    (800.0, 200.0, 1.0, 0.1),
    (300.0, 120.0, 0.0, 0.0),
];

/// Connections as `(first, second, transmissibility, threshold)` over
/// indices into [`CELLS`].
const LINKS: [(usize, usize, f64, f64); 3] =
    [(0, 1, 0.5, 0.5), (1, 2, 2.0, 0.5), (2, 0, 1.0, 0.0)];

/// Builds the reservoir inserting cells, links and wells in the given orders
/// and returns the handle of each cell by its index in [`CELLS`].
fn build(
    cell_order: &[usize],
    link_order: &[usize],
    reverse_wells: bool,
) -> (Reservoir, Vec<CellId>, WellControls) {
    let mut reservoir = Reservoir::new();
    let mut handles = vec![None; CELLS.len()];
    for &i in cell_order {
        let (v, p, wgr, wir) = CELLS[i];
        handles[i] = Some(reservoir.add_cell(VolumeCell::new(v, p, wgr, wir).unwrap()));
    }
    let handles: Vec<CellId> = handles.into_iter().map(Option::unwrap).collect();

    for &i in link_order {
        let (a, b, t, threshold) = LINKS[i];
        reservoir.connect(handles[a], handles[b], t, threshold).unwrap();
    }

    let geometry = WellGeometry::from_meters(1200.0, 700.0, 0.1).unwrap();
    let mut wells = vec![
        (handles[1], WellControl::TubingHeadPressure(20.0)),
        (handles[1], WellControl::BottomHolePressure(60.0)),
        (handles[2], WellControl::BottomHolePressure(30.0)),
    ];
    if reverse_wells {
        wells.reverse();
    }

    let mut controls = WellControls::new();
    for (cell, control) in wells {
        let id = reservoir.add_well(Well::new(geometry, cell, 0.01).unwrap()).unwrap();
        controls.set(id, control);
    }

    (reservoir, handles, controls)
}

#[test]
fn step_result_is_independent_of_insertion_order() {
    let (mut forward, forward_cells, forward_controls) = build(&[0, 1, 2], &[0, 1, 2], false);
    let (mut shuffled, shuffled_cells, shuffled_controls) = build(&[2, 0, 1], &[2, 0, 1], true);

    for _ in 0..5 {
        let a = forward.step(1.0, &forward_controls).unwrap();
        let b = shuffled.step(1.0, &shuffled_controls).unwrap();
        assert_relative_eq!(a.total_produced(), b.total_produced(), max_relative = 1e-9);
    }

    for (a, b) in forward_cells.iter().zip(&shuffled_cells) {
        let a = forward.cell(*a).unwrap();
        let b = shuffled.cell(*b).unwrap();
        assert_relative_eq!(a.current_volume(), b.current_volume(), max_relative = 1e-9);
        assert_relative_eq!(a.current_pressure(), b.current_pressure(), max_relative = 1e-9);
    }
}

#[test]
fn generated_reservoir_runs_to_depletion() {
    let config = GenerationConfig {
        zones: 4,
        ..GenerationConfig::default()
    };
    let generate::GeneratedReservoir {
        mut reservoir,
        zones,
        ..
    } = generate::layered(&config, &mut StdRng::seed_from_u64(2024)).unwrap();

    let geometry = WellGeometry::from_meters(1200.0, 700.0, 0.1).unwrap();
    for zone in &zones {
        reservoir
            .add_well(Well::new(geometry, zone.cell, 0.01).unwrap())
            .unwrap();
    }
    let controls =
        WellControls::uniform(reservoir.well_ids(), WellControl::BottomHolePressure(0.0));

    let mut depleted = Vec::new();
    let observer = |event: &simulation::Event<'_>| -> Option<simulation::Action> {
        depleted.extend_from_slice(&event.report.depleted);
        None
    };
    let solution = simulation::run(&mut reservoir, &controls, 1.0, 1000, observer).unwrap();

    assert_eq!(solution.status, Status::Depleted);
    assert!(reservoir.is_depleted());

    depleted.sort();
    depleted.dedup();
    let mut cells: Vec<CellId> = zones.iter().map(|zone| zone.cell).collect();
    cells.sort();
    assert_eq!(depleted, cells);

    // Everything above abandonment pressure was produced.
    let abandoned: f64 = reservoir
        .cells()
        .iter()
        .map(|(_, cell)| cell.abandonment_volume())
        .sum();
    assert_relative_eq!(
        solution.cumulative_production(),
        config.total_volume - abandoned,
        max_relative = 1e-9
    );
}
