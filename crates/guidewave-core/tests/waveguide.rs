//! Integration tests: a straight dielectric waveguide driven by a point source.
//!
//! The setup is a 16 x 8 cell with a slab of permittivity 12 and unit width
//! along x, a continuous-wave source at (-7, 0), and a PML of thickness 1.

use guidewave_core::prelude::*;

const CELL: [f64; 2] = [16.0, 8.0];
const RESOLUTION: f64 = 10.0;

fn waveguide(frequency: f64) -> Simulation {
    let slab = GeometricObject::new(
        Shape::Block(Block {
            center: [0.0, 0.0],
            size: [f64::INFINITY, 1.0],
        }),
        Medium::dielectric(12.0),
    );
    Simulation::builder(CELL, RESOLUTION)
        .add_object(slab)
        .add_source(Source::point(
            SourceTime::continuous(frequency),
            Component::Ez,
            [-7.0, 0.0],
        ))
        .pml_layers(vec![Pml::new(1.0)])
        .build()
        .expect("waveguide configuration is valid")
}

fn mean_square(ez: &ndarray::Array2<f64>, xs: std::ops::Range<usize>, ys: std::ops::Range<usize>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for i in xs {
        for j in ys.clone() {
            sum += ez[[i, j]] * ez[[i, j]];
            count += 1;
        }
    }
    sum / count as f64
}

#[test]
fn test_permittivity_map() {
    let sim = waveguide(0.15);
    let eps = sim.get_array(Component::Dielectric, &Volume::whole(CELL)).unwrap();
    assert_eq!(eps.dim(), (160, 80));
    for i in 0..160 {
        for j in 0..80 {
            let expected = if (35..45).contains(&j) { 12.0 } else { 1.0 };
            assert_eq!(eps[[i, j]], expected, "eps[{i}][{j}]");
        }
    }
}

#[test]
fn test_run_is_deterministic() {
    let whole = Volume::whole(CELL);
    let mut a = waveguide(0.15);
    let mut b = waveguide(0.15);
    a.run_for(30.0).unwrap();
    b.run_for(30.0).unwrap();
    assert_eq!(
        a.get_array(Component::Ez, &whole).unwrap(),
        b.get_array(Component::Ez, &whole).unwrap()
    );
}

#[test]
fn test_run_for_is_relative() {
    let mut sim = waveguide(0.15);
    sim.run_for(10.0).unwrap();
    let stats = sim.run_for(10.0).unwrap();
    assert_eq!(stats.steps, 200);
    assert!((sim.time() - 20.0).abs() < 1e-9);
}

#[test]
fn test_field_is_mirror_symmetric() {
    let mut sim = waveguide(0.15);
    sim.run_for(60.0).unwrap();
    let ez = sim.get_array(Component::Ez, &Volume::whole(CELL)).unwrap();
    let peak = ez.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    assert!(peak > 0.0);
    for i in 0..160 {
        for j in 0..40 {
            let diff = (ez[[i, j]] - ez[[i, 79 - j]]).abs();
            assert!(diff <= 1e-6 * peak, "asymmetry {diff} at [{i}][{j}]");
        }
    }
}

#[test]
fn test_mode_is_guided() {
    let mut sim = waveguide(0.15);
    let stats = sim.run_for(200.0).unwrap();
    assert_eq!(stats.steps, 4000);
    assert!(stats.field_energy.is_finite() && stats.field_energy > 0.0);

    let ez = sim.get_array(Component::Ez, &Volume::whole(CELL)).unwrap();
    assert!(ez.iter().all(|v| v.is_finite()));
    // Downstream of the source, well away from the PML.
    let core = mean_square(&ez, 40..140, 37..43);
    let cladding = mean_square(&ez, 40..140, 12..22);
    assert!(core > 10.0 * cladding, "core {core:e} vs cladding {cladding:e}");
}

#[test]
fn test_pml_absorbs_pulse() {
    let pulse = || SourceTime::gaussian(0.5, 0.5);
    let build = |pml: Vec<Pml>| {
        Simulation::builder([8.0, 8.0], RESOLUTION)
            .add_source(Source::point(pulse(), Component::Ez, [0.0, 0.0]))
            .pml_layers(pml)
            .build()
            .unwrap()
    };

    let pulse_end = pulse().end_time();
    let mut open = build(vec![Pml::new(1.0)]);
    let mut closed = build(Vec::new());
    open.run_until(pulse_end).unwrap();
    closed.run_until(pulse_end).unwrap();
    let reference = closed.field_energy();
    assert!(reference > 0.0);

    open.run_until(pulse_end + 40.0).unwrap();
    closed.run_until(pulse_end + 40.0).unwrap();
    assert!(open.field_energy() < 1e-3 * reference, "residual {:e}", open.field_energy());
    // Without absorption the energy stays in the box.
    assert!(closed.field_energy() > 0.5 * reference);
}

#[test]
fn test_closed_box_is_mirror_symmetric() {
    let cell = [4.0, 4.0];
    let mut sim = Simulation::builder(cell, RESOLUTION)
        .add_source(Source::point(SourceTime::gaussian(0.5, 0.5), Component::Ez, [0.0, 0.0]))
        .build()
        .unwrap();
    sim.run_for(30.0).unwrap();
    let ez = sim.get_array(Component::Ez, &Volume::whole(cell)).unwrap();
    let (nx, ny) = ez.dim();
    let peak = ez.iter().fold(0.0f64, |m, v| m.max(v.abs()));
    assert!(peak > 0.0);
    for i in 0..nx {
        for j in 0..ny {
            let flip_y = (ez[[i, j]] - ez[[i, ny - 1 - j]]).abs();
            let flip_x = (ez[[i, j]] - ez[[nx - 1 - i, j]]).abs();
            assert!(flip_y <= 1e-9 * peak, "y asymmetry {flip_y} at [{i}][{j}]");
            assert!(flip_x <= 1e-9 * peak, "x asymmetry {flip_x} at [{i}][{j}]");
        }
    }
}

#[test]
fn test_degenerate_pml_is_rejected() {
    let mut layer = Pml::new(1.0);
    layer.r_asymptotic = 0.0;
    let result = Simulation::builder(CELL, RESOLUTION)
        .add_source(Source::point(SourceTime::continuous(0.15), Component::Ez, [-7.0, 0.0]))
        .pml_layers(vec![layer])
        .build();
    assert!(matches!(result, Err(SolverError::InvalidPml { axis: 'x', .. })));
}
