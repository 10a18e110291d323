//! Finite-difference time-domain engine for the TMz polarisation.
//!
//! [`Simulation`] owns the Yee grid, the CPML state, and the compiled
//! sources. It is configured through [`SimulationBuilder`]:
//!
//! ```no_run
//! use guidewave_core::prelude::*;
//!
//! let waveguide = GeometricObject::new(
//!     Shape::Block(Block { center: [0.0, 0.0], size: [f64::INFINITY, 1.0] }),
//!     Medium::dielectric(12.0),
//! );
//! let mut sim = Simulation::builder([16.0, 8.0], 10.0)
//!     .add_object(waveguide)
//!     .add_source(Source::point(SourceTime::continuous(0.15), Component::Ez, [-7.0, 0.0]))
//!     .pml_layers(vec![Pml::new(1.0)])
//!     .build()
//!     .unwrap();
//! sim.run_for(200.0).unwrap();
//! let ez = sim.get_array(Component::Ez, &Volume::whole([16.0, 8.0])).unwrap();
//! ```

mod grid;
pub mod pml;

pub use self::pml::{Pml, PmlDirection};

use std::ops::Range;
use std::time::Instant;

use guidewave_geometry::{rasterise, GeometricObject, Lattice};
use guidewave_materials::Medium;
use log::{debug, info, warn};
use ndarray::{s, Array2};

use self::grid::YeeGrid;
use self::pml::{layer_for_axis, CpmlAxis};
use super::{FieldSolver, RunStats, SolverError};
use crate::source::Source;
use crate::types::{Component, Volume};

/// Default Courant factor $c\,\Delta t / \Delta x$.
pub const DEFAULT_COURANT: f64 = 0.5;

/// Default subpixel supersampling factor per axis.
pub const DEFAULT_SUBPIXEL_SAMPLES: usize = 4;

/// Number of whole timesteps needed to reach `time` from $t = 0$.
///
/// Float error in `time / dt` is tolerated, so 200 / 0.05 is 4000 steps.
pub fn step_count(time: f64, dt: f64) -> u64 {
    (time / dt - 1e-6).ceil().max(0.0) as u64
}

/// Configuration collected before the grid is allocated.
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    cell: [f64; 2],
    resolution: f64,
    geometry: Vec<GeometricObject>,
    default_material: Medium,
    sources: Vec<Source>,
    pml_layers: Vec<Pml>,
    courant: f64,
    subpixel_samples: usize,
    progress_interval: Option<u64>,
}

impl SimulationBuilder {
    /// Replace the geometry list. Later objects take precedence.
    pub fn geometry(mut self, objects: Vec<GeometricObject>) -> Self {
        self.geometry = objects;
        self
    }

    pub fn add_object(mut self, object: GeometricObject) -> Self {
        self.geometry.push(object);
        self
    }

    /// Medium outside every object (vacuum by default).
    pub fn default_material(mut self, medium: Medium) -> Self {
        self.default_material = medium;
        self
    }

    pub fn sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn add_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn pml_layers(mut self, layers: Vec<Pml>) -> Self {
        self.pml_layers = layers;
        self
    }

    pub fn courant(mut self, courant: f64) -> Self {
        self.courant = courant;
        self
    }

    /// Supersampling factor for material averaging; `1` disables averaging.
    pub fn subpixel_samples(mut self, samples: usize) -> Self {
        self.subpixel_samples = samples;
        self
    }

    /// Log progress every `steps` timesteps (default: ten reports per run).
    pub fn progress_interval(mut self, steps: u64) -> Self {
        self.progress_interval = Some(steps.max(1));
        self
    }

    /// Validate the configuration and allocate the grid.
    pub fn build(self) -> Result<Simulation, SolverError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(SolverError::InvalidResolution(self.resolution));
        }
        let [sx, sy] = self.cell;
        let lattice = Lattice::centred(self.cell, self.resolution);
        if !(sx.is_finite() && sy.is_finite()) || lattice.nx < 3 || lattice.ny < 3 {
            return Err(SolverError::InvalidCell(sx, sy));
        }

        let limit = std::f64::consts::FRAC_1_SQRT_2;
        if !(self.courant > 0.0 && self.courant <= limit) {
            return Err(SolverError::UnstableCourant {
                courant: self.courant,
                limit,
            });
        }

        self.default_material.validate()?;
        for object in &self.geometry {
            object.validate()?;
        }

        let dx = lattice.dx;
        let dt = self.courant * dx;

        let mut pml_axes = Vec::with_capacity(2);
        for (axis, (name, n)) in [('x', lattice.nx), ('y', lattice.ny)].into_iter().enumerate() {
            let layer = layer_for_axis(&self.pml_layers, axis);
            if let Some(layer) = layer {
                layer
                    .check()
                    .map_err(|reason| SolverError::InvalidPml { axis: name, reason })?;
                if 2.0 * layer.thickness >= self.cell[axis] {
                    return Err(SolverError::PmlTooThick {
                        axis: name,
                        thickness: layer.thickness,
                        cell: self.cell[axis],
                    });
                }
            }
            pml_axes.push(CpmlAxis::new(n, dx, dt, layer));
        }
        let pml_y = pml_axes.pop().unwrap_or_else(|| CpmlAxis::new(lattice.ny, dx, dt, None));
        let pml_x = pml_axes.pop().unwrap_or_else(|| CpmlAxis::new(lattice.nx, dx, dt, None));

        let mut sources = Vec::with_capacity(self.sources.len());
        for source in self.sources {
            sources.push(compile_source(source, &lattice, &pml_x, &pml_y)?);
        }

        let samples = self.subpixel_samples;
        let ez_map = rasterise(&self.geometry, &self.default_material, &lattice, Component::Ez.offset(), samples);
        let hx_map = rasterise(&self.geometry, &self.default_material, &lattice, Component::Hx.offset(), samples);
        let hy_map = rasterise(&self.geometry, &self.default_material, &lattice, Component::Hy.offset(), samples);

        info!(
            "FDTD grid: {}x{} cells (dx = {:.4}, dt = {:.4}), {} objects, {} sources",
            lattice.nx,
            lattice.ny,
            dx,
            dt,
            self.geometry.len(),
            sources.len()
        );
        debug!("CPML cells: x = {}, y = {}", pml_x.cells, pml_y.cells);

        let grid = YeeGrid::new(
            dx,
            dt,
            &ez_map.epsilon,
            &ez_map.conductivity,
            &hx_map.mu,
            &hy_map.mu,
            pml_x,
            pml_y,
        );

        Ok(Simulation {
            cell: self.cell,
            resolution: self.resolution,
            lattice,
            grid,
            epsilon: ez_map.epsilon,
            mu: ez_map.mu,
            sources,
            steps: 0,
            progress_interval: self.progress_interval,
        })
    }
}

/// A source together with the grid nodes it drives.
#[derive(Debug, Clone)]
struct SourceTerm {
    source: Source,
    /// `(i, j, weight)`; weights include the division by cell length for
    /// every axis along which the source has zero extent.
    nodes: Vec<(usize, usize, f64)>,
}

fn compile_source(
    source: Source,
    lattice: &Lattice,
    pml_x: &CpmlAxis,
    pml_y: &CpmlAxis,
) -> Result<SourceTerm, SolverError> {
    if source.component != Component::Ez {
        return Err(SolverError::UnsupportedSourceComponent(source.component));
    }
    if !source.time.validate() {
        return Err(SolverError::InvalidSourceTime(format!("{:?}", source.time)));
    }

    let xs = axis_nodes(lattice.nx, lattice.origin[0], lattice.dx, source.center[0], source.size[0]);
    let ys = axis_nodes(lattice.ny, lattice.origin[1], lattice.dx, source.center[1], source.size[1]);
    let nodes: Vec<(usize, usize, f64)> = xs
        .iter()
        .flat_map(|&(i, wx)| ys.iter().map(move |&(j, wy)| (i, j, wx * wy)))
        .collect();
    if nodes.is_empty() {
        return Err(SolverError::SourceOutsideCell(source.center[0], source.center[1]));
    }

    let in_pml = nodes.iter().any(|&(i, j, _)| pml_x.a_e[i] != 0.0 || pml_y.a_e[j] != 0.0);
    if in_pml {
        warn!(
            "Source at [{}, {}] overlaps the PML; part of its output will be absorbed",
            source.center[0], source.center[1]
        );
    }

    Ok(SourceTerm { source, nodes })
}

/// Nodes along one axis covered by `[center - size/2, center + size/2]`.
///
/// A zero-size extent is spread linearly onto the two nearest nodes, with the
/// weight divided by `dx` so the integrated current equals the amplitude.
fn axis_nodes(n: usize, origin: f64, dx: f64, center: f64, size: f64) -> Vec<(usize, f64)> {
    if size > 0.0 {
        let half = 0.5 * size + 1e-9 * dx;
        return (0..n)
            .filter(|&i| (origin + (i as f64 + 0.5) * dx - center).abs() <= half)
            .map(|i| (i, 1.0))
            .collect();
    }

    let f = (center - origin) / dx - 0.5;
    let i0 = f.floor();
    let w = f - i0;
    [(i0, 1.0 - w), (i0 + 1.0, w)]
        .into_iter()
        .filter(|&(idx, weight)| weight > 1e-12 && idx >= 0.0 && (idx as usize) < n)
        .map(|(idx, weight)| (idx as usize, weight / dx))
        .collect()
}

/// Indices along one axis whose samples (shifted by `offset` cells) lie in
/// `[lo, hi]`. A degenerate range selects the nearest sample.
fn sample_range(n: usize, origin: f64, dx: f64, offset: f64, lo: f64, hi: f64) -> Option<Range<usize>> {
    let to_index = |x: f64| (x - origin) / dx - 0.5 - offset;
    let tol = 1e-9;

    if hi - lo <= 0.0 {
        let f = to_index(lo);
        if f < -0.5 - tol || f > n as f64 - 0.5 + tol {
            return None;
        }
        let i = f.round().clamp(0.0, (n - 1) as f64) as usize;
        return Some(i..i + 1);
    }

    let first = (to_index(lo) - tol).ceil().max(0.0);
    let last = (to_index(hi) + tol).floor().min((n - 1) as f64);
    if first > last {
        return None;
    }
    Some(first as usize..last as usize + 1)
}

/// A configured 2D FDTD simulation.
pub struct Simulation {
    cell: [f64; 2],
    resolution: f64,
    lattice: Lattice,
    grid: YeeGrid,
    /// Material maps at the $E_z$ sample points, kept for array output.
    epsilon: Array2<f64>,
    mu: Array2<f64>,
    sources: Vec<SourceTerm>,
    steps: u64,
    progress_interval: Option<u64>,
}

impl Simulation {
    /// Start configuring a simulation of a `cell` centred on the origin with
    /// `resolution` grid points per unit length.
    pub fn builder(cell: [f64; 2], resolution: f64) -> SimulationBuilder {
        SimulationBuilder {
            cell,
            resolution,
            geometry: Vec::new(),
            default_material: Medium::vacuum(),
            sources: Vec::new(),
            pml_layers: Vec::new(),
            courant: DEFAULT_COURANT,
            subpixel_samples: DEFAULT_SUBPIXEL_SAMPLES,
            progress_interval: None,
        }
    }

    pub fn cell(&self) -> [f64; 2] {
        self.cell
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Timestep $\Delta t$.
    pub fn timestep(&self) -> f64 {
        self.grid.dt
    }

    /// Timesteps taken since construction or the last restart.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Timesteps that [`run_until`](FieldSolver::run_until) would take to reach `time`.
    pub fn steps_until(&self, time: f64) -> u64 {
        step_count(time, self.grid.dt).saturating_sub(self.steps)
    }

    /// Current electromagnetic energy in the cell.
    pub fn field_energy(&self) -> f64 {
        self.grid.energy()
    }

    /// Zero all fields and rewind the clock, keeping geometry and sources.
    pub fn restart_fields(&mut self) {
        self.grid.clear();
        self.steps = 0;
    }

    fn inject_sources(&mut self) {
        // Current is evaluated at the half step, between the H and E updates.
        let t = (self.steps as f64 + 0.5) * self.grid.dt;
        for term in &self.sources {
            let current = term.source.real_current(t);
            if current == 0.0 {
                continue;
            }
            for &(i, j, weight) in &term.nodes {
                self.grid.inject_current(i, j, current * weight);
            }
        }
    }
}

impl FieldSolver for Simulation {
    fn step(&mut self) {
        self.grid.update_h();
        self.grid.update_e();
        self.inject_sources();
        self.steps += 1;
    }

    fn time(&self) -> f64 {
        self.steps as f64 * self.grid.dt
    }

    fn run_until(&mut self, time: f64) -> Result<RunStats, SolverError> {
        if !time.is_finite() {
            return Err(SolverError::InvalidDuration(time));
        }
        let target = step_count(time, self.grid.dt);
        let todo = target.saturating_sub(self.steps);
        let interval = self.progress_interval.unwrap_or((todo / 10).max(1));

        info!(
            "Running {} timesteps from t = {:.3} to t = {:.3}",
            todo,
            self.time(),
            target as f64 * self.grid.dt
        );

        let start = Instant::now();
        for k in 1..=todo {
            self.step();
            if k % interval == 0 && k != todo {
                info!(
                    "  t = {:.2} ({:.0}%), energy = {:.4e}",
                    self.time(),
                    100.0 * k as f64 / todo as f64,
                    self.field_energy()
                );
            }
        }
        let wall_time = start.elapsed().as_secs_f64();

        let cells = self.lattice.len() as f64;
        let stats = RunStats {
            steps: todo,
            time: self.time(),
            wall_time,
            field_energy: self.field_energy(),
            mcells_per_sec: if wall_time > 0.0 {
                todo as f64 * cells / wall_time / 1e6
            } else {
                0.0
            },
        };
        info!(
            "Completed {} timesteps in {:.2}s ({:.1} MC/s)",
            stats.steps, stats.wall_time, stats.mcells_per_sec
        );
        Ok(stats)
    }

    fn get_array(&self, component: Component, volume: &Volume) -> Result<Array2<f64>, SolverError> {
        let offset = component.offset();
        let outside = || SolverError::VolumeOutsideCell(volume.center[0], volume.center[1], component);

        let [x_lo, x_hi] = volume.bounds(0);
        let [y_lo, y_hi] = volume.bounds(1);
        let l = &self.lattice;
        let xr = sample_range(l.nx, l.origin[0], l.dx, offset[0], x_lo, x_hi).ok_or_else(outside)?;
        let yr = sample_range(l.ny, l.origin[1], l.dx, offset[1], y_lo, y_hi).ok_or_else(outside)?;

        let source = match component {
            Component::Ez => &self.grid.ez,
            Component::Hx => &self.grid.hx,
            Component::Hy => &self.grid.hy,
            Component::Dielectric => &self.epsilon,
            Component::Permeability => &self.mu,
        };
        Ok(source.slice(s![xr, yr]).to_owned())
    }

    fn method_name(&self) -> &str {
        "FDTD (TMz Yee, CPML)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceTime;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_nodes_point_between_nodes() {
        // x = -7 in a cell starting at -8 with dx = 0.1 sits between nodes 9 and 10.
        let nodes = axis_nodes(160, -8.0, 0.1, -7.0, 0.0);
        assert_eq!(nodes.len(), 2);
        assert_eq!((nodes[0].0, nodes[1].0), (9, 10));
        assert_relative_eq!(nodes[0].1, 5.0, epsilon = 1e-6);
        assert_relative_eq!(nodes[1].1, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_nodes_extended() {
        let nodes = axis_nodes(80, -4.0, 0.1, 0.0, 1.0);
        assert_eq!(nodes.len(), 10);
        assert!(nodes.iter().all(|&(_, w)| w == 1.0));
        assert!(axis_nodes(10, 0.0, 1.0, 50.0, 0.0).is_empty());
    }

    #[test]
    fn test_sample_range() {
        assert_eq!(sample_range(160, -8.0, 0.1, 0.0, -8.0, 8.0), Some(0..160));
        assert_eq!(sample_range(80, -4.0, 0.1, 0.5, -4.0, 4.0), Some(0..80));
        assert_eq!(sample_range(160, -8.0, 0.1, 0.0, -1.0, 1.0), Some(70..90));
        assert_eq!(sample_range(80, -4.0, 0.1, 0.0, 0.02, 0.02), Some(40..41));
        assert_eq!(sample_range(80, -4.0, 0.1, 0.0, 9.0, 10.0), None);
    }

    #[test]
    fn test_build_rejects_bad_configs() {
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 0.0).build(),
            Err(SolverError::InvalidResolution(_))
        ));
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 10.0).courant(0.8).build(),
            Err(SolverError::UnstableCourant { .. })
        ));
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 10.0).pml_layers(vec![Pml::new(2.0)]).build(),
            Err(SolverError::PmlTooThick { axis: 'x', .. })
        ));
        let bad_layers: [fn(&mut Pml); 5] = [
            |p| p.r_asymptotic = 0.0,
            |p| p.r_asymptotic = 1.0,
            |p| p.grading_order = -1.0,
            |p| p.kappa_max = 0.5,
            |p| p.alpha_max = -0.1,
        ];
        for tweak in bad_layers {
            let mut pml = Pml::new(0.5);
            tweak(&mut pml);
            assert!(matches!(
                Simulation::builder([4.0, 4.0], 10.0).pml_layers(vec![pml]).build(),
                Err(SolverError::InvalidPml { axis: 'x', .. })
            ));
        }
        // A layer on one axis only is checked when that axis is reached.
        let mut y_only = Pml::new(0.5).with_direction(PmlDirection::Y);
        y_only.r_asymptotic = 2.0;
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 10.0).pml_layers(vec![y_only]).build(),
            Err(SolverError::InvalidPml { axis: 'y', .. })
        ));
        assert!(matches!(
            Simulation::builder([0.2, 4.0], 10.0).build(),
            Err(SolverError::InvalidCell(..))
        ));
        let hx_source = Source::point(SourceTime::continuous(0.1), Component::Hx, [0.0, 0.0]);
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 10.0).add_source(hx_source).build(),
            Err(SolverError::UnsupportedSourceComponent(Component::Hx))
        ));
        let far_source = Source::point(SourceTime::continuous(0.1), Component::Ez, [10.0, 0.0]);
        assert!(matches!(
            Simulation::builder([4.0, 4.0], 10.0).add_source(far_source).build(),
            Err(SolverError::SourceOutsideCell(..))
        ));
    }

    #[test]
    fn test_run_until_step_count() {
        let mut sim = Simulation::builder([2.0, 2.0], 10.0).build().unwrap();
        assert_relative_eq!(sim.timestep(), 0.05, epsilon = 1e-15);
        let stats = sim.run_for(2.0).unwrap();
        assert_eq!(stats.steps, 40);
        assert_eq!(sim.steps(), 40);
        // Running until a past time does nothing.
        assert_eq!(sim.run_until(1.0).unwrap().steps, 0);
        assert!(matches!(sim.run_for(-1.0), Err(SolverError::InvalidDuration(_))));
    }

    #[test]
    fn test_step_count() {
        assert_eq!(step_count(200.0, 0.05), 4000);
        assert_eq!(step_count(2.0, 0.05), 40);
        assert_eq!(step_count(2.01, 0.05), 41);
        assert_eq!(step_count(0.0, 0.05), 0);
        assert_eq!(step_count(-3.0, 0.05), 0);

        let mut sim = Simulation::builder([2.0, 2.0], 10.0).build().unwrap();
        let planned = sim.steps_until(3.3);
        assert_eq!(sim.run_until(3.3).unwrap().steps, planned);
        assert_eq!(sim.steps_until(3.3), 0);
    }

    #[test]
    fn test_get_array_shapes() {
        let sim = Simulation::builder([16.0, 8.0], 10.0).build().unwrap();
        let whole = Volume::whole([16.0, 8.0]);
        for component in [Component::Ez, Component::Hx, Component::Hy, Component::Dielectric] {
            assert_eq!(sim.get_array(component, &whole).unwrap().dim(), (160, 80));
        }
        let line = Volume::new([0.0, 0.0], [0.0, 8.0]);
        assert_eq!(sim.get_array(Component::Ez, &line).unwrap().dim(), (1, 80));
        let outside = Volume::new([20.0, 0.0], [1.0, 1.0]);
        assert!(sim.get_array(Component::Ez, &outside).is_err());
    }

    #[test]
    fn test_restart_fields() {
        let mut sim = Simulation::builder([4.0, 4.0], 10.0)
            .add_source(Source::point(SourceTime::continuous(0.3), Component::Ez, [0.0, 0.0]))
            .build()
            .unwrap();
        sim.run_for(5.0).unwrap();
        assert!(sim.field_energy() > 0.0);
        sim.restart_fields();
        assert_eq!(sim.time(), 0.0);
        assert_eq!(sim.field_energy(), 0.0);
    }
}
