//! Simulation runner: ties together geometry, materials, sources, and the
//! FDTD engine, then writes the snapshot and optional extras.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use guidewave_core::snapshot::Snapshot;
use guidewave_core::solver::fdtd::Simulation;
use guidewave_core::solver::{FieldSolver, RunStats};
use guidewave_core::types::{Component, Volume};
use guidewave_materials::library;
use guidewave_render::{render_field_overlay, render_permittivity, RenderOptions};

use crate::config::JobConfig;

/// File names of the rendered images.
pub const EPS_IMAGE: &str = "eps.png";
pub const EZ_IMAGE: &str = "ez.png";
pub const SUMMARY_FILE: &str = "run_summary.json";

/// Results from a simulation run.
pub struct SimulationOutput {
    pub snapshot: Snapshot,
    pub summary: RunSummary,
}

/// Machine-readable record of a run, written as JSON.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub method: String,
    pub cell: [f64; 2],
    pub resolution: f64,
    pub grid: [usize; 2],
    pub timestep: f64,
    pub objects: usize,
    pub sources: usize,
    pub threads: usize,
    pub stats: RunStats,
}

/// Build the simulation described by `job` without stepping it.
pub fn build_simulation(job: &JobConfig) -> Result<Simulation> {
    let sim_cfg = &job.simulation;
    log::debug!("Job configuration: {:?}", job);

    let mut objects = Vec::with_capacity(job.geometry.object.len());
    for obj in &job.geometry.object {
        let object = obj.to_object()?;
        println!(
            "  Object '{}': {:?} (eps = {}, mu = {})",
            obj.label(),
            object.shape,
            object.material.epsilon,
            object.material.mu
        );
        objects.push(object);
    }

    let background = library::lookup(&sim_cfg.default_material)
        .with_context(|| format!("Unknown default material '{}'", sim_cfg.default_material))?;
    let sources = job.sources.iter().map(|s| s.to_source()).collect();

    let mut builder = Simulation::builder(sim_cfg.cell, sim_cfg.resolution)
        .geometry(objects)
        .default_material(background)
        .sources(sources)
        .pml_layers(job.pml.to_layers())
        .courant(sim_cfg.courant)
        .subpixel_samples(sim_cfg.subpixel_samples);
    if let Some(interval) = sim_cfg.progress_interval {
        builder = builder.progress_interval(interval);
    }
    builder.build().context("Failed to set up the simulation")
}

/// Run a full simulation from a parsed job configuration.
pub fn run_simulation(job: &JobConfig) -> Result<SimulationOutput> {
    let mut sim = build_simulation(job)?;
    let lattice = *sim.lattice();
    println!(
        "Grid: {} x {} cells, dt = {:.4}, {}",
        lattice.nx,
        lattice.ny,
        sim.timestep(),
        sim.method_name()
    );

    let pool = {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(n) = job.simulation.threads {
            builder = builder.num_threads(n);
        }
        builder.build().context("Failed to start worker threads")?
    };
    let threads = pool.current_num_threads();
    println!("Running until t = {} on {} threads...", job.simulation.until, threads);

    let stats = pool.install(|| sim.run_for(job.simulation.until))?;
    println!(
        "  {} steps in {:.2}s ({:.1} Mcells/s), final energy {:.4e}",
        stats.steps, stats.wall_time, stats.mcells_per_sec, stats.field_energy
    );

    let whole = Volume::whole(sim.cell());
    let eps = sim.get_array(Component::Dielectric, &whole)?;
    let ez = sim.get_array(Component::Ez, &whole)?;
    let snapshot = Snapshot::new(eps, ez)?;

    let summary = RunSummary {
        method: sim.method_name().to_string(),
        cell: sim.cell(),
        resolution: sim.resolution(),
        grid: [lattice.nx, lattice.ny],
        timestep: sim.timestep(),
        objects: job.geometry.object.len(),
        sources: job.sources.len(),
        threads,
        stats,
    };

    Ok(SimulationOutput { snapshot, summary })
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))
}

/// Write the snapshot archive.
pub fn write_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    snapshot
        .write_npz(path)
        .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
    println!("Snapshot written to {}", path.display());
    Ok(())
}

/// Write the run summary as pretty-printed JSON.
pub fn write_summary_json(summary: &RunSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Run summary written to {}", path.display());
    Ok(())
}

/// Render `eps.png` and `ez.png` into `out_dir`, returning their paths.
pub fn render_images(snapshot: &Snapshot, out_dir: &Path, scale: usize) -> Result<(PathBuf, PathBuf)> {
    ensure_dir(out_dir)?;
    let options = RenderOptions {
        scale,
        ..Default::default()
    };

    let eps_path = out_dir.join(EPS_IMAGE);
    render_permittivity(&snapshot.eps, &eps_path, &options)
        .with_context(|| format!("Failed to render {}", eps_path.display()))?;

    let ez_path = out_dir.join(EZ_IMAGE);
    render_field_overlay(&snapshot.eps, &snapshot.ez, &ez_path, &options)
        .with_context(|| format!("Failed to render {}", ez_path.display()))?;

    println!("Images written to {} and {}", eps_path.display(), ez_path.display());
    Ok((eps_path, ez_path))
}

/// Load a snapshot and render both images.
pub fn plot_snapshot(input: &Path, out_dir: &Path, scale: usize) -> Result<(PathBuf, PathBuf)> {
    let snapshot = Snapshot::read_npz(input)
        .with_context(|| format!("Failed to read snapshot {}", input.display()))?;
    let (nx, ny) = snapshot.dim();
    println!("Loaded {} x {} snapshot from {}", nx, ny, input.display());
    render_images(&snapshot, out_dir, scale)
}
