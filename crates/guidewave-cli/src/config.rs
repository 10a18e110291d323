//! TOML configuration deserialisation for simulation jobs.
//!
//! Every section is optional; an empty file (or no file at all) describes
//! the straight-waveguide tutorial: a 16 x 8 cell, an infinite slab of
//! permittivity 12 and width 1, a 0.15 continuous-wave `Ez` source at
//! (-7, 0), a PML of thickness 1, resolution 10, run for 200 time units.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use num_complex::Complex64;
use serde::Deserialize;

use guidewave_core::snapshot::DEFAULT_SNAPSHOT;
use guidewave_core::source::{Source, SourceTime};
use guidewave_core::solver::fdtd::{Pml, PmlDirection};
use guidewave_core::types::Component;
use guidewave_geometry::{Block, GeometricObject, Shape};
use guidewave_materials::{library, Medium};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub geometry: GeometryConfig,
    #[serde(default = "default_sources", rename = "source")]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub pml: PmlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            geometry: GeometryConfig::default(),
            sources: default_sources(),
            pml: PmlConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Simulation parameters from TOML.
#[derive(Debug, Deserialize)]
pub struct SimulationConfig {
    /// Cell size `[x, y]`, centred on the origin.
    #[serde(default = "default_cell")]
    pub cell: [f64; 2],
    /// Grid points per unit length.
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    /// Duration to run, from t = 0.
    #[serde(default = "default_until")]
    pub until: f64,
    #[serde(default = "default_courant")]
    pub courant: f64,
    #[serde(default = "default_subpixel_samples")]
    pub subpixel_samples: usize,
    /// Worker threads for the field updates (default: all cores).
    #[serde(default)]
    pub threads: Option<usize>,
    /// Material filling the cell outside every object.
    #[serde(default = "default_background")]
    pub default_material: String,
    /// Timesteps between progress reports.
    #[serde(default)]
    pub progress_interval: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cell: default_cell(),
            resolution: default_resolution(),
            until: default_until(),
            courant: default_courant(),
            subpixel_samples: default_subpixel_samples(),
            threads: None,
            default_material: default_background(),
            progress_interval: None,
        }
    }
}

fn default_cell() -> [f64; 2] {
    [16.0, 8.0]
}
fn default_resolution() -> f64 {
    10.0
}
fn default_until() -> f64 {
    200.0
}
fn default_courant() -> f64 {
    guidewave_core::solver::fdtd::DEFAULT_COURANT
}
fn default_subpixel_samples() -> usize {
    guidewave_core::solver::fdtd::DEFAULT_SUBPIXEL_SAMPLES
}
fn default_background() -> String {
    "vacuum".into()
}

/// Geometry configuration from TOML.
#[derive(Debug, Deserialize)]
pub struct GeometryConfig {
    #[serde(default)]
    pub object: Vec<ObjectConfig>,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            object: vec![ObjectConfig {
                name: Some("waveguide".into()),
                shape: Shape::Block(Block {
                    center: [0.0, 0.0],
                    size: [f64::INFINITY, 1.0],
                }),
                material: None,
                epsilon: Some(12.0),
                mu: None,
                conductivity: None,
            }],
        }
    }
}

/// A single geometric object.
///
/// The material is either a library name (`material = "Si"`) or explicit
/// constants (`epsilon`, `mu`, `conductivity`), not both.
#[derive(Debug, Deserialize)]
pub struct ObjectConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub epsilon: Option<f64>,
    #[serde(default)]
    pub mu: Option<f64>,
    #[serde(default)]
    pub conductivity: Option<f64>,
}

impl ObjectConfig {
    /// Label used in log output.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    pub fn medium(&self) -> anyhow::Result<Medium> {
        let explicit = self.epsilon.is_some() || self.mu.is_some() || self.conductivity.is_some();
        match &self.material {
            Some(name) if explicit => {
                bail!("Object '{}' sets both material '{}' and explicit constants", self.label(), name)
            }
            Some(name) => library::lookup(name).with_context(|| format!("Object '{}'", self.label())),
            None => Ok(Medium {
                epsilon: self.epsilon.unwrap_or(1.0),
                mu: self.mu.unwrap_or(1.0),
                conductivity: self.conductivity.unwrap_or(0.0),
            }),
        }
    }

    pub fn to_object(&self) -> anyhow::Result<GeometricObject> {
        Ok(GeometricObject::new(self.shape.clone(), self.medium()?))
    }
}

/// A current source from TOML. The time profile is selected by `kind`.
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    #[serde(flatten)]
    pub time: SourceTime,
    #[serde(default = "default_component")]
    pub component: Component,
    pub center: [f64; 2],
    #[serde(default)]
    pub size: [f64; 2],
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    /// Phase of the complex amplitude, in radians.
    #[serde(default)]
    pub phase: f64,
}

impl SourceConfig {
    pub fn to_source(&self) -> Source {
        Source::point(self.time.clone(), self.component, self.center)
            .with_size(self.size)
            .with_amplitude(Complex64::from_polar(self.amplitude, self.phase))
    }
}

fn default_sources() -> Vec<SourceConfig> {
    vec![SourceConfig {
        time: SourceTime::continuous(0.15),
        component: Component::Ez,
        center: [-7.0, 0.0],
        size: [0.0, 0.0],
        amplitude: 1.0,
        phase: 0.0,
    }]
}
fn default_component() -> Component {
    Component::Ez
}
fn default_amplitude() -> f64 {
    1.0
}

/// Absorbing boundary configuration. A thickness of zero disables the PML.
#[derive(Debug, Deserialize)]
pub struct PmlConfig {
    #[serde(default = "default_pml_thickness")]
    pub thickness: f64,
    #[serde(default)]
    pub direction: PmlDirection,
    #[serde(default)]
    pub r_asymptotic: Option<f64>,
    #[serde(default)]
    pub grading_order: Option<f64>,
    #[serde(default)]
    pub kappa_max: Option<f64>,
    #[serde(default)]
    pub alpha_max: Option<f64>,
}

impl Default for PmlConfig {
    fn default() -> Self {
        Self {
            thickness: default_pml_thickness(),
            direction: PmlDirection::All,
            r_asymptotic: None,
            grading_order: None,
            kappa_max: None,
            alpha_max: None,
        }
    }
}

impl PmlConfig {
    pub fn to_layers(&self) -> Vec<Pml> {
        if self.thickness <= 0.0 {
            return Vec::new();
        }
        let mut pml = Pml::new(self.thickness).with_direction(self.direction);
        if let Some(r) = self.r_asymptotic {
            pml.r_asymptotic = r;
        }
        if let Some(m) = self.grading_order {
            pml.grading_order = m;
        }
        if let Some(kappa) = self.kappa_max {
            pml.kappa_max = kappa;
        }
        if let Some(alpha) = self.alpha_max {
            pml.alpha_max = alpha;
        }
        vec![pml]
    }
}

fn default_pml_thickness() -> f64 {
    1.0
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Output directory (default: current directory).
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Snapshot file name within the output directory.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,
    /// Render `eps.png` and `ez.png` right after the run (default: false).
    #[serde(default)]
    pub render: bool,
    /// Write `run_summary.json` (default: false).
    #[serde(default)]
    pub save_summary: bool,
    /// Image upsampling factor.
    #[serde(default = "default_scale")]
    pub scale: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            snapshot: default_snapshot(),
            render: false,
            save_summary: false,
            scale: default_scale(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_snapshot() -> String {
    DEFAULT_SNAPSHOT.into()
}
fn default_scale() -> usize {
    4
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}
