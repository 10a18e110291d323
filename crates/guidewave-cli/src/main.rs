//! Guidewave command-line interface.
//!
//! Run the straight-waveguide tutorial and plot it:
//! ```sh
//! guidewave run
//! guidewave plot
//! ```
//!
//! Or run a job described by a TOML file:
//! ```sh
//! guidewave run jobs/straight_waveguide.toml -o results
//! guidewave plot results/output.pckl -o results
//! guidewave validate jobs/straight_waveguide.toml
//! guidewave materials
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use guidewave_core::snapshot::DEFAULT_SNAPSHOT;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guidewave")]
#[command(about = "Guidewave: 2D FDTD simulation of dielectric waveguides")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and write the eps/ez snapshot.
    Run {
        /// Path to a job configuration file (default: built-in tutorial).
        config: Option<PathBuf>,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render eps.png and ez.png from a snapshot.
    Plot {
        /// Snapshot written by `run`.
        #[arg(default_value = DEFAULT_SNAPSHOT)]
        input: PathBuf,
        /// Directory for the images.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Output pixels per grid cell.
        #[arg(long, default_value_t = 4)]
        scale: usize,
    },
    /// Validate a configuration file and set up the grid without running.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display information about available materials.
    Materials,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Guidewave FDTD");
            println!("==============");
            let job = match &config {
                Some(path) => {
                    println!("Configuration: {}", path.display());
                    config::load_config(path)?
                }
                None => {
                    println!("Configuration: built-in straight waveguide");
                    config::JobConfig::default()
                }
            };

            let result = runner::run_simulation(&job)?;

            let out_dir = output.unwrap_or_else(|| job.output.directory.clone());
            runner::write_snapshot(&result.snapshot, &out_dir.join(&job.output.snapshot))?;

            if job.output.save_summary {
                runner::write_summary_json(&result.summary, &out_dir.join(runner::SUMMARY_FILE))?;
            }
            if job.output.render {
                runner::render_images(&result.snapshot, &out_dir, job.output.scale)?;
            }

            println!("Simulation complete.");
            Ok(())
        }
        Commands::Plot {
            input,
            output,
            scale,
        } => {
            runner::plot_snapshot(&input, &output, scale)?;
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let sim = runner::build_simulation(&job)?;
            let lattice = sim.lattice();
            println!("Configuration is valid: {}", config.display());
            println!(
                "  {} x {} cells, dt = {:.4}, {} steps to t = {}",
                lattice.nx,
                lattice.ny,
                sim.timestep(),
                sim.steps_until(job.simulation.until),
                job.simulation.until
            );
            Ok(())
        }
        Commands::Materials => {
            println!("Available materials:");
            println!();
            for name in guidewave_materials::library::names() {
                let medium = guidewave_materials::library::lookup(name)?;
                let description = guidewave_materials::library::describe(name).unwrap_or("");
                println!(
                    "  {:<8} eps = {:<7.4} n = {:<6.3} {}",
                    name,
                    medium.epsilon,
                    medium.refractive_index(),
                    description
                );
            }
            println!();
            println!("Objects may also set `epsilon`, `mu`, and `conductivity` directly.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_defaults_to_run_output() {
        let cli = Cli::try_parse_from(["guidewave", "plot"]).unwrap();
        match cli.command {
            Commands::Plot { input, output, scale } => {
                assert_eq!(input, PathBuf::from(DEFAULT_SNAPSHOT));
                assert_eq!(input, PathBuf::from(config::JobConfig::default().output.snapshot));
                assert_eq!(output, PathBuf::from("."));
                assert_eq!(scale, 4);
            }
            _ => panic!("expected the plot command"),
        }
    }
}
