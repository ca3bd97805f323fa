use clap::{Parser, Subcommand};
use ds_project::{Dwelling, ProjectError, build_model, validate_dwelling};
use ds_sim::{RunResults, SimError, run_simulation, total_heat_delivered, total_heat_demand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ds-cli")]
#[command(about = "DwellSim CLI - Dwelling thermal and airflow simulation tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate dwelling file syntax and structure
    Validate {
        /// Path to the dwelling JSON or YAML file
        dwelling_path: PathBuf,
    },
    /// List zones in a dwelling
    Zones {
        /// Path to the dwelling JSON or YAML file
        dwelling_path: PathBuf,
    },
    /// Run the full simulation
    Run {
        /// Path to the dwelling JSON or YAML file
        dwelling_path: PathBuf,
        /// Write the full results as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write per-timestep zone series as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Project(#[from] ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { dwelling_path } => cmd_validate(&dwelling_path),
        Commands::Zones { dwelling_path } => cmd_zones(&dwelling_path),
        Commands::Run {
            dwelling_path,
            output,
            csv,
        } => cmd_run(&dwelling_path, output.as_deref(), csv.as_deref()),
    }
}

fn load_dwelling(path: &Path) -> Result<Dwelling, ProjectError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => ds_project::load_json(path),
        _ => ds_project::load_yaml(path),
    }
}

fn cmd_validate(dwelling_path: &Path) -> Result<(), CliError> {
    println!("Validating dwelling: {}", dwelling_path.display());
    let dwelling = load_dwelling(dwelling_path)?;
    validate_dwelling(&dwelling).map_err(ProjectError::from)?;
    println!("✓ Dwelling is valid");
    Ok(())
}

fn cmd_zones(dwelling_path: &Path) -> Result<(), CliError> {
    let dwelling = load_dwelling(dwelling_path)?;

    if dwelling.zones.is_empty() {
        println!("No zones found in dwelling");
    } else {
        println!("Zones in dwelling:");
        for zone in &dwelling.zones {
            println!(
                "  {} - {:.1} m2, {:.1} m3 ({} elements{})",
                zone.id,
                zone.area_m2,
                zone.volume_m3,
                zone.building_elements.len(),
                if zone.heating.is_some() {
                    ", heated"
                } else {
                    ""
                }
            );
        }
    }
    Ok(())
}

fn cmd_run(
    dwelling_path: &Path,
    output: Option<&Path>,
    csv: Option<&Path>,
) -> Result<(), CliError> {
    let dwelling = load_dwelling(dwelling_path)?;
    println!("Running simulation: {}", dwelling.name);

    let started = Instant::now();
    let mut model = build_model(&dwelling)?;
    let results = run_simulation(&mut model)?;
    let elapsed = started.elapsed();

    println!(
        "✓ Simulation completed in {:.2} s ({} timesteps, {} zones)",
        elapsed.as_secs_f64(),
        results.len(),
        results.zones.len()
    );
    println!(
        "  Heat demand: {:.2} kWh, delivered: {:.2} kWh",
        total_heat_demand(&results),
        total_heat_delivered(&results)
    );

    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&results)?)?;
        println!("  Results written to {}", path.display());
    }
    if let Some(path) = csv {
        write_csv(path, &results)?;
        println!("  Series written to {}", path.display());
    }

    Ok(())
}

fn write_csv(path: &Path, results: &RunResults) -> Result<(), CliError> {
    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "timestamp_h,zone,air_temp_c,operative_temp_c,heat_demand_kwh,cool_demand_kwh,\
         heat_delivered_kwh,fabric_loss_w,vent_loss_w,ach,internal_pressure_pa"
    )?;
    for (step, &timestamp) in results.timestamps_h.iter().enumerate() {
        for zone in &results.zones {
            writeln!(
                file,
                "{},{},{},{},{},{},{},{},{},{},{}",
                timestamp,
                zone.id,
                zone.air_temp_c[step],
                zone.operative_temp_c[step],
                zone.heat_demand_kwh[step],
                zone.cool_demand_kwh[step],
                zone.heat_delivered_kwh[step],
                zone.fabric_loss_w[step],
                zone.vent_loss_w[step],
                results.ach[step],
                results.internal_pressure_pa[step],
            )?;
        }
    }
    Ok(())
}
