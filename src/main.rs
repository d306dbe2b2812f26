use std::{fs, io, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use shallow_water::{
    compare_files, Driver, Logger, Parameters, Periodic, Problem, ProfileWriter, Simulation,
    SnapshotWriter,
};

/// One-dimensional shallow water solver (Lax-Friedrichs, adaptive CFL time step)
#[derive(Parser)]
#[command(name = "shallow-water")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Number of grid cells
    #[arg(long, default_value_t = 1000)]
    n: usize,

    /// Length of the domain
    #[arg(long = "XMAX", default_value_t = 1.0)]
    xmax: f64,

    /// End time of the simulation, in units of the domain length
    #[arg(long = "TMAX", default_value_t = 0.045)]
    tmax: f64,

    /// Snapshot file (h and hu at the start and at the end time)
    #[arg(short, long, default_value = "result.dat")]
    output: PathBuf,

    /// Reference snapshot file to compute L1 errors against
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Only compare this snapshot file against --reference, without simulating
    #[arg(long, requires = "reference")]
    compare: Option<PathBuf>,

    /// Boundary condition applied to both h and hu
    #[arg(long, value_enum, default_value_t = BoundaryKind::Neumann)]
    boundary: BoundaryKind,

    /// Also write a snapshot every k time steps
    #[arg(long, value_name = "K")]
    checkpoint_every: Option<usize>,

    /// Write the final profile (x, h, hu) as a text table
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BoundaryKind {
    Neumann,
    Periodic,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let (Some(candidate), Some(reference)) = (&cli.compare, &cli.reference) {
        report(candidate, reference);
        return Ok(());
    }

    simulate(&cli)?;

    if let Some(reference) = &cli.reference {
        report(&cli.output, reference);
    }

    Ok(())
}

fn simulate(cli: &Cli) -> Result<()> {
    let parameters = Parameters::new(cli.n, cli.xmax, cli.tmax);
    let problem = match cli.boundary {
        BoundaryKind::Neumann => Problem::two_gaussians(parameters),
        BoundaryKind::Periodic => Problem::two_gaussians(parameters).with_boundary(Periodic),
    };
    let sim = Simulation::new(problem).context("invalid simulation parameters")?;
    info!("{}", sim);

    let output = fs::File::create(&cli.output)
        .with_context(|| format!("couldn't create {}", cli.output.display()))?;

    let mut driver = Driver::new(sim)
        .with_observer(Logger)
        .with_observer(SnapshotWriter::new(io::BufWriter::new(output)));

    if let Some(k) = cli.checkpoint_every {
        driver = driver.with_time_sampling(k);
    }

    if let Some(path) = &cli.profile {
        let profile = fs::File::create(path)
            .with_context(|| format!("couldn't create {}", path.display()))?;
        driver = driver.with_observer(ProfileWriter::new(io::BufWriter::new(profile)));
    }

    let outcome = driver.run().context("simulation failed")?;
    info!(
        "wrote {} ({} steps, t={:.5})",
        cli.output.display(),
        outcome.steps,
        outcome.time
    );

    Ok(())
}

// mismatches are reported, they do not fail the run
fn report(candidate: &Path, reference: &Path) {
    match compare_files(candidate, reference) {
        Ok(report) => {
            for line in report.to_string().lines() {
                info!("{}", line);
            }
        }
        Err(err) => match std::error::Error::source(&err) {
            Some(source) => warn!("{}: {}", err, source),
            None => warn!("{}", err),
        },
    }
}
