//! Track Layout CLI
//!
//! Usage:
//!   track-layout [OPTIONS] <LAYOUT>
//!
//! Options:
//!   -c, --config <FILE>   Solver configuration (TOML format)
//!   -k, --catalog <FILE>  Extra geometry templates (TOML format)
//!   -l, --lint            Run the geometry validator after solving
//!       --strict          Exit with status 2 if anything was reported
//!   -d, --debug           Log every placement step
//!   -h, --help            Print help

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use track_layout::{check, solve_layout, GeometryCatalog, Layout, SolverConfig};

#[derive(Parser)]
#[command(name = "track-layout")]
#[command(about = "Solve piece poses for a model railway track plan")]
struct Cli {
    /// Layout file (TOML format)
    layout: PathBuf,

    /// Solver configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additional geometry templates (TOML format)
    #[arg(short = 'k', long)]
    catalog: Option<PathBuf>,

    /// Run the geometry validator after solving
    #[arg(short, long)]
    lint: bool,

    /// Exit with status 2 if any warning was produced
    #[arg(long)]
    strict: bool,

    /// Debug logging for the solver
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let default = if debug {
        "track_layout=debug"
    } else {
        "track_layout=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn fail(what: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("Error loading {}: {}", what, err);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = match &cli.config {
        Some(path) => match SolverConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => fail("config", e),
        },
        None => SolverConfig::default(),
    };

    let mut catalog = GeometryCatalog::with_builtins();
    if let Some(path) = &cli.catalog {
        match catalog.register_from_file(path) {
            Ok(count) => info!(count, path = %path.display(), "imported templates"),
            Err(e) => fail("catalog", e),
        }
    }

    let mut layout = match Layout::from_file(&cli.layout) {
        Ok(l) => l,
        Err(e) => fail("layout", e),
    };

    let report = solve_layout(&mut layout, &catalog, &config);

    for piece in layout.pieces() {
        match piece.pose {
            Some(pose) => println!(
                "{} {} {:.3} {:.3} {:.3}",
                piece.id, piece.article, pose.x, pose.y, pose.rotation_deg
            ),
            None => println!("{} {} unposed", piece.id, piece.article),
        }
    }

    // Solve warnings already went to stderr through the log subscriber
    let mut findings = report.warnings.len();
    if cli.lint {
        let lints = check(&layout, &catalog, &config.lint);
        for lint in &lints {
            eprintln!("lint: {}", lint);
        }
        findings += lints.len();
    }

    if cli.strict && findings > 0 {
        process::exit(2);
    }
}
