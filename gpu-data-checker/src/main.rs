//! Point d'entrée CLI pour gpu-data-checker

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use gpu_data_checker::cli::{self, Commands};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

/// Contrôler la qualité géométrique des couches GPU
#[derive(Parser)]
#[command(name = "gpu-data-checker")]
#[command(author, version)]
#[command(about = "Contrôle des géométries des couches GPU (validité, complexité, doublons)")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<ExitCode> {
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let code = match &cli.command {
        Commands::Check(args) => {
            info!(path = %args.path.display(), zoning = args.zoning, config = %args.config, "Check");
            cli::cmd_check(args, cli.quiet)?
        }
        Commands::Reproject(args) => {
            info!(path = %args.path.display(), "Reproject");
            cli::cmd_reproject(args)?
        }
    };

    Ok(ExitCode::from(code))
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
