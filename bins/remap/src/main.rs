use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use remap::config::MapConfig;
use remap::run::remap_lines;

#[derive(Parser)]
#[command(name = "remap", about = "Remap JSON rows between sequence and mapping shapes")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "remap.toml", env = "REMAP_CONFIG")]
    config: String,

    /// Map rows of the second container into the first.
    #[arg(long)]
    reverse: bool,

    /// Read rows from this file instead of stdin.
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    tracing::info!(config = %cli.config, "loading configuration");
    let config = match MapConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };

    let mapper = match config.build() {
        Ok(m) => m,
        Err(e) => {
            tracing::error!(error = %e, "failed to build mapper");
            return ExitCode::FAILURE;
        }
    };

    let (first, second) = mapper.descriptors();
    let source = if cli.reverse {
        second.shape()
    } else {
        first.shape()
    };
    tracing::info!(source = %source, reverse = cli.reverse, "mapping rows");

    let stdout = io::stdout().lock();
    let result = match &cli.input {
        Some(path) => match File::open(path) {
            Ok(file) => remap_lines(&mapper, source, BufReader::new(file), stdout),
            Err(e) => {
                tracing::error!(input = %path.display(), error = %e, "failed to open input");
                return ExitCode::FAILURE;
            }
        },
        None => remap_lines(&mapper, source, io::stdin().lock(), stdout),
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "remap failed");
            ExitCode::FAILURE
        }
    }
}
