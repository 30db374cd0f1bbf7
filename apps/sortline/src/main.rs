//! Sortline binary entry point.
//!
//! Thin dispatch over the `cli` and `api` modules; all classification
//! logic lives in `sortline-core`.

use clap::{Parser, Subcommand};
use sortline::api::{self, SharedEstimator};
use sortline::cli::{self, OutputFormat};
use sortline::secrets::CredentialChain;
use sortline::vision::GeminiEstimator;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sortline", version, about = "Package classification for the sorting line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a package from explicit dimensions and mass.
    Classify {
        /// Width in centimeters.
        #[arg(long)]
        width: f64,
        /// Height in centimeters.
        #[arg(long)]
        height: f64,
        /// Length in centimeters.
        #[arg(long)]
        length: f64,
        /// Mass in kilograms.
        #[arg(long)]
        mass: f64,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Classify with the image-based estimation fallback.
    Estimate {
        /// Mass in kilograms (always required; never estimated).
        #[arg(long)]
        mass: f64,
        /// Manually measured width in centimeters.
        #[arg(long)]
        width: Option<f64>,
        /// Manually measured height in centimeters.
        #[arg(long)]
        height: Option<f64>,
        /// Manually measured length in centimeters.
        #[arg(long)]
        length: Option<f64>,
        /// Path to a package image for the Gemini fallback.
        #[arg(long)]
        image: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Serve the HTTP API.
    Serve {
        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Classify {
            width,
            height,
            length,
            mass,
            format,
        } => {
            let report = cli::cmd_classify(width, height, length, mass, format)
                .map_err(|e| e.to_string())?;
            println!("{report}");
            Ok(())
        }

        Command::Estimate {
            mass,
            width,
            height,
            length,
            image,
            format,
        } => {
            let report = cli::cmd_estimate(mass, width, height, length, image, format)
                .map_err(|e| e.to_string())?;
            println!("{report}");
            Ok(())
        }

        Command::Serve { addr } => {
            let estimator: SharedEstimator =
                Arc::new(GeminiEstimator::new(Arc::new(CredentialChain::default())));
            // The runtime is built here rather than with #[tokio::main]
            // so the blocking Gemini client in the other commands never
            // runs inside an async context.
            let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
            runtime
                .block_on(api::serve(&addr, estimator))
                .map_err(|e| e.to_string())
        }
    }
}
