//! # faasgen CLI
//!
//! Command-line entry point: parses arguments, loads and merges the
//! configuration, runs the generation pipeline and hands the model to the
//! JSON renderer. Exits non-zero on any fatal error.

use clap::Parser;
use faasgen::config::Config;
use faasgen::error::AppResult;
use faasgen::model::{JsonRenderer, Renderer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Generate serverless function definitions and infrastructure metadata
/// from an OpenAPI spec.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Namespace for the generated functions.
    namespace: String,

    /// URL or path to the OpenAPI spec file.
    spec_source: String,

    /// Full path to the configuration file.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Directory to output the generated files.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Comma separated list of layer ARNs.
    #[arg(long)]
    layers: Option<String>,

    /// Path to code to bundle into the shared dependency layer.
    #[arg(long)]
    bundle: Option<String>,

    /// Base URL override, used verbatim in place of the spec's servers.
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> AppResult<()> {
    let mut config = Config::load(cli.config_file.as_deref())?;
    config.merge_cli(
        cli.output_dir.as_deref(),
        cli.layers.as_deref(),
        cli.bundle.as_deref(),
    )?;

    let model = faasgen::generate(
        &cli.namespace,
        &cli.spec_source,
        &config,
        cli.server_url.as_deref(),
    )?;

    JsonRenderer::stdout().render(&model)
}
