///
/// This module implements the CLI interface for contentgen: command parsing, config loading,
/// wiring the concrete collaborators into a [`ContentGenerator`], and printing the result.
///
/// All business logic (strategy selection, aggregation, metrics) lives in `contentgen-core`.
///
/// ## How To Use
/// - `contentgen generate --url https://github.com/user/repo`
/// - `contentgen generate --path ./some/dir --json`
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
use crate::load_config::{load_config, CliConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use contentgen_core::acquire::GitAcquirer;
use contentgen_core::aggregate::DirectoryAggregator;
use contentgen_core::metrics::Cl100kEncoder;
use contentgen_core::{ContentGenerator, GenerateError, GenerationRequest, GenerationResponse};
use std::path::PathBuf;

/// CLI for contentgen: flatten a repository or directory into one LLM-ready document.
#[derive(Parser)]
#[clap(
    name = "contentgen",
    version,
    about = "Flatten a GitHub repository or local directory into one markdown document and report its token count and size"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the aggregated document for a remote repository or a local path
    Generate {
        /// Remote repository, e.g. https://github.com/user/repo or user/repo
        #[clap(long)]
        url: Option<String>,
        /// Local directory to aggregate
        #[clap(long)]
        path: Option<String>,
        /// Path to an optional YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Directory the aggregated document is written to (overrides config and env)
        #[clap(long)]
        output_dir: Option<PathBuf>,
        /// Print the full response as JSON instead of the raw document
        #[clap(long)]
        json: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate {
            url,
            path,
            config,
            output_dir,
            json,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let request = GenerationRequest {
                remote_identifier: url,
                local_path: path.map(resolve_local_path),
            };
            tracing::info!(command = "generate", ?request, "Starting generation");

            let generator = build_generator(&config)?;
            match generator.generate(&request).await {
                Ok(response) => {
                    print_response(&response, json)?;
                    tracing::info!(
                        command = "generate",
                        tokens = response.token_count,
                        size = %response.byte_size_label,
                        "Generation complete"
                    );
                    Ok(())
                }
                Err(e @ GenerateError::MissingInput) => {
                    tracing::error!(command = "generate", error = %e, "Bad request");
                    Err(anyhow::Error::msg(e.to_string()))
                }
                Err(GenerateError::InvalidInput(msg)) => {
                    tracing::error!(command = "generate", error = %msg, "Bad request");
                    Err(anyhow::anyhow!("Invalid input: {msg}"))
                }
                Err(e) => {
                    tracing::error!(command = "generate", error = %e, "Generation failed");
                    Err(anyhow::Error::new(e).context("Error generating content"))
                }
            }
        }
    }
}

/// Concrete generator: git for remotes, directory walk for local paths, cl100k_base tokens.
pub fn build_generator(
    config: &CliConfig,
) -> Result<ContentGenerator<GitAcquirer, DirectoryAggregator, Cl100kEncoder>> {
    let aggregator = DirectoryAggregator::new(&config.output_dir, config.aggregate.clone());
    let acquirer = GitAcquirer::new(config.remote(), aggregator.clone());
    let encoder = Cl100kEncoder::new().map_err(|e| anyhow::anyhow!(e))?;
    Ok(ContentGenerator::new(
        config.generator(),
        acquirer,
        aggregator,
        encoder,
    ))
}

// Relative paths such as `.` have no usable final component until resolved.
fn resolve_local_path(path: String) -> String {
    if path.trim().is_empty() {
        return path;
    }
    match std::fs::canonicalize(path.trim()) {
        Ok(resolved) => resolved.to_string_lossy().into_owned(),
        Err(_) => path,
    }
}

fn print_response(response: &GenerationResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", response.content);
        eprintln!(
            "Tokens: {}  Size: {}",
            response.token_count, response.byte_size_label
        );
    }
    Ok(())
}
