/// `load_config` module: Loads the optional YAML config file and applies environment overrides.
///
/// This is the only place where untrusted YAML is parsed. The result is handed to the core as
/// plain structs, so nothing in `contentgen-core` reads files or environment variables for
/// configuration.
///
/// # Precedence
/// built-in defaults < YAML file < `CONTENTGEN_OUTPUT_DIR` < `--output-dir` (applied in `cli`)
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::Result;
use contentgen_core::config::{
    AggregateConfig, GeneratorConfig, RemoteConfig, DEFAULT_OUTPUT_DIR, DEFAULT_REMOTE_BASE_URL,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const OUTPUT_DIR_ENV: &str = "CONTENTGEN_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub output_dir: PathBuf,
    pub remote_base_url: String,
    pub aggregate: AggregateConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
            aggregate: AggregateConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn generator(&self) -> GeneratorConfig {
        GeneratorConfig {
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn remote(&self) -> RemoteConfig {
        RemoteConfig {
            base_url: self.remote_base_url.clone(),
        }
    }
}

/// Loads `path` if given (defaults otherwise) and applies `CONTENTGEN_OUTPUT_DIR`.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            info!("No config file given, using defaults");
            CliConfig::default()
        }
    };

    if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
        if !dir.trim().is_empty() {
            info!(output_dir = %dir, "CONTENTGEN_OUTPUT_DIR overrides output_dir");
            config.output_dir = PathBuf::from(dir);
        }
    }

    config.aggregate.trace_loaded();
    info!(
        output_dir = %config.output_dir.display(),
        remote_base_url = %config.remote_base_url,
        "Config loaded and merged successfully"
    );
    Ok(config)
}

fn read_config_file(path_ref: &Path) -> Result<CliConfig> {
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file is a valid "all defaults" config.
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}
