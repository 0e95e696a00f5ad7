use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://github.com";
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    "target",
    "node_modules",
    ".idea",
    ".vscode",
    "build",
    "dist",
];

/// Settings for the orchestrator. Resolved once at startup and passed in by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Directory where collaborators write `<name>.md` and the orchestrator reads it back.
    pub output_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl GeneratorConfig {
    pub fn trace_loaded(&self) {
        info!(output_dir = %self.output_dir.display(), "Loaded GeneratorConfig");
    }
}

/// Filtering rules for [`crate::aggregate::DirectoryAggregator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Directory names skipped anywhere in the tree.
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are left out of the document.
    pub max_file_bytes: u64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

impl AggregateConfig {
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn trace_loaded(&self) {
        info!(
            exclude_dirs = self.exclude_dirs.len(),
            max_file_bytes = self.max_file_bytes,
            "Loaded AggregateConfig"
        );
        debug!(?self, "AggregateConfig loaded (full debug)");
    }
}

/// Where [`crate::acquire::GitAcquirer`] clones `<owner>/<repo>` from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_BASE_URL.to_string(),
        }
    }
}

impl RemoteConfig {
    /// Clone URL for a repository, e.g. `https://github.com/user/repo`.
    pub fn clone_url(&self, owner: &str, repo_name: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), owner, repo_name)
    }
}
