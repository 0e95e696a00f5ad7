use std::path::Path;
use std::process::{Command, Stdio};

use async_trait::async_trait;

use crate::aggregate::DirectoryAggregator;
use crate::config::RemoteConfig;
use crate::contract::{AcquisitionError, RemoteAcquirer};

/// GitAcquirer shallow-clones `<base_url>/<owner>/<repo_name>` into a temporary directory and
/// hands the checkout to a [`DirectoryAggregator`], which writes `<output_dir>/<repo_name>.md`.
/// The clone is removed when acquisition finishes, successful or not.
#[derive(Debug, Clone)]
pub struct GitAcquirer {
    remote: RemoteConfig,
    aggregator: DirectoryAggregator,
}

impl GitAcquirer {
    pub fn new(remote: RemoteConfig, aggregator: DirectoryAggregator) -> Self {
        Self { remote, aggregator }
    }

    fn acquire_blocking(&self, owner: &str, repo_name: &str) -> Result<(), AcquisitionError> {
        let repo_url = self.remote.clone_url(owner, repo_name);

        let workdir = tempfile::tempdir().map_err(|e| -> AcquisitionError {
            tracing::error!(error = ?e, "Failed to create temporary clone directory");
            format!("failed to create temporary clone directory: {e}").into()
        })?;
        let checkout = workdir.path().join(repo_name);

        clone_shallow(&repo_url, &checkout)?;

        let summary = self
            .aggregator
            .aggregate(&checkout, repo_name)
            .map_err(|e| -> AcquisitionError {
                tracing::error!(error = ?e, repo_url = %repo_url, "Failed to aggregate cloned repository");
                format!("failed to aggregate {repo_url}: {e}").into()
            })?;

        tracing::info!(
            repo_url = %repo_url,
            files = summary.files_included,
            path = %summary.output_path.display(),
            "Acquired remote repository"
        );
        Ok(())
    }
}

#[async_trait]
impl RemoteAcquirer for GitAcquirer {
    async fn acquire_remote(&self, owner: &str, repo_name: &str) -> Result<(), AcquisitionError> {
        let acquirer = self.clone();
        let owner_owned = owner.to_string();
        let repo_owned = repo_name.to_string();

        // Cloning and aggregating both block.
        tokio::task::spawn_blocking(move || acquirer.acquire_blocking(&owner_owned, &repo_owned))
            .await
            .map_err(|e| -> AcquisitionError {
                tracing::error!(error = ?e, owner, repo_name, "Acquisition task did not complete");
                format!("acquisition of {owner}/{repo_name} did not complete: {e}").into()
            })?
    }
}

/// `git clone --depth 1 --quiet <repo_url> <destination>` with terminal prompts off and stdin
/// closed, so a private or missing https repository fails instead of asking for a username.
pub fn clone_command(repo_url: &str, destination: &Path) -> Command {
    let mut command = Command::new("git");
    command
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--quiet")
        .arg(repo_url)
        .arg(destination)
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null());
    command
}

fn clone_shallow(repo_url: &str, destination: &Path) -> Result<(), AcquisitionError> {
    let status = clone_command(repo_url, destination).status();

    match status {
        Ok(s) if s.success() => {
            tracing::info!(
                repo_url = repo_url,
                path = %destination.display(),
                "Successfully cloned git repository"
            );
            Ok(())
        }
        Ok(s) => {
            tracing::error!(
                repo_url = repo_url,
                path = %destination.display(),
                "Git exited with non-zero code: {}", s
            );
            Err(format!("git clone of {repo_url} exited with {s}").into())
        }
        Err(e) => {
            tracing::error!(
                error = ?e,
                repo_url = repo_url,
                "Failed to launch git process"
            );
            Err(format!("failed to launch git for {repo_url}: {e}").into())
        }
    }
}
