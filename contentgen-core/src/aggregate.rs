//! Local tree aggregation: flatten a directory into one markdown document.
//!
//! Every included file becomes a `## <relative/path>` section followed by a fenced block
//! tagged with the file extension. Entries are visited in sorted order so the same tree
//! always yields the same document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::AggregateConfig;
use crate::contract::{AcquisitionError, LocalAggregator};

/// Outcome of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    pub output_path: PathBuf,
    pub files_included: usize,
    pub files_skipped: usize,
}

/// Writes `<output_dir>/<output_base_name>.md` from a local directory.
#[derive(Debug, Clone)]
pub struct DirectoryAggregator {
    output_dir: PathBuf,
    config: AggregateConfig,
}

impl DirectoryAggregator {
    pub fn new(output_dir: impl Into<PathBuf>, config: AggregateConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            config,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Aggregate `root` into `<output_dir>/<output_base_name>.md`.
    pub fn aggregate(&self, root: &Path, output_base_name: &str) -> io::Result<AggregateSummary> {
        let metadata = fs::metadata(root).map_err(|e| {
            error!(error = ?e, path = %root.display(), "Cannot read local path");
            e
        })?;

        let mut document = format!("# {output_base_name}\n\n");
        let mut summary = AggregateSummary {
            output_path: self.output_dir.join(format!("{output_base_name}.md")),
            files_included: 0,
            files_skipped: 0,
        };

        if metadata.is_dir() {
            self.visit_dir(root, root, &mut document, &mut summary)?;
        } else {
            let base = root.parent().unwrap_or(root);
            self.append_file(root, base, &mut document, &mut summary)?;
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            error!(error = ?e, path = %self.output_dir.display(), "Failed to create output directory");
            e
        })?;
        fs::write(&summary.output_path, document).map_err(|e| {
            error!(error = ?e, path = %summary.output_path.display(), "Failed to write aggregated document");
            e
        })?;

        info!(
            path = %summary.output_path.display(),
            included = summary.files_included,
            skipped = summary.files_skipped,
            "Wrote aggregated document"
        );
        Ok(summary)
    }

    fn visit_dir(
        &self,
        dir: &Path,
        root: &Path,
        document: &mut String,
        summary: &mut AggregateSummary,
    ) -> io::Result<()> {
        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            // Linked directories can point back up the tree; only real directories are walked.
            if fs::symlink_metadata(&path)?.file_type().is_symlink() && path.is_dir() {
                debug!(path = %path.display(), "Skipping symlinked directory");
                summary.files_skipped += 1;
                continue;
            }

            if path.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if self.config.is_excluded_dir(name) || self.is_output_dir(&path) {
                    debug!(path = %path.display(), "Skipping excluded directory");
                    continue;
                }
                self.visit_dir(&path, root, document, summary)?;
            } else if path.is_file() {
                self.append_file(&path, root, document, summary)?;
            }
        }
        Ok(())
    }

    // Aggregating a tree that contains the output directory must not pick up earlier documents.
    fn is_output_dir(&self, path: &Path) -> bool {
        match (fs::canonicalize(path), fs::canonicalize(&self.output_dir)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn append_file(
        &self,
        path: &Path,
        root: &Path,
        document: &mut String,
        summary: &mut AggregateSummary,
    ) -> io::Result<()> {
        let size = fs::metadata(path)?.len();
        if size > self.config.max_file_bytes {
            debug!(path = %path.display(), size, "Skipping oversized file");
            summary.files_skipped += 1;
            return Ok(());
        }

        let bytes = fs::read(path).map_err(|e| {
            error!(error = ?e, path = %path.display(), "Failed to read file while aggregating");
            e
        })?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                warn!(path = %path.display(), "Skipping non UTF-8 file");
                summary.files_skipped += 1;
                return Ok(());
            }
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        let display = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let language = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let fence = code_fence(&text);

        document.push_str(&format!("## {display}\n\n{fence}{language}\n"));
        document.push_str(&text);
        if !text.ends_with('\n') {
            document.push('\n');
        }
        document.push_str(&format!("{fence}\n\n"));

        summary.files_included += 1;
        Ok(())
    }
}

/// A backtick fence longer than any backtick run in `text`, and at least three long.
pub fn code_fence(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[async_trait]
impl LocalAggregator for DirectoryAggregator {
    async fn aggregate_local(
        &self,
        path: &str,
        output_base_name: &str,
    ) -> Result<(), AcquisitionError> {
        let aggregator = self.clone();
        let root = PathBuf::from(path);
        let name = output_base_name.to_string();

        // The walk is blocking file IO.
        let result = tokio::task::spawn_blocking(move || aggregator.aggregate(&root, &name))
            .await
            .map_err(|e| -> AcquisitionError {
                error!(error = ?e, path, "Aggregation task did not complete");
                format!("aggregation of local path {path} did not complete: {e}").into()
            })?;

        result.map(|_| ()).map_err(|e| -> AcquisitionError {
            format!("failed to aggregate local path {path}: {e}").into()
        })
    }
}
