//! # contract: collaborator interfaces for content generation
//!
//! The orchestrator in [`crate::generate`] never talks to git, the filesystem walker or the
//! tokenizer directly. It goes through the traits below, which are implemented by the
//! concrete types in this crate ([`crate::acquire::GitAcquirer`],
//! [`crate::aggregate::DirectoryAggregator`], [`crate::metrics::Cl100kEncoder`]) and by
//! `mockall` mocks in tests.
//!
//! ## Mocking & Testing
//! - All traits are annotated for `mockall`; the mocks are exported under the default
//!   `test-export-mocks` feature so integration tests and downstream crates can use them.
//!
//! ## Errors
//! - Collaborators return boxed errors. The orchestrator wraps them unchanged into
//!   [`crate::error::GenerateError::Acquisition`].

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type returned by acquisition collaborators.
pub type AcquisitionError = Box<dyn std::error::Error + Send + Sync>;

/// Error type returned when a token encoder cannot be constructed.
pub type EncoderError = Box<dyn std::error::Error + Send + Sync>;

/// Caller input for one generation run. Exactly one field is expected to be meaningful;
/// the selector enforces that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    /// URL-like reference to a remote repository, e.g. `https://github.com/user/repo`.
    pub remote_identifier: Option<String>,
    /// Filesystem path of a local directory.
    pub local_path: Option<String>,
}

impl GenerationRequest {
    pub fn remote(identifier: impl Into<String>) -> Self {
        Self {
            remote_identifier: Some(identifier.into()),
            local_path: None,
        }
    }

    pub fn local(path: impl Into<String>) -> Self {
        Self {
            remote_identifier: None,
            local_path: Some(path.into()),
        }
    }
}

/// The acquisition strategy chosen for a request, with the identifiers it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionTarget {
    Remote { owner: String, repo_name: String },
    Local { path: String, output_base_name: String },
}

impl AcquisitionTarget {
    /// Base name of the aggregated document this target produces.
    pub fn base_name(&self) -> &str {
        match self {
            AcquisitionTarget::Remote { repo_name, .. } => repo_name,
            AcquisitionTarget::Local {
                output_base_name, ..
            } => output_base_name,
        }
    }

    /// File name of the aggregated document, `<base>.md`.
    pub fn document_name(&self) -> String {
        format!("{}.md", self.base_name())
    }
}

/// Result handed back to the caller: the document plus its metrics.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GenerationResponse {
    pub content: String,
    pub token_count: usize,
    pub byte_size_label: String,
}

/// Fetches a remote repository and writes `<output_dir>/<repo_name>.md`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RemoteAcquirer: Send + Sync {
    async fn acquire_remote(&self, owner: &str, repo_name: &str) -> Result<(), AcquisitionError>;
}

/// Walks a local path and writes `<output_dir>/<output_base_name>.md`.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait LocalAggregator: Send + Sync {
    async fn aggregate_local(
        &self,
        path: &str,
        output_base_name: &str,
    ) -> Result<(), AcquisitionError>;
}

/// Byte-pair-encoding token counter. Implementations must be deterministic for a given
/// vocabulary version.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait TokenEncoder: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}
