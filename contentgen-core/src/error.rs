use std::path::PathBuf;

use crate::contract::AcquisitionError;

/// Failures surfaced by [`crate::generate::ContentGenerator::generate`].
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Neither a remote identifier nor a local path was usable.
    #[error("Either a remote identifier or a local path must be provided.")]
    MissingInput,

    /// A supplied input could not be interpreted, e.g. a remote identifier with too few segments.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The remote or local collaborator failed; the original error is kept as the source.
    #[error("acquisition failed: {0}")]
    Acquisition(#[source] AcquisitionError),

    /// The aggregated document was missing or unreadable after acquisition returned.
    #[error("failed to read aggregated document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            GenerateError::MissingInput | GenerateError::InvalidInput(_)
        )
    }
}
