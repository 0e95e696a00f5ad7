//! High-level pipeline: select → acquire → read → measure.
//!
//! [`ContentGenerator`] is the single entrypoint callers use. For one request it:
//!   - Selects the acquisition strategy with [`crate::select::select`]
//!   - Invokes the matching collaborator ([`RemoteAcquirer`] or [`LocalAggregator`])
//!   - Reads `<output_dir>/<base>.md` back from disk
//!   - Measures the text with [`crate::metrics`] and returns a [`GenerationResponse`]
//!
//! # Error Handling
//! Each failed step returns immediately. Invalid input is rejected before any collaborator
//! runs; collaborator errors are wrapped unchanged; a missing document names the path that
//! was expected. Nothing is retried.
//!
//! # State
//! The generator holds only its configuration and collaborators. Every request derives its
//! own target and reads its own document, so one generator can serve concurrent callers.

use std::path::PathBuf;

use tracing::{error, info};

use crate::config::GeneratorConfig;
use crate::contract::{
    AcquisitionTarget, GenerationRequest, GenerationResponse, LocalAggregator, RemoteAcquirer,
    TokenEncoder,
};
use crate::error::GenerateError;
use crate::metrics::{count_tokens, human_readable_byte_count};
use crate::select::select;

pub struct ContentGenerator<R, L, E> {
    config: GeneratorConfig,
    remote: R,
    local: L,
    encoder: E,
}

impl<R, L, E> ContentGenerator<R, L, E>
where
    R: RemoteAcquirer,
    L: LocalAggregator,
    E: TokenEncoder,
{
    pub fn new(config: GeneratorConfig, remote: R, local: L, encoder: E) -> Self {
        config.trace_loaded();
        Self {
            config,
            remote,
            local,
            encoder,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Acquire the requested source tree and return its aggregated document with metrics.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerateError> {
        let target = select(request).map_err(|e| {
            error!(error = %e, "[GENERATE][ERROR] Rejected request");
            e
        })?;

        match &target {
            AcquisitionTarget::Remote { owner, repo_name } => {
                info!(%owner, repo = %repo_name, "[GENERATE] Processing remote repository");
                self.remote
                    .acquire_remote(owner, repo_name)
                    .await
                    .map_err(|e| {
                        error!(%owner, repo = %repo_name, error = %e, "[GENERATE][ERROR] Remote acquisition failed");
                        GenerateError::Acquisition(e)
                    })?;
            }
            AcquisitionTarget::Local {
                path,
                output_base_name,
            } => {
                info!(%path, name = %output_base_name, "[GENERATE] Processing local path");
                self.local
                    .aggregate_local(path, output_base_name)
                    .await
                    .map_err(|e| {
                        error!(%path, error = %e, "[GENERATE][ERROR] Local aggregation failed");
                        GenerateError::Acquisition(e)
                    })?;
            }
        }

        let content = self.read_document(&target)?;
        let token_count = count_tokens(&self.encoder, Some(content.as_str()));
        let byte_size_label = human_readable_byte_count(Some(content.as_str()));

        info!(
            document = %target.document_name(),
            tokens = token_count,
            size = %byte_size_label,
            "[GENERATE] Generation complete"
        );

        Ok(GenerationResponse {
            content,
            token_count,
            byte_size_label,
        })
    }

    /// Path the collaborator for `target` is expected to have written.
    pub fn document_path(&self, target: &AcquisitionTarget) -> PathBuf {
        self.config.output_dir.join(target.document_name())
    }

    fn read_document(&self, target: &AcquisitionTarget) -> Result<String, GenerateError> {
        let path = self.document_path(target);
        std::fs::read_to_string(&path).map_err(|source| {
            error!(path = %path.display(), error = %source, "[GENERATE][ERROR] Aggregated document missing or unreadable");
            GenerateError::Io { path, source }
        })
    }
}
