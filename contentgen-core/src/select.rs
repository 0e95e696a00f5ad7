//! Acquisition strategy selection.
//!
//! Pure derivation from the two optional request fields to an [`AcquisitionTarget`]. The
//! remote identifier wins when both fields are filled in. Blank strings count as absent.

use std::path::{Component, Path};

use tracing::debug;

use crate::contract::{AcquisitionTarget, GenerationRequest};
use crate::error::GenerateError;

/// Choose the acquisition strategy for `request`.
pub fn select(request: &GenerationRequest) -> Result<AcquisitionTarget, GenerateError> {
    if let Some(remote) = non_blank(request.remote_identifier.as_deref()) {
        let (owner, repo_name) = parse_remote_identifier(remote)?;
        debug!(%owner, %repo_name, "Selected remote acquisition");
        return Ok(AcquisitionTarget::Remote { owner, repo_name });
    }

    if let Some(path) = non_blank(request.local_path.as_deref()) {
        let output_base_name = final_path_component(path)?;
        debug!(path, %output_base_name, "Selected local acquisition");
        return Ok(AcquisitionTarget::Local {
            path: path.trim().to_string(),
            output_base_name,
        });
    }

    Err(GenerateError::MissingInput)
}

/// Split a remote identifier into `(owner, repo_name)`: the second-to-last and last
/// non-empty `/`-separated segments. No other URL validation is done.
pub fn parse_remote_identifier(identifier: &str) -> Result<(String, String), GenerateError> {
    let segments: Vec<&str> = identifier
        .trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [.., owner, repo_name] => Ok((owner.to_string(), repo_name.to_string())),
        _ => Err(GenerateError::InvalidInput(format!(
            "remote identifier {identifier:?} must contain an owner and a repository name"
        ))),
    }
}

/// Final component of a filesystem path, e.g. `/a/b/c/` -> `c`.
pub fn final_path_component(path: &str) -> Result<String, GenerateError> {
    match Path::new(path.trim()).components().next_back() {
        Some(Component::Normal(name)) => Ok(name.to_string_lossy().into_owned()),
        _ => Err(GenerateError::InvalidInput(format!(
            "local path {path:?} has no final file or directory name"
        ))),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
