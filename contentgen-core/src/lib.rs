#![doc = "contentgen-core: core logic library for contentgen."]

//! Turns a remote repository or a local directory into one markdown document sized for an
//! LLM context window, and measures it (cl100k_base token count, base-1024 size label).
//!
//! # Layout
//! - [`generate`]: the orchestrator, [`generate::ContentGenerator`]
//! - [`select`]: picks remote vs. local acquisition from the request
//! - [`metrics`]: token counting and byte-size labels
//! - [`contract`]: collaborator traits and plain data types
//! - [`aggregate`], [`acquire`]: the concrete local and git collaborators
//! - [`config`], [`error`]

pub mod acquire;
pub mod aggregate;
pub mod config;
pub mod contract;
pub mod error;
pub mod generate;
pub mod metrics;
pub mod select;

pub use contract::{GenerationRequest, GenerationResponse};
pub use error::GenerateError;
pub use generate::ContentGenerator;
