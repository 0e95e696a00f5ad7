//! Token and size metrics over an aggregated document.
//!
//! Both operations treat absent text the same as empty text and never fail.

use tiktoken_rs::CoreBPE;

use crate::contract::{EncoderError, TokenEncoder};

const UNIT_PREFIXES: &[u8] = b"KMGTPE";

/// Count tokens in `text` with `encoder`. `None` and `""` are 0 without calling the encoder.
pub fn count_tokens<E>(encoder: &E, text: Option<&str>) -> usize
where
    E: TokenEncoder + ?Sized,
{
    match text {
        None => 0,
        Some(t) if t.is_empty() => 0,
        Some(t) => encoder.count_tokens(t),
    }
}

/// Human-readable size of `text` on a base-1024 scale, e.g. `"11 B"` or `"1.5 KB"`.
pub fn human_readable_byte_count(text: Option<&str>) -> String {
    format_byte_count(text.map_or(0, str::len) as u64)
}

/// Label for a raw size. Sizes under 1024 are printed exactly; larger sizes get one
/// decimal place (ties rounded up) and a `K`..`E` prefix.
pub fn format_byte_count(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut exponent = 1usize;
    while exponent < UNIT_PREFIXES.len() && bytes >= 1024u64.pow(exponent as u32 + 1) {
        exponent += 1;
    }

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 10.0).round() / 10.0;
    let unit = UNIT_PREFIXES[exponent - 1] as char;
    format!("{rounded:.1} {unit}B")
}

/// [`TokenEncoder`] backed by the cl100k_base vocabulary (GPT-4 / GPT-3.5-turbo family).
pub struct Cl100kEncoder {
    bpe: CoreBPE,
}

impl Cl100kEncoder {
    pub fn new() -> Result<Self, EncoderError> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| -> EncoderError {
            tracing::error!(error = %e, "Failed to load cl100k_base vocabulary");
            format!("failed to load cl100k_base vocabulary: {e}").into()
        })?;
        Ok(Self { bpe })
    }
}

impl TokenEncoder for Cl100kEncoder {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}
