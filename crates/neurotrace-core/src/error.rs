//! Fatal parse defects. Everything recoverable is a [`Warning`] instead.
//!
//! [`Warning`]: crate::model::Warning

use thiserror::Error;

/// Raised only when a payload is not parseable at all. Callers present the
/// message and keep the previous tree; they never retry automatically.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error(
        "invalid SWC-JSON: expected an array of node objects, or an object with a \
         'morphology', 'reconstruction', 'nodes', or 'data' array"
    )]
    NoNodeCollection,

    #[error("SWC-JSON contains no valid nodes")]
    NoValidNodes,

    #[error("unsupported format: {0}. Supported: .swc, .json, .asc")]
    UnsupportedFormat(String),
}
