//! NeuroTrace Core — canonical morphology tree, multi-format parsers,
//! validator, serializer, and summary statistics

pub mod asc;
pub mod error;
pub mod format;
pub mod json;
pub mod meta;
pub mod model;
pub mod serializer;
pub mod stats;
pub mod subtree;
pub mod swc;
pub mod validator;


#[cfg(test)]
pub mod test_utils;

pub use error::ParseError;
pub use format::{is_supported, parse_file, NeuronFormat};
pub use model::{distance, swc_type, Metadata, Morphology, Severity, SwcNode, Warning, WarningKind, NO_PARENT};
pub use serializer::serialize;
pub use stats::{compute_stats, MorphologyStats};
pub use subtree::subtree;
pub use validator::validate;

pub use asc::parse_asc;
pub use json::parse_swc_json;
pub use swc::parse_swc;
