//! Format detection and dispatch

use crate::asc::parse_asc;
use crate::error::ParseError;
use crate::json::parse_swc_json;
use crate::model::Morphology;
use crate::swc::parse_swc;

/// Supported neuron-tracing formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeuronFormat {
    Swc,
    SwcJson,
    NeurolucidaAsc,
}

impl NeuronFormat {
    pub fn from_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        if lower.ends_with(".swc") {
            Some(NeuronFormat::Swc)
        } else if lower.ends_with(".json") {
            Some(NeuronFormat::SwcJson)
        } else if lower.ends_with(".asc") {
            Some(NeuronFormat::NeurolucidaAsc)
        } else {
            None
        }
    }
}

/// Is this a file the parsers can handle?
pub fn is_supported(file_name: &str) -> bool {
    NeuronFormat::from_name(file_name).is_some()
}

/// Parse a neuron file by auto-detecting its format from the file name.
/// Emits the same canonical [`Morphology`] regardless of input format.
pub fn parse_file(file_name: &str, content: &str) -> Result<Morphology, ParseError> {
    match NeuronFormat::from_name(file_name) {
        Some(NeuronFormat::Swc) => Ok(parse_swc(content)),
        Some(NeuronFormat::SwcJson) => parse_swc_json(content),
        Some(NeuronFormat::NeurolucidaAsc) => Ok(parse_asc(content)),
        None => Err(ParseError::UnsupportedFormat(file_name.to_string())),
    }
}
