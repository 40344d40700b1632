//! Structured metadata extraction from SWC header comments

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Metadata;

/// The four recognized `# KEY value` metadata keys, in emission order.
pub const METADATA_KEYS: [&str; 4] = ["ORIGINAL_SOURCE", "CREATURE", "REGION", "CELL_TYPE"];

static PATTERNS: LazyLock<Vec<(usize, Regex)>> = LazyLock::new(|| {
    METADATA_KEYS
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let re = Regex::new(&format!(r"(?i)^#?\s*{key}\s+(.+)")).expect("static pattern");
            (i, re)
        })
        .collect()
});

/// Scan one comment line for a metadata key and record its value.
pub fn extract_metadata(comment: &str, metadata: &mut Metadata) {
    for (index, re) in PATTERNS.iter() {
        if let Some(caps) = re.captures(comment) {
            let value = caps[1].trim().to_string();
            match index {
                0 => metadata.original_source = Some(value),
                1 => metadata.species = Some(value),
                2 => metadata.brain_region = Some(value),
                _ => metadata.cell_type = Some(value),
            }
        }
    }
}

/// Does a preserved comment already carry `key`? Used by the serializer to
/// avoid duplicating metadata lines on round-trip.
pub fn comment_has_key(comment: &str, key: &str) -> bool {
    static KEY_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        METADATA_KEYS
            .iter()
            .map(|key| Regex::new(&format!(r"(?i)^#?\s*{key}\s")).expect("static pattern"))
            .collect()
    });
    METADATA_KEYS
        .iter()
        .position(|k| *k == key)
        .is_some_and(|i| KEY_RES[i].is_match(comment))
}
