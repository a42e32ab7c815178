pub mod codes;
pub mod confidence;
pub mod dates;
pub mod engine;
pub mod names;
pub mod raw;
pub mod rules;
pub mod tree;
pub mod types;

pub use codes::{extract_codes, extract_descriptions};
pub use confidence::aggregate_confidence;
pub use dates::parse_date;
pub use engine::{compose_notes, normalize, resolve_signed_by, Normalizer};
pub use names::split_name;
pub use raw::*;
pub use rules::*;
pub use tree::*;
pub use types::*;

use crate::pipeline::extraction::ProcessedDocument;

/// Processor response → entity tree → raw view → canonical record.
pub fn normalize_document(
    normalizer: &Normalizer,
    document: &ProcessedDocument,
) -> ExtractedReferralData {
    let tree = build_document_tree(document);
    let raw = RawReferralDocument::from_tree(&tree);

    tracing::debug!(
        top_level_entities = document.entities.len(),
        tree_keys = tree.len(),
        "Entity tree built"
    );

    normalizer.normalize(&raw)
}
