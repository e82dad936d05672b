//! Field extraction: free-form answers to field-keyed items and records.
//!
//! Extraction is total. Unrecognised structure yields empty lists, malformed
//! values are absent, and the same input always produces the same items.

pub mod chunking;
pub mod schema;
pub mod topics;

pub use chunking::{extract, Item};
pub use schema::{FieldKind, FieldSchema, FieldSpec};
pub use topics::{strip_header, Basics, Extractor, ExtractorConfig, HEADER_SEPARATOR};
