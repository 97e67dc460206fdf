//! Record Module - Raw input and normalization
//!
//! A raw record arrives as loosely-typed key/value pairs (form, JSON, CSV).
//! The normalizer turns it into a `NormalizedRow` with every field numeric.

pub mod raw;
pub mod normalize;


// Re-export common types
pub use raw::{RawRecord, NormalizedRow, RAW_FIELDS, RAW_FIELD_COUNT};
pub use normalize::{
    RecordNormalizer, Normalized, NormalizationAudit, CoercionFallback, FallbackReason,
    is_identifier_field,
};
