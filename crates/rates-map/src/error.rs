//! Errors raised before a batch starts.
//!
//! Per-rate problems (poor matches, missing text) are never errors; they are
//! recorded on the rate and in the batch statistics.

use thiserror::Error;

/// Structural problems with the reference data or the override table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("crosswalk is empty")]
    EmptyCrosswalk,

    #[error(
        "duplicate level-4 code {code} (first seen in group {first_group}, again in group {second_group})"
    )]
    DuplicateLevel4Code {
        code: String,
        first_group: String,
        second_group: String,
    },

    #[error("override for rate {rate_code} targets unknown classification {target}")]
    UnknownOverrideTarget { rate_code: String, target: String },

    #[error("invalid rule pattern {pattern:?}: {message}")]
    InvalidRulePattern { pattern: String, message: String },

    #[error(
        "override for rate {rate_code} names level-4 code {level4_code} from group {entry_group}, not {group}"
    )]
    MismatchedOverrideTarget {
        rate_code: String,
        level4_code: String,
        group: String,
        entry_group: String,
    },
}
