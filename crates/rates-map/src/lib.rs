//! Crosswalk matching engine for composite rates.
//!
//! Build a [`CrosswalkIndex`] once, then run an [`EnrichmentPipeline`] over
//! the rates. Scoring is pure and deterministic, so re-running the pipeline
//! on its own output changes nothing.
#![deny(unsafe_code)]

pub mod enrich;
pub mod error;
pub mod index;
pub mod overrides;
pub mod resolve;
pub mod routing;
pub mod rules;
pub mod score;
pub mod similarity;
pub mod text;
pub mod units;

pub use enrich::{
    EnrichmentOutput, EnrichmentPipeline, EnrichmentStats, TierCounts, enrich, needs_review,
    with_confidence,
};
pub use error::LoadError;
pub use index::{CrosswalkIndex, DuplicatePolicy};
pub use overrides::{OverrideTable, OverrideTarget};
pub use resolve::{Resolution, Resolver};
pub use routing::{HintRoute, HintRouter, RouteRule};
pub use rules::RuleTable;
pub use score::{
    ConfidenceLevel, ConfidenceThresholds, MatchOptions, MatchScore, MatchScorer, PreparedRate,
    ScoreWeights,
};
pub use similarity::{IndelRatio, JaroWinkler, SimilarityAlgorithm, TextSimilarity};
pub use text::{extract_keywords, keyword_overlap, normalize_text};
pub use units::{normalize_unit, units_compatible};
