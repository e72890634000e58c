//! Weighted scoring of a rate against one crosswalk entry.
//!
//! The total score combines three signals:
//! - unit compatibility (binary)
//! - description similarity (see [`crate::similarity`])
//! - seed keyword overlap
//!
//! and is bucketed into a [`ConfidenceLevel`] by [`ConfidenceThresholds`].

use std::collections::BTreeSet;
use std::sync::Arc;

use rates_model::{CrosswalkEntry, MatchConfidence, Rate};
use serde::{Deserialize, Serialize};

use crate::index::DuplicatePolicy;
use crate::similarity::{SimilarityAlgorithm, TextSimilarity};
use crate::text::{extract_keywords, keyword_overlap, normalize_text, seed_keywords};
use crate::units::units_compatible;

/// Confidence categories for automatic matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// Below the medium threshold. Needs manual verification.
    Low,
    /// Between the medium and high thresholds. Should be reviewed.
    Medium,
    /// At or above the high threshold.
    High,
}

impl ConfidenceLevel {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high confidence - likely correct",
            Self::Medium => "medium confidence - should review",
            Self::Low => "low confidence - needs verification",
        }
    }
}

impl From<ConfidenceLevel> for MatchConfidence {
    fn from(level: ConfidenceLevel) -> Self {
        match level {
            ConfidenceLevel::High => MatchConfidence::High,
            ConfidenceLevel::Medium => MatchConfidence::Medium,
            ConfidenceLevel::Low => MatchConfidence::Low,
        }
    }
}

/// Tier boundaries on the total score.
///
/// - At or above `high`: [`ConfidenceLevel::High`]
/// - At or above `medium`: [`ConfidenceLevel::Medium`]
/// - Anything else: [`ConfidenceLevel::Low`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceThresholds {
    /// Minimum total score for a high confidence match (default: 0.75).
    pub high: f64,
    /// Minimum total score for a medium confidence match (default: 0.50).
    pub medium: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high: 0.75,
            medium: 0.50,
        }
    }
}

impl ConfidenceThresholds {
    /// Tighter boundaries, pushing more rates into review.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            high: 0.85,
            medium: 0.60,
        }
    }

    /// Looser boundaries for exploratory runs.
    #[must_use]
    pub fn relaxed() -> Self {
        Self {
            high: 0.65,
            medium: 0.40,
        }
    }

    #[must_use]
    pub fn categorize(&self, total_score: f64) -> ConfidenceLevel {
        if total_score >= self.high {
            ConfidenceLevel::High
        } else if total_score >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

/// Weights of the three score components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub unit: f64,
    pub description: f64,
    pub keyword: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            unit: 0.4,
            description: 0.4,
            keyword: 0.2,
        }
    }
}

/// Scoring breakdown for one (rate, entry) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    /// 1.0 when the units share a class, else 0.0.
    pub unit_score: f64,
    pub description_score: f64,
    pub keyword_score: f64,
    /// Weighted sum of the three components.
    pub total_score: f64,
    pub confidence: ConfidenceLevel,
}

impl MatchScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        format!(
            "unit: {:.0}%; description: {:.0}%; keywords: {:.0}%; total: {:.0}% ({})",
            self.unit_score * 100.0,
            self.description_score * 100.0,
            self.keyword_score * 100.0,
            self.total_score * 100.0,
            self.confidence.description()
        )
    }
}

/// Rate text prepared once and reused for every candidate.
#[derive(Debug, Clone)]
pub struct PreparedRate<'a> {
    pub unit: &'a str,
    pub text: String,
    pub keywords: BTreeSet<String>,
}

impl<'a> PreparedRate<'a> {
    pub fn new(rate: &'a Rate) -> Self {
        let raw = rate.match_text();
        Self {
            unit: &rate.unit,
            text: normalize_text(&raw),
            keywords: extract_keywords(&raw),
        }
    }
}

/// Everything that tunes a matching run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchOptions {
    pub weights: ScoreWeights,
    pub thresholds: ConfidenceThresholds,
    pub similarity: SimilarityAlgorithm,
    pub duplicates: DuplicatePolicy,
}

impl MatchOptions {
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityAlgorithm) -> Self {
        self.similarity = similarity;
        self
    }

    #[must_use]
    pub fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
        self.duplicates = duplicates;
        self
    }

    pub fn scorer(&self) -> MatchScorer {
        MatchScorer::new(self.weights, self.thresholds, self.similarity.build())
    }
}

/// Pure scoring function over fixed weights, thresholds and similarity strategy.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    weights: ScoreWeights,
    thresholds: ConfidenceThresholds,
    similarity: Arc<dyn TextSimilarity>,
}

impl Default for MatchScorer {
    fn default() -> Self {
        MatchOptions::default().scorer()
    }
}

impl MatchScorer {
    pub fn new(
        weights: ScoreWeights,
        thresholds: ConfidenceThresholds,
        similarity: Arc<dyn TextSimilarity>,
    ) -> Self {
        Self {
            weights,
            thresholds,
            similarity,
        }
    }

    pub fn thresholds(&self) -> &ConfidenceThresholds {
        &self.thresholds
    }

    pub fn similarity_name(&self) -> &'static str {
        self.similarity.name()
    }

    /// Score a single rate against a single entry.
    pub fn score(&self, rate: &Rate, entry: &CrosswalkEntry) -> MatchScore {
        self.score_prepared(&PreparedRate::new(rate), entry)
    }

    pub fn score_prepared(&self, rate: &PreparedRate<'_>, entry: &CrosswalkEntry) -> MatchScore {
        let unit_score = if units_compatible(rate.unit, &entry.unit) {
            1.0
        } else {
            0.0
        };

        let description_score = self
            .similarity
            .similarity(&rate.text, &normalize_text(&entry.description));

        let keyword_score = if entry.has_seed_keywords() {
            keyword_overlap(&seed_keywords(entry), &rate.keywords)
        } else {
            0.0
        };

        let total_score = self.weights.unit * unit_score
            + self.weights.description * description_score
            + self.weights.keyword * keyword_score;

        MatchScore {
            unit_score,
            description_score,
            keyword_score,
            total_score,
            confidence: self.thresholds.categorize(total_score),
        }
    }
}
