//! Description similarity strategies.
//!
//! Every strategy is symmetric, returns a value in `[0, 1]`, and returns
//! `1.0` only for identical inputs. One strategy must be used for a whole
//! batch, otherwise confidence tiers are not comparable.

use std::fmt;
use std::sync::Arc;

use rapidfuzz::distance::{indel, jaro_winkler};
use serde::{Deserialize, Serialize};

/// Pluggable string similarity over already-normalized text.
pub trait TextSimilarity: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Indel ratio: `2 * LCS / (|a| + |b|)` over characters. Same value as a
/// Ratcliff/Obershelp ratio for typical catalog text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelRatio;

impl TextSimilarity for IndelRatio {
    fn name(&self) -> &'static str {
        "indel"
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        bounded(a, b, || indel::normalized_similarity(a.chars(), b.chars()))
    }
}

/// Jaro-Winkler similarity, favouring shared prefixes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaroWinkler;

impl TextSimilarity for JaroWinkler {
    fn name(&self) -> &'static str {
        "jaro-winkler"
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        bounded(a, b, || jaro_winkler::similarity(a.chars(), b.chars()))
    }
}

fn bounded(a: &str, b: &str, compute: impl FnOnce() -> f64) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let value = compute();
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Selectable similarity strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SimilarityAlgorithm {
    #[default]
    Indel,
    JaroWinkler,
}

impl SimilarityAlgorithm {
    pub fn build(self) -> Arc<dyn TextSimilarity> {
        match self {
            Self::Indel => Arc::new(IndelRatio),
            Self::JaroWinkler => Arc::new(JaroWinkler),
        }
    }
}
