//! Batch enrichment: overrides first, then best-match resolution, with
//! per-tier and per-section statistics.

use std::collections::BTreeMap;
use std::time::Instant;

use rates_model::{Classification, MatchConfidence, Rate, section_of};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::error::LoadError;
use crate::index::CrosswalkIndex;
use crate::overrides::OverrideTable;
use crate::resolve::Resolver;
use crate::score::MatchScorer;

/// Count of rates per confidence tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub manual: usize,
    pub no_match: usize,
}

impl TierCounts {
    pub fn record(&mut self, confidence: MatchConfidence) {
        *self.slot(confidence) += 1;
    }

    pub fn get(&self, confidence: MatchConfidence) -> usize {
        match confidence {
            MatchConfidence::High => self.high,
            MatchConfidence::Medium => self.medium,
            MatchConfidence::Low => self.low,
            MatchConfidence::Manual => self.manual,
            MatchConfidence::Unmatched => self.no_match,
        }
    }

    fn slot(&mut self, confidence: MatchConfidence) -> &mut usize {
        match confidence {
            MatchConfidence::High => &mut self.high,
            MatchConfidence::Medium => &mut self.medium,
            MatchConfidence::Low => &mut self.low,
            MatchConfidence::Manual => &mut self.manual,
            MatchConfidence::Unmatched => &mut self.no_match,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low + self.manual + self.no_match
    }

    /// Rates that went through scoring and found a candidate.
    pub fn scored(&self) -> usize {
        self.high + self.medium + self.low
    }

    pub fn merge(&mut self, other: &TierCounts) {
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
        self.manual += other.manual;
        self.no_match += other.no_match;
    }
}

/// Aggregate statistics of one enrichment run.
///
/// Merging is plain counter addition, so partial stats from parallel
/// workers combine in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentStats {
    pub tiers: TierCounts,
    /// Section (text before the first `.` of the group code) to tier counts.
    pub by_section: BTreeMap<String, TierCounts>,
    /// Rates whose name and description were both blank.
    pub missing_text: usize,
}

impl EnrichmentStats {
    pub fn record(&mut self, section: &str, confidence: MatchConfidence) {
        self.tiers.record(confidence);
        self.by_section
            .entry(section.to_string())
            .or_default()
            .record(confidence);
    }

    #[must_use]
    pub fn merge(mut self, other: EnrichmentStats) -> Self {
        self.tiers.merge(&other.tiers);
        for (section, counts) in other.by_section {
            self.by_section.entry(section).or_default().merge(&counts);
        }
        self.missing_text += other.missing_text;
        self
    }

    pub fn total_rates(&self) -> usize {
        self.tiers.total()
    }

    /// Percentage of scored rates in `confidence`; zero when nothing was scored.
    pub fn share(&self, confidence: MatchConfidence) -> f64 {
        let scored = self.tiers.scored();
        if scored == 0 {
            return 0.0;
        }
        self.tiers.get(confidence) as f64 * 100.0 / scored as f64
    }
}

/// Enrichment over a fixed index, scorer and override table.
#[derive(Debug, Clone, Copy)]
pub struct EnrichmentPipeline<'a> {
    index: &'a CrosswalkIndex,
    scorer: &'a MatchScorer,
    overrides: &'a OverrideTable,
}

impl<'a> EnrichmentPipeline<'a> {
    /// Fails when an override names a classification the index does not know.
    pub fn new(
        index: &'a CrosswalkIndex,
        scorer: &'a MatchScorer,
        overrides: &'a OverrideTable,
    ) -> Result<Self, LoadError> {
        overrides.validate(index)?;
        Ok(Self {
            index,
            scorer,
            overrides,
        })
    }

    pub fn resolver(&self) -> Resolver<'a> {
        Resolver::new(self.index, self.scorer)
    }

    /// Classification for one rate. Overrides are never scored.
    pub fn classify(&self, rate: &Rate) -> Classification {
        if let Some(target) = self.overrides.get(&rate.code) {
            return match target.resolve(rate, self.index) {
                Some(entry) => Classification::from_entry(entry, MatchConfidence::Manual),
                None => Classification {
                    level2_code: target.group.to_string(),
                    confidence: MatchConfidence::Manual,
                    ..Classification::default()
                },
            };
        }

        match self.resolver().resolve(rate) {
            Some(resolution) => {
                debug!(
                    rate = %rate.code,
                    level4_code = %resolution.entry.level4_code,
                    score = resolution.score.total_score,
                    confidence = ?resolution.score.confidence,
                    "resolved rate"
                );
                Classification::from_entry(resolution.entry, resolution.score.confidence.into())
            }
            None => {
                debug!(rate = %rate.code, hint = %rate.level2_hint, "no crosswalk match");
                Classification::unmatched(&rate.level2_hint)
            }
        }
    }

    /// Enrich one rate in place and record it in `stats`.
    pub fn enrich_rate(&self, rate: &mut Rate, stats: &mut EnrichmentStats) {
        if !rate.has_text() {
            warn!(rate = %rate.code, "rate has no name or description");
            stats.missing_text += 1;
        }
        let classification = self.classify(rate);
        stats.record(
            section_of(&classification.level2_code),
            classification.confidence,
        );
        rate.classification = classification;
    }

    /// Enrich rates in input order.
    pub fn enrich(&self, rates: &mut [Rate]) -> EnrichmentStats {
        let _span = info_span!("enrich", rates = rates.len()).entered();
        let started = Instant::now();
        let mut stats = EnrichmentStats::default();
        for rate in rates.iter_mut() {
            self.enrich_rate(rate, &mut stats);
        }
        log_summary(&stats, started);
        stats
    }

    /// Same result as [`Self::enrich`], computed on the rayon pool.
    pub fn enrich_parallel(&self, rates: &mut [Rate]) -> EnrichmentStats {
        let _span = info_span!("enrich", rates = rates.len(), parallel = true).entered();
        let started = Instant::now();
        let stats = rates
            .par_iter_mut()
            .fold(EnrichmentStats::default, |mut stats, rate| {
                self.enrich_rate(rate, &mut stats);
                stats
            })
            .reduce(EnrichmentStats::default, EnrichmentStats::merge);
        log_summary(&stats, started);
        stats
    }

    pub fn enrich_owned(&self, mut rates: Vec<Rate>) -> EnrichmentOutput {
        let stats = self.enrich(&mut rates);
        EnrichmentOutput { rates, stats }
    }
}

fn log_summary(stats: &EnrichmentStats, started: Instant) {
    info!(
        total = stats.total_rates(),
        high = stats.tiers.high,
        medium = stats.tiers.medium,
        low = stats.tiers.low,
        manual = stats.tiers.manual,
        no_match = stats.tiers.no_match,
        duration_ms = started.elapsed().as_millis() as u64,
        "enrichment finished"
    );
}

/// Enrich `rates` with the default scorer.
pub fn enrich(
    rates: Vec<Rate>,
    index: &CrosswalkIndex,
    overrides: &OverrideTable,
) -> Result<EnrichmentOutput, LoadError> {
    let scorer = MatchScorer::default();
    let pipeline = EnrichmentPipeline::new(index, &scorer, overrides)?;
    Ok(pipeline.enrich_owned(rates))
}

/// Enriched rates plus statistics, with review views.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentOutput {
    pub rates: Vec<Rate>,
    pub stats: EnrichmentStats,
}

impl EnrichmentOutput {
    pub fn with_confidence(&self, confidence: MatchConfidence) -> impl Iterator<Item = &Rate> {
        with_confidence(&self.rates, confidence)
    }

    pub fn low_confidence(&self) -> impl Iterator<Item = &Rate> {
        self.with_confidence(MatchConfidence::Low)
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &Rate> {
        self.with_confidence(MatchConfidence::Unmatched)
    }

    pub fn manual(&self) -> impl Iterator<Item = &Rate> {
        self.with_confidence(MatchConfidence::Manual)
    }

    /// Low and unmatched rates, in input order.
    pub fn needs_review(&self) -> impl Iterator<Item = &Rate> {
        needs_review(&self.rates)
    }
}

pub fn with_confidence(
    rates: &[Rate],
    confidence: MatchConfidence,
) -> impl Iterator<Item = &Rate> {
    rates
        .iter()
        .filter(move |rate| rate.confidence() == confidence)
}

pub fn needs_review(rates: &[Rate]) -> impl Iterator<Item = &Rate> {
    rates.iter().filter(|rate| rate.confidence().needs_review())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_counts_record_and_total() {
        let mut counts = TierCounts::default();
        for confidence in MatchConfidence::ALL {
            counts.record(confidence);
        }
        counts.record(MatchConfidence::High);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.scored(), 4);
        assert_eq!(counts.get(MatchConfidence::High), 2);
    }

    #[test]
    fn stats_merge_is_counter_addition() {
        let mut a = EnrichmentStats::default();
        a.record("5", MatchConfidence::High);
        a.record("0", MatchConfidence::Manual);
        let mut b = EnrichmentStats::default();
        b.record("5", MatchConfidence::Low);
        b.missing_text = 2;

        let ab = a.clone().merge(b.clone());
        let ba = b.merge(a);
        assert_eq!(ab, ba);
        assert_eq!(ab.total_rates(), 3);
        assert_eq!(ab.by_section["5"].scored(), 2);
        assert_eq!(ab.missing_text, 2);
    }

    #[test]
    fn share_is_relative_to_scored_rates() {
        let mut stats = EnrichmentStats::default();
        stats.record("5", MatchConfidence::High);
        stats.record("5", MatchConfidence::Low);
        stats.record("5", MatchConfidence::Unmatched);
        assert!((stats.share(MatchConfidence::High) - 50.0).abs() < 1e-9);
        assert_eq!(EnrichmentStats::default().share(MatchConfidence::High), 0.0);
    }
}
