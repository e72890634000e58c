//! Best-match resolution of one rate against its crosswalk group.

use rates_model::{CrosswalkEntry, Rate};

use crate::index::CrosswalkIndex;
use crate::score::{MatchScore, MatchScorer, PreparedRate};

/// Winning candidate for a rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub entry: &'a CrosswalkEntry,
    pub score: MatchScore,
}

/// Read-only resolver over an index; safe to share between threads.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a CrosswalkIndex,
    scorer: &'a MatchScorer,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a CrosswalkIndex, scorer: &'a MatchScorer) -> Self {
        Self { index, scorer }
    }

    /// Candidate entries for a rate: the group named by its hint, or nothing.
    pub fn candidates(&self, rate: &Rate) -> &'a [CrosswalkEntry] {
        let hint = rate.level2_hint.trim();
        if hint.is_empty() {
            return &[];
        }
        self.index.lookup(hint)
    }

    /// Highest scoring candidate. Ties keep the earliest entry in crosswalk order.
    pub fn resolve(&self, rate: &Rate) -> Option<Resolution<'a>> {
        let candidates = self.candidates(rate);
        if candidates.is_empty() {
            return None;
        }

        let prepared = PreparedRate::new(rate);
        let mut best: Option<Resolution<'a>> = None;
        for entry in candidates {
            let score = self.scorer.score_prepared(&prepared, entry);
            let replace = match &best {
                Some(current) => score.total_score > current.score.total_score,
                None => true,
            };
            if replace {
                best = Some(Resolution { entry, score });
            }
        }
        best
    }

    /// Every candidate scored, best first. Equal scores stay in crosswalk order.
    pub fn rank(&self, rate: &Rate) -> Vec<Resolution<'a>> {
        let prepared = PreparedRate::new(rate);
        let mut ranked: Vec<Resolution<'a>> = self
            .candidates(rate)
            .iter()
            .map(|entry| Resolution {
                entry,
                score: self.scorer.score_prepared(&prepared, entry),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_score.total_cmp(&a.score.total_score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level4: &str, description: &str, unit: &str) -> CrosswalkEntry {
        CrosswalkEntry {
            level4_code: level4.to_string(),
            level2_code: "5.4".to_string(),
            description: description.to_string(),
            unit: unit.to_string(),
            ..CrosswalkEntry::default()
        }
    }

    fn index() -> CrosswalkIndex {
        CrosswalkIndex::build(vec![
            entry("5.4.1.1", "Cold water distribution", "m"),
            entry("5.4.2.1", "Hot water system installation", "nr"),
        ])
        .unwrap()
    }

    #[test]
    fn picks_highest_total() {
        let index = index();
        let scorer = MatchScorer::default();
        let rate = Rate::new("R1", "Hot water system", "nr", "5.4");
        let resolution = Resolver::new(&index, &scorer).resolve(&rate).unwrap();
        assert_eq!(resolution.entry.level4_code, "5.4.2.1");
    }

    #[test]
    fn blank_or_unknown_hint_has_no_candidates() {
        let index = index();
        let scorer = MatchScorer::default();
        let resolver = Resolver::new(&index, &scorer);
        assert!(resolver.resolve(&Rate::new("R1", "Hot water", "nr", "")).is_none());
        assert!(resolver.resolve(&Rate::new("R2", "Hot water", "nr", "5.3-5.4")).is_none());
    }

    #[test]
    fn rank_orders_best_first() {
        let index = index();
        let scorer = MatchScorer::default();
        let rate = Rate::new("R1", "Hot water system", "nr", "5.4");
        let ranked = Resolver::new(&index, &scorer).rank(&rate);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.level4_code, "5.4.2.1");
        assert!(ranked[0].score.total_score >= ranked[1].score.total_score);
    }
}
