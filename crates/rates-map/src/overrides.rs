//! Caller supplied forced classifications, keyed by rate code.

use std::collections::BTreeMap;
use std::collections::btree_map;

use rates_model::{CrosswalkEntry, GroupCode, Rate};
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::index::CrosswalkIndex;
use crate::text::{extract_keywords, seed_keywords};

/// Where an overridden rate should land.
///
/// When `level4_code` is absent or unknown, the entry is picked from the
/// group's candidates by keyword overlap with the rate text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideTarget {
    pub group: GroupCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level4_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OverrideTarget {
    pub fn group(group: GroupCode) -> Self {
        Self {
            group,
            level4_code: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_level4(mut self, level4_code: impl Into<String>) -> Self {
        self.level4_code = Some(level4_code.into());
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    fn describe(&self) -> String {
        match &self.level4_code {
            Some(level4) => format!("{} / {}", self.group, level4),
            None => self.group.to_string(),
        }
    }

    /// Entry this target resolves to for `rate`.
    pub fn resolve<'a>(&self, rate: &Rate, index: &'a CrosswalkIndex) -> Option<&'a CrosswalkEntry> {
        if let Some(entry) = self
            .level4_code
            .as_deref()
            .and_then(|level4| index.entry(level4))
        {
            return Some(entry);
        }
        best_keyword_candidate(rate, index.lookup(self.group.as_str()))
    }
}

/// Candidate sharing the most keywords with the rate text; the first
/// candidate when nothing overlaps.
fn best_keyword_candidate<'a>(
    rate: &Rate,
    candidates: &'a [CrosswalkEntry],
) -> Option<&'a CrosswalkEntry> {
    let first = candidates.first()?;
    let rate_keywords = extract_keywords(&rate.match_text());
    let mut best = (0usize, first);
    for candidate in candidates {
        let mut keywords = extract_keywords(&candidate.description);
        keywords.extend(seed_keywords(candidate));
        let shared = keywords.intersection(&rate_keywords).count();
        if shared > best.0 {
            best = (shared, candidate);
        }
    }
    Some(best.1)
}

/// Rate code to override target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    targets: BTreeMap<String, OverrideTarget>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the target for a rate code.
    pub fn insert(&mut self, rate_code: impl Into<String>, target: OverrideTarget) {
        self.targets.insert(rate_code.into().trim().to_string(), target);
    }

    pub fn get(&self, rate_code: &str) -> Option<&OverrideTarget> {
        self.targets.get(rate_code.trim())
    }

    pub fn contains(&self, rate_code: &str) -> bool {
        self.targets.contains_key(rate_code.trim())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OverrideTarget> {
        self.targets.iter()
    }

    /// Add entries from `other` for codes not already present.
    pub fn extend_missing(&mut self, other: OverrideTable) {
        for (code, target) in other.targets {
            self.targets.entry(code).or_insert(target);
        }
    }

    /// Every target must name a known level-4 code or a group present in the
    /// index. A known level-4 code must belong to the target's group.
    pub fn validate(&self, index: &CrosswalkIndex) -> Result<(), LoadError> {
        for (code, target) in &self.targets {
            let known_entry = target
                .level4_code
                .as_deref()
                .and_then(|level4| index.entry(level4));
            if let Some(entry) = known_entry
                && entry.level2_code.trim() != target.group.as_str()
            {
                return Err(LoadError::MismatchedOverrideTarget {
                    rate_code: code.clone(),
                    level4_code: entry.level4_code.clone(),
                    group: target.group.to_string(),
                    entry_group: entry.level2_code.clone(),
                });
            }
            if known_entry.is_none() && !index.contains_group(target.group.as_str()) {
                return Err(LoadError::UnknownOverrideTarget {
                    rate_code: code.clone(),
                    target: target.describe(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, OverrideTarget)> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = (String, OverrideTarget)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (code, target) in iter {
            table.insert(code, target);
        }
        table
    }
}

impl<'a> IntoIterator for &'a OverrideTable {
    type Item = (&'a String, &'a OverrideTarget);
    type IntoIter = btree_map::Iter<'a, String, OverrideTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
