//! Reference classification rows.

use serde::{Deserialize, Serialize};

/// Mapping from a level-4 code into the second classification scheme
/// (work sections). Stored on both crosswalk entries and enriched rates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSectionMapping {
    #[serde(rename = "nrm2_primary_ws", default)]
    pub primary: String,
    #[serde(rename = "nrm2_primary_ws_name", default)]
    pub primary_name: String,
    #[serde(rename = "nrm2_primary_items", default)]
    pub primary_items: String,
    /// Comma or semicolon separated list of related work sections.
    #[serde(rename = "nrm2_secondary_ws", default)]
    pub secondary: String,
}

impl WorkSectionMapping {
    /// All related codes: the primary work section first, then the secondary list.
    ///
    /// Blank entries are skipped and duplicates keep their first position.
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = Vec::new();
        let primary = self.primary.trim();
        let secondary = self
            .secondary
            .split([',', ';'])
            .map(str::trim)
            .filter(|code| !code.is_empty());
        for code in std::iter::once(primary).chain(secondary) {
            if !code.is_empty() && !codes.iter().any(|existing| existing == code) {
                codes.push(code.to_string());
            }
        }
        codes
    }

    pub fn is_empty(&self) -> bool {
        self.primary.trim().is_empty() && self.secondary.trim().is_empty()
    }
}

/// One reference classification row.
///
/// `level4_code` is unique across a crosswalk; `level2_code` groups
/// one or more level-4 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrosswalkEntry {
    pub level4_code: String,
    pub level3_code: String,
    pub level2_code: String,
    pub description: String,
    pub unit: String,
    #[serde(flatten)]
    pub work_sections: WorkSectionMapping,
    /// Comma separated seed keywords.
    #[serde(default)]
    pub matched_keywords: String,
    #[serde(default)]
    pub notes: String,
}

impl CrosswalkEntry {
    /// Related codes in the second classification scheme.
    pub fn secondary_mappings(&self) -> Vec<String> {
        self.work_sections.codes()
    }

    pub fn has_seed_keywords(&self) -> bool {
        !self.matched_keywords.trim().is_empty()
    }

    /// Seed keyword phrases, trimmed, blanks removed.
    pub fn seed_phrases(&self) -> impl Iterator<Item = &str> {
        self.matched_keywords
            .split(',')
            .map(str::trim)
            .filter(|phrase| !phrase.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_put_primary_first_and_dedupe() {
        let mapping = WorkSectionMapping {
            primary: "WS33".to_string(),
            primary_name: "Drainage above ground".to_string(),
            primary_items: "1-4".to_string(),
            secondary: "WS34; WS33, ,WS38".to_string(),
        };
        assert_eq!(mapping.codes(), vec!["WS33", "WS34", "WS38"]);
    }

    #[test]
    fn seed_phrases_skip_blanks() {
        let entry = CrosswalkEntry {
            matched_keywords: "hot water, , heater ".to_string(),
            ..CrosswalkEntry::default()
        };
        let phrases: Vec<&str> = entry.seed_phrases().collect();
        assert_eq!(phrases, vec!["hot water", "heater"]);
        assert!(entry.has_seed_keywords());
    }
}
