//! Composite rate records as they appear in the seed catalogs.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::crosswalk::{CrosswalkEntry, WorkSectionMapping};

/// Outcome of classifying a single rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchConfidence {
    High,
    Medium,
    Low,
    /// Assigned from a caller supplied override, never scored.
    Manual,
    /// No crosswalk candidate was available.
    #[default]
    #[serde(rename = "None")]
    Unmatched,
}

impl MatchConfidence {
    pub const ALL: [MatchConfidence; 5] = [
        MatchConfidence::High,
        MatchConfidence::Medium,
        MatchConfidence::Low,
        MatchConfidence::Manual,
        MatchConfidence::Unmatched,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Manual => "Manual",
            Self::Unmatched => "None",
        }
    }

    /// Parse a stored label (`"High"`, ..., `"None"`).
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|confidence| confidence.as_str() == label.trim())
    }

    /// Low and unmatched rates go to manual review.
    pub fn needs_review(self) -> bool {
        matches!(self, Self::Low | Self::Unmatched)
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification fields written by enrichment.
///
/// Work-section columns are spelled out rather than nested so the struct can
/// be flattened into a catalog record next to its pass-through fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "nrm1_l4_code", default, deserialize_with = "text_or_empty")]
    pub level4_code: String,
    #[serde(rename = "nrm1_l3_code", default, deserialize_with = "text_or_empty")]
    pub level3_code: String,
    #[serde(rename = "nrm1_l2_code", default, deserialize_with = "text_or_empty")]
    pub level2_code: String,
    #[serde(rename = "nrm1_description", default, deserialize_with = "text_or_empty")]
    pub matched_description: String,
    #[serde(rename = "nrm2_primary_ws", default, deserialize_with = "text_or_empty")]
    pub work_section: String,
    #[serde(rename = "nrm2_primary_ws_name", default, deserialize_with = "text_or_empty")]
    pub work_section_name: String,
    #[serde(rename = "nrm2_primary_items", default, deserialize_with = "text_or_empty")]
    pub work_section_items: String,
    #[serde(rename = "nrm2_secondary_ws", default, deserialize_with = "text_or_empty")]
    pub secondary_work_sections: String,
    #[serde(
        rename = "mapping_confidence",
        default,
        deserialize_with = "confidence_or_unmatched"
    )]
    pub confidence: MatchConfidence,
}

impl Classification {
    /// Classification copied from a crosswalk entry.
    pub fn from_entry(entry: &CrosswalkEntry, confidence: MatchConfidence) -> Self {
        let sections = &entry.work_sections;
        Self {
            level4_code: entry.level4_code.clone(),
            level3_code: entry.level3_code.clone(),
            level2_code: entry.level2_code.clone(),
            matched_description: entry.description.clone(),
            work_section: sections.primary.clone(),
            work_section_name: sections.primary_name.clone(),
            work_section_items: sections.primary_items.clone(),
            secondary_work_sections: sections.secondary.clone(),
            confidence,
        }
    }

    /// Fallback for rates without a match: only the original hint survives,
    /// as the group code.
    pub fn unmatched(hint: &str) -> Self {
        Self {
            level2_code: hint.trim().to_string(),
            confidence: MatchConfidence::Unmatched,
            ..Self::default()
        }
    }

    pub fn work_sections(&self) -> WorkSectionMapping {
        WorkSectionMapping {
            primary: self.work_section.clone(),
            primary_name: self.work_section_name.clone(),
            primary_items: self.work_section_items.clone(),
            secondary: self.secondary_work_sections.clone(),
        }
    }

    pub fn secondary_mappings(&self) -> Vec<String> {
        self.work_sections().codes()
    }
}

/// Cost build-up totals. Carried through enrichment untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostTotals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub materials_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waste_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nett_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ohp_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rate: Option<f64>,
}

/// A costed construction activity being classified.
///
/// Missing or `null` text fields deserialize as empty strings. Unknown catalog
/// fields (build-up lines, region, spec level, ...) are kept in `extra`
/// so a catalog can be written back without loss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rate {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub unit: String,
    /// Pre-existing coarse classification: empty, a group code, or a range like `5.3-5.4`.
    #[serde(rename = "nrm1_code", default, deserialize_with = "text_or_empty")]
    pub level2_hint: String,
    #[serde(flatten)]
    pub classification: Classification,
    #[serde(flatten)]
    pub costs: CostTotals,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rate {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        level2_hint: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            unit: unit.into(),
            level2_hint: level2_hint.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Name and description joined by a space, the text used for matching.
    pub fn match_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }

    /// False when both name and description are blank.
    pub fn has_text(&self) -> bool {
        !self.name.trim().is_empty() || !self.description.trim().is_empty()
    }

    pub fn confidence(&self) -> MatchConfidence {
        self.classification.confidence
    }
}

/// Text field that tolerates `null` and bare scalars. Numbers and booleans
/// keep their JSON spelling; anything else reads as empty.
fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

/// Unknown confidence labels read as unmatched; enrichment overwrites them.
fn confidence_or_unmatched<'de, D>(deserializer: D) -> Result<MatchConfidence, D::Error>
where
    D: Deserializer<'de>,
{
    let label = text_or_empty(deserializer)?;
    Ok(MatchConfidence::from_label(&label).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_serializes_unmatched_as_none() {
        let json = serde_json::to_string(&MatchConfidence::Unmatched).unwrap();
        assert_eq!(json, "\"None\"");
        let back: MatchConfidence = serde_json::from_str("\"Manual\"").unwrap();
        assert_eq!(back, MatchConfidence::Manual);
    }

    #[test]
    fn null_and_scalar_text_fields_are_tolerated() {
        let json = r#"{
            "code": 1042,
            "name": null,
            "description": null,
            "unit": "m2",
            "nrm1_code": null,
            "nrm1_l4_code": null,
            "mapping_confidence": "Probably"
        }"#;
        let rate: Rate = serde_json::from_str(json).unwrap();
        assert_eq!(rate.code, "1042");
        assert!(rate.name.is_empty());
        assert!(rate.description.is_empty());
        assert!(rate.level2_hint.is_empty());
        assert!(rate.classification.level4_code.is_empty());
        assert_eq!(rate.confidence(), MatchConfidence::Unmatched);
        assert!(!rate.has_text());
    }

    #[test]
    fn confidence_labels_parse() {
        for confidence in MatchConfidence::ALL {
            assert_eq!(MatchConfidence::from_label(confidence.as_str()), Some(confidence));
        }
        assert_eq!(MatchConfidence::from_label("none"), None);
    }

    #[test]
    fn unmatched_keeps_hint_as_group() {
        let classification = Classification::unmatched(" 5.3-5.4 ");
        assert_eq!(classification.level2_code, "5.3-5.4");
        assert!(classification.level4_code.is_empty());
        assert_eq!(classification.confidence, MatchConfidence::Unmatched);
    }

    #[test]
    fn from_entry_copies_work_sections() {
        let entry = CrosswalkEntry {
            level4_code: "5.4.1.1".to_string(),
            level3_code: "5.4.1".to_string(),
            level2_code: "5.4".to_string(),
            description: "Hot water system installation".to_string(),
            unit: "nr".to_string(),
            work_sections: WorkSectionMapping {
                primary: "WS33".to_string(),
                secondary: "WS34".to_string(),
                ..WorkSectionMapping::default()
            },
            ..CrosswalkEntry::default()
        };
        let classification = Classification::from_entry(&entry, MatchConfidence::High);
        assert_eq!(classification.level4_code, "5.4.1.1");
        assert_eq!(classification.secondary_mappings(), vec!["WS33", "WS34"]);
    }

    #[test]
    fn rate_without_text_is_flagged() {
        let rate = Rate::new("X-1", "  ", "nr", "5.4");
        assert!(!rate.has_text());
        assert!(rate.with_description("Boiler").has_text());
    }
}
