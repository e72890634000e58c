//! Markdown QA report for an enrichment run.
//!
//! The report is built from the pipeline's statistics and review views; it
//! never re-scores anything.
#![deny(unsafe_code)]

use std::fmt::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rates_map::{ConfidenceThresholds, EnrichmentStats};
use rates_model::{MatchConfidence, Rate};

/// Low-confidence rows listed before the table is cut short.
pub const MAX_LOW_CONFIDENCE_ROWS: usize = 50;

/// Matched descriptions are shortened to this many characters.
const DESCRIPTION_WIDTH: usize = 50;

/// A rate that needs a human look, with the catalog it came from.
#[derive(Debug, Clone, Copy)]
pub struct ReviewItem<'a> {
    pub file: &'a str,
    pub rate: &'a Rate,
}

/// QA report over one or more enriched catalogs.
#[derive(Debug, Clone)]
pub struct QaReport<'a> {
    generated: String,
    crosswalk_source: String,
    thresholds: ConfidenceThresholds,
    stats: &'a EnrichmentStats,
    files: usize,
    low_confidence: Vec<ReviewItem<'a>>,
    unmatched: Vec<ReviewItem<'a>>,
}

impl<'a> QaReport<'a> {
    pub fn new(
        generated: impl Into<String>,
        crosswalk_source: impl Into<String>,
        thresholds: ConfidenceThresholds,
        stats: &'a EnrichmentStats,
    ) -> Self {
        Self {
            generated: generated.into(),
            crosswalk_source: crosswalk_source.into(),
            thresholds,
            stats,
            files: 0,
            low_confidence: Vec::new(),
            unmatched: Vec::new(),
        }
    }

    /// Collect the review rows of one enriched catalog.
    pub fn add_catalog(&mut self, file: &'a str, rates: &'a [Rate]) {
        self.files += 1;
        for rate in rates {
            let item = ReviewItem { file, rate };
            match rate.confidence() {
                MatchConfidence::Low => self.low_confidence.push(item),
                MatchConfidence::Unmatched => self.unmatched.push(item),
                _ => {}
            }
        }
    }

    pub fn low_confidence(&self) -> &[ReviewItem<'a>] {
        &self.low_confidence
    }

    pub fn unmatched(&self) -> &[ReviewItem<'a>] {
        &self.unmatched
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create report directory {}", parent.display()))?;
        }
        std::fs::write(path, self.render())
            .with_context(|| format!("write QA report {}", path.display()))
    }

    fn render_into(&self, out: &mut impl Write) -> fmt::Result {
        let stats = self.stats;
        writeln!(out, "# Crosswalk Mapping QA Report")?;
        writeln!(out)?;
        writeln!(out, "**Generated**: {}", self.generated)?;
        writeln!(out)?;
        writeln!(out, "**Crosswalk Source**: `{}`", self.crosswalk_source)?;
        writeln!(out)?;

        writeln!(out, "## Summary Statistics")?;
        writeln!(out)?;
        writeln!(out, "- **Total Files Processed**: {}", self.files)?;
        writeln!(out, "- **Total Rates Processed**: {}", stats.total_rates())?;
        writeln!(out, "- **Rates Without Text**: {}", stats.missing_text)?;
        writeln!(out)?;

        self.render_tiers(out)?;
        self.render_sections(out)?;
        self.render_low_confidence(out)?;
        self.render_unmatched(out)
    }

    fn render_tiers(&self, out: &mut impl Write) -> fmt::Result {
        let stats = self.stats;
        let high = self.thresholds.high * 100.0;
        let medium = self.thresholds.medium * 100.0;
        writeln!(out, "## Mapping Confidence Breakdown")?;
        writeln!(out)?;
        writeln!(out, "| Confidence Level | Count | Percentage |")?;
        writeln!(out, "|------------------|-------|------------|")?;
        for (label, confidence) in [
            (format!("High (≥{high:.0}%)"), MatchConfidence::High),
            (
                format!("Medium ({medium:.0}-{high:.0}%)"),
                MatchConfidence::Medium,
            ),
            (format!("Low (<{medium:.0}%)"), MatchConfidence::Low),
        ] {
            writeln!(
                out,
                "| {label} | {} | {:.1}% |",
                stats.tiers.get(confidence),
                stats.share(confidence)
            )?;
        }
        writeln!(out, "| Manual | {} | - |", stats.tiers.manual)?;
        writeln!(out, "| No Match | {} | - |", stats.tiers.no_match)?;
        writeln!(out)
    }

    fn render_sections(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "## Statistics by Section")?;
        writeln!(out)?;
        writeln!(
            out,
            "| Section | Total | High | Medium | Low | Manual | No Match |"
        )?;
        writeln!(
            out,
            "|---------|-------|------|--------|-----|--------|----------|"
        )?;
        for (section, counts) in &self.stats.by_section {
            writeln!(
                out,
                "| {section} | {} | {} | {} | {} | {} | {} |",
                counts.total(),
                counts.high,
                counts.medium,
                counts.low,
                counts.manual,
                counts.no_match
            )?;
        }
        writeln!(out)
    }

    fn render_low_confidence(&self, out: &mut impl Write) -> fmt::Result {
        writeln!(out, "## Items Requiring Manual Review")?;
        writeln!(out)?;
        if self.low_confidence.is_empty() {
            return writeln!(out, "No low confidence items found.");
        }
        writeln!(
            out,
            "The following items have low confidence mappings and should be manually reviewed:"
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "**Total Low Confidence Items**: {}",
            self.low_confidence.len()
        )?;
        writeln!(out)?;
        writeln!(
            out,
            "| File | Code | Name | Unit | L2 Code | L4 Code | Matched Description |"
        )?;
        writeln!(
            out,
            "|------|------|------|------|---------|---------|---------------------|"
        )?;
        for item in self.low_confidence.iter().take(MAX_LOW_CONFIDENCE_ROWS) {
            let rate = item.rate;
            let classification = &rate.classification;
            writeln!(
                out,
                "| {} | {} | {} | {} | {} | {} | {} |",
                cell(item.file),
                cell(&rate.code),
                cell(&rate.name),
                cell(&rate.unit),
                cell(&classification.level2_code),
                cell(&classification.level4_code),
                cell(&shorten(&classification.matched_description))
            )?;
        }
        if self.low_confidence.len() > MAX_LOW_CONFIDENCE_ROWS {
            writeln!(out)?;
            writeln!(
                out,
                "*Showing first {MAX_LOW_CONFIDENCE_ROWS} of {} items*",
                self.low_confidence.len()
            )?;
        }
        Ok(())
    }

    fn render_unmatched(&self, out: &mut impl Write) -> fmt::Result {
        if self.unmatched.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "## Items With No Matches")?;
        writeln!(out)?;
        writeln!(out, "**Total No Match Items**: {}", self.unmatched.len())?;
        writeln!(out)?;
        writeln!(out, "| File | Code | Name | Unit | Original L2 Code |")?;
        writeln!(out, "|------|------|------|------|------------------|")?;
        for item in &self.unmatched {
            let rate = item.rate;
            writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(item.file),
                cell(&rate.code),
                cell(&rate.name),
                cell(&rate.unit),
                cell(&rate.level2_hint)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for QaReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render_into(f)
    }
}

fn shorten(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_WIDTH {
        return text.to_string();
    }
    let head: String = text.chars().take(DESCRIPTION_WIDTH).collect();
    format!("{head}...")
}

/// Table cell text: pipes escaped, line breaks flattened.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_descriptions_are_shortened() {
        let long = "x".repeat(60);
        assert_eq!(shorten(&long).chars().count(), DESCRIPTION_WIDTH + 3);
        assert_eq!(shorten("short"), "short");
    }

    #[test]
    fn cells_escape_pipes() {
        assert_eq!(cell("a|b\nc"), "a\\|b c");
    }
}
