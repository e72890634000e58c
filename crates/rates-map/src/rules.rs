//! Ordered `(pattern, label)` tables evaluated first-match-wins.

use regex::{Regex, RegexBuilder};

use crate::error::LoadError;

#[derive(Debug, Clone)]
struct Rule<L> {
    pattern: Regex,
    label: L,
}

/// Case-insensitive regex rules checked in insertion order.
#[derive(Debug, Clone)]
pub struct RuleTable<L> {
    rules: Vec<Rule<L>>,
}

impl<L> Default for RuleTable<L> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<L> RuleTable<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(pattern, label)` pairs, keeping their order.
    pub fn from_rules<P: AsRef<str>>(
        rules: impl IntoIterator<Item = (P, L)>,
    ) -> Result<Self, LoadError> {
        let mut table = Self::new();
        for (pattern, label) in rules {
            table.push(pattern.as_ref(), label)?;
        }
        Ok(table)
    }

    pub fn push(&mut self, pattern: &str, label: L) -> Result<(), LoadError> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| LoadError::InvalidRulePattern {
                pattern: pattern.to_string(),
                message: err.to_string(),
            })?;
        self.rules.push(Rule {
            pattern: compiled,
            label,
        });
        Ok(())
    }

    /// Label of the first rule whose pattern matches anywhere in `text`.
    pub fn classify(&self, text: &str) -> Option<&L> {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(text))
            .map(|rule| &rule.label)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &L> {
        self.rules.iter().map(|rule| &rule.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let table = RuleTable::from_rules([
            (r"\bplasterboard\b", "5.3"),
            (r"board", "5.5"),
            (r"paint", "5.6"),
        ])
        .unwrap();
        assert_eq!(table.classify("Plasterboard lining"), Some(&"5.3"));
        assert_eq!(table.classify("Skirting board"), Some(&"5.5"));
        assert_eq!(table.classify("Emulsion PAINT"), Some(&"5.6"));
        assert_eq!(table.classify("Carpet"), None);
    }

    #[test]
    fn invalid_pattern_is_a_load_error() {
        let err = RuleTable::from_rules([("(unclosed", 1)]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRulePattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}
