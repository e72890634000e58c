//! Crosswalk index grouped by level-2 code.

use std::collections::BTreeMap;

use rates_model::CrosswalkEntry;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::LoadError;

/// What to do when two crosswalk rows share a level-4 code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the load.
    #[default]
    Reject,
    /// Keep the later row, logging a warning.
    LastWriteWins,
}

/// Read-only crosswalk grouped by level-2 code, insertion order kept within a group.
#[derive(Debug, Clone, Default)]
pub struct CrosswalkIndex {
    groups: BTreeMap<String, Vec<CrosswalkEntry>>,
    /// level-4 code -> owning group key
    level4_groups: BTreeMap<String, String>,
}

impl CrosswalkIndex {
    /// Build an index, rejecting duplicate level-4 codes.
    pub fn build(entries: Vec<CrosswalkEntry>) -> Result<Self, LoadError> {
        Self::build_with(entries, DuplicatePolicy::Reject)
    }

    pub fn build_with(
        entries: Vec<CrosswalkEntry>,
        policy: DuplicatePolicy,
    ) -> Result<Self, LoadError> {
        if entries.is_empty() {
            return Err(LoadError::EmptyCrosswalk);
        }
        let mut index = Self::default();
        for entry in entries {
            index.insert(entry, policy)?;
        }
        Ok(index)
    }

    fn insert(&mut self, entry: CrosswalkEntry, policy: DuplicatePolicy) -> Result<(), LoadError> {
        let group_key = entry.level2_code.trim().to_string();
        let level4 = entry.level4_code.trim().to_string();

        if let Some(previous_group) = self.level4_groups.get(&level4).cloned() {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(LoadError::DuplicateLevel4Code {
                        code: level4,
                        first_group: previous_group,
                        second_group: group_key,
                    });
                }
                DuplicatePolicy::LastWriteWins => {
                    warn!(
                        level4_code = %level4,
                        first_group = %previous_group,
                        second_group = %group_key,
                        "duplicate level-4 code, keeping the later row"
                    );
                    if previous_group == group_key {
                        if let Some(slot) = self
                            .groups
                            .get_mut(&group_key)
                            .and_then(|entries| {
                                entries.iter_mut().find(|e| e.level4_code.trim() == level4)
                            })
                        {
                            *slot = entry;
                        }
                        return Ok(());
                    }
                    self.remove_from_group(&previous_group, &level4);
                }
            }
        }

        self.level4_groups.insert(level4, group_key.clone());
        self.groups.entry(group_key).or_default().push(entry);
        Ok(())
    }

    fn remove_from_group(&mut self, group_key: &str, level4: &str) {
        let now_empty = match self.groups.get_mut(group_key) {
            Some(entries) => {
                entries.retain(|e| e.level4_code.trim() != level4);
                entries.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.groups.remove(group_key);
        }
    }

    /// Entries of a group in crosswalk order; empty when the group is unknown.
    pub fn lookup(&self, group_key: &str) -> &[CrosswalkEntry] {
        self.groups
            .get(group_key.trim())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains_group(&self, group_key: &str) -> bool {
        self.groups.contains_key(group_key.trim())
    }

    /// Find an entry by its level-4 code.
    pub fn entry(&self, level4_code: &str) -> Option<&CrosswalkEntry> {
        let level4 = level4_code.trim();
        let group = self.level4_groups.get(level4)?;
        self.lookup(group)
            .iter()
            .find(|entry| entry.level4_code.trim() == level4)
    }

    /// Group keys with their entry counts, in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[CrosswalkEntry])> {
        self.groups
            .iter()
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.level4_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.level4_groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level4: &str, level2: &str, description: &str) -> CrosswalkEntry {
        CrosswalkEntry {
            level4_code: level4.to_string(),
            level2_code: level2.to_string(),
            description: description.to_string(),
            ..CrosswalkEntry::default()
        }
    }

    #[test]
    fn groups_keep_insertion_order() {
        let index = CrosswalkIndex::build(vec![
            entry("5.4.1.2", "5.4", "Cold water"),
            entry("5.6.1.1", "5.6", "Heating"),
            entry("5.4.1.1", "5.4", "Hot water"),
        ])
        .unwrap();
        let codes: Vec<&str> = index
            .lookup("5.4")
            .iter()
            .map(|e| e.level4_code.as_str())
            .collect();
        assert_eq!(codes, vec!["5.4.1.2", "5.4.1.1"]);
        assert_eq!(index.group_count(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn unknown_group_is_empty_not_error() {
        let index = CrosswalkIndex::build(vec![entry("5.4.1.1", "5.4", "Hot water")]).unwrap();
        assert!(index.lookup("9.9").is_empty());
        assert!(index.lookup("").is_empty());
    }

    #[test]
    fn empty_crosswalk_is_rejected() {
        assert_eq!(
            CrosswalkIndex::build(Vec::new()).unwrap_err(),
            LoadError::EmptyCrosswalk
        );
    }

    #[test]
    fn duplicate_level4_is_rejected_by_default() {
        let err = CrosswalkIndex::build(vec![
            entry("5.4.1.1", "5.4", "Hot water"),
            entry("5.4.1.1", "5.4", "Hot water again"),
        ])
        .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateLevel4Code { ref code, .. } if code == "5.4.1.1"));
    }

    #[test]
    fn last_write_wins_replaces_in_place() {
        let index = CrosswalkIndex::build_with(
            vec![
                entry("5.4.1.1", "5.4", "Hot water"),
                entry("5.4.1.2", "5.4", "Cold water"),
                entry("5.4.1.1", "5.4", "Hot water revised"),
            ],
            DuplicatePolicy::LastWriteWins,
        )
        .unwrap();
        let group = index.lookup("5.4");
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].description, "Hot water revised");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn last_write_wins_moves_between_groups() {
        let index = CrosswalkIndex::build_with(
            vec![
                entry("5.4.1.1", "5.4", "Hot water"),
                entry("5.4.1.1", "5.6", "Moved"),
            ],
            DuplicatePolicy::LastWriteWins,
        )
        .unwrap();
        assert!(!index.contains_group("5.4"));
        assert_eq!(index.entry("5.4.1.1").unwrap().description, "Moved");
    }
}
