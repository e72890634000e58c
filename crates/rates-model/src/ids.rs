#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Separator between the section and the rest of a level code (`5.4` -> section `5`).
pub const LEVEL_SEPARATOR: char = '.';

/// Placeholder section for rates that carry no classification hint at all.
pub const UNCLASSIFIED_SECTION: &str = "-";

/// A level-2 classification group key such as `5.4`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct GroupCode(String);

impl GroupCode {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidGroupCode(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Top-level section of this group (`5.4` -> `5`).
    pub fn section(&self) -> &str {
        section_of(&self.0)
    }

    /// True for textual ranges like `5.3-5.4` that cannot be used as a lookup key.
    pub fn is_range(&self) -> bool {
        is_range_hint(&self.0)
    }
}

impl TryFrom<String> for GroupCode {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GroupCode> for String {
    fn from(code: GroupCode) -> Self {
        code.0
    }
}

impl fmt::Display for GroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Section portion of any level code; blank codes map to [`UNCLASSIFIED_SECTION`].
pub fn section_of(code: &str) -> &str {
    let trimmed = code.trim();
    match trimmed.split(LEVEL_SEPARATOR).next() {
        Some(section) if !section.is_empty() => section,
        _ => UNCLASSIFIED_SECTION,
    }
}

pub fn is_range_hint(code: &str) -> bool {
    let trimmed = code.trim();
    let Some((start, end)) = trimmed.split_once('-') else {
        return false;
    };
    !start.trim().is_empty() && !end.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_code_rejects_blank() {
        assert!(GroupCode::new("   ").is_err());
        assert_eq!(GroupCode::new(" 5.4 ").unwrap().as_str(), "5.4");
    }

    #[test]
    fn section_is_text_before_first_dot() {
        assert_eq!(section_of("5.4"), "5");
        assert_eq!(section_of("0.1.1.1"), "0");
        assert_eq!(section_of("5.3-5.4"), "5");
        assert_eq!(section_of(""), UNCLASSIFIED_SECTION);
    }

    #[test]
    fn detects_range_hints() {
        assert!(GroupCode::new("5.3-5.4").unwrap().is_range());
        assert!(!GroupCode::new("5.4").unwrap().is_range());
        assert!(!is_range_hint("-5.4"));
    }
}
