//! Override and hint-route tables from TOML.
//!
//! ```toml
//! [[override]]
//! code = "GRP0-DEM-004"
//! group = "0.2"
//! level4_code = "0.2.1.1"
//! reason = "Demolition of entire buildings"
//!
//! [[route]]
//! hint = "5.5-5.7"
//! fallback = "5.6"
//! rules = [
//!     { pattern = "exhaust|\\bfan\\b|ventilation", group = "5.7" },
//!     { pattern = "split system|air con", group = "5.6" },
//! ]
//! ```

use std::path::Path;

use rates_map::{HintRoute, HintRouter, OverrideTable, OverrideTarget, RouteRule};
use rates_model::GroupCode;
use serde::Deserialize;
use tracing::info;

use crate::error::{IngestError, Result};

#[derive(Debug, Deserialize)]
struct OverrideRow {
    code: String,
    group: GroupCode,
    #[serde(default)]
    level4_code: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    hint: String,
    #[serde(default)]
    fallback: Option<GroupCode>,
    #[serde(default)]
    rules: Vec<RouteRule>,
}

#[derive(Debug, Default, Deserialize)]
struct OverridesFile {
    #[serde(default, rename = "override")]
    overrides: Vec<OverrideRow>,
    #[serde(default, rename = "route")]
    routes: Vec<RouteRow>,
}

/// Explicit per-code overrides plus hint routes.
#[derive(Debug, Clone, Default)]
pub struct OverrideConfig {
    pub overrides: OverrideTable,
    pub router: HintRouter,
}

/// Parse override TOML. `origin` names the source in errors.
pub fn parse_overrides(content: &str, origin: &Path) -> Result<OverrideConfig> {
    let file: OverridesFile = toml::from_str(content).map_err(|e| IngestError::Toml {
        path: origin.to_path_buf(),
        source: e,
    })?;

    let mut overrides = OverrideTable::new();
    for row in file.overrides {
        let mut target = OverrideTarget::group(row.group);
        target.level4_code = row.level4_code;
        target.reason = row.reason;
        overrides.insert(row.code, target);
    }

    let routes = file
        .routes
        .into_iter()
        .map(|row| HintRoute::new(row.hint, &row.rules, row.fallback))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(OverrideConfig {
        overrides,
        router: HintRouter::new(routes),
    })
}

pub fn load_overrides(path: &Path) -> Result<OverrideConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let config = parse_overrides(&content, path)?;
    info!(
        path = %path.display(),
        overrides = config.overrides.len(),
        routes = config.router.routes().len(),
        "loaded override table"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides_and_routes() {
        let content = r#"
[[override]]
code = "GRP0-DEM-004"
group = "0.2"
level4_code = "0.2.1.1"
reason = "Demolition of entire buildings"

[[override]]
code = "GRP0-DEW-014"
group = "0.4"

[[route]]
hint = "5.5-5.7"
fallback = "5.6"
rules = [
    { pattern = "exhaust|\\bfan\\b", group = "5.7" },
]
"#;
        let config = parse_overrides(content, Path::new("overrides.toml")).unwrap();
        assert_eq!(config.overrides.len(), 2);
        let demolition = config.overrides.get("GRP0-DEM-004").unwrap();
        assert_eq!(demolition.level4_code.as_deref(), Some("0.2.1.1"));
        assert!(config.overrides.get("GRP0-DEW-014").unwrap().level4_code.is_none());

        let route = &config.router.routes()[0];
        assert_eq!(route.hint(), "5.5-5.7");
        assert_eq!(route.route("Bathroom exhaust fan").unwrap().as_str(), "5.7");
        assert_eq!(route.route("Boiler").unwrap().as_str(), "5.6");
    }

    #[test]
    fn blank_group_is_rejected() {
        let content = "[[override]]\ncode = \"X\"\ngroup = \"  \"\n";
        let err = parse_overrides(content, Path::new("o.toml")).unwrap_err();
        assert!(matches!(err, IngestError::Toml { .. }));
    }

    #[test]
    fn bad_route_pattern_is_a_load_error() {
        let content = "[[route]]\nhint = \"5.3-5.4\"\nrules = [{ pattern = \"(water\", group = \"5.4\" }]\n";
        let err = parse_overrides(content, Path::new("o.toml")).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Load(rates_map::LoadError::InvalidRulePattern { .. })
        ));
    }

    #[test]
    fn empty_file_is_empty_config() {
        let config = parse_overrides("", Path::new("o.toml")).unwrap();
        assert!(config.overrides.is_empty());
        assert!(config.router.is_empty());
    }
}
