//! Routing of malformed hints (`5.3-5.4`, blank) to a concrete group.
//!
//! A route turns every rate carrying its hint into a manual override,
//! choosing the group from the rate name with an ordered rule table.

use rates_model::{GroupCode, Rate, is_range_hint};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::overrides::{OverrideTable, OverrideTarget};
use crate::rules::RuleTable;

/// One `pattern -> group` line of a route, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub pattern: String,
    pub group: GroupCode,
}

/// Rules for one malformed hint value.
#[derive(Debug, Clone)]
pub struct HintRoute {
    hint: String,
    rules: RuleTable<GroupCode>,
    fallback: Option<GroupCode>,
}

impl HintRoute {
    pub fn new(
        hint: impl Into<String>,
        rules: &[RouteRule],
        fallback: Option<GroupCode>,
    ) -> Result<Self, LoadError> {
        let rules = RuleTable::from_rules(
            rules
                .iter()
                .map(|rule| (rule.pattern.as_str(), rule.group.clone())),
        )?;
        Ok(Self {
            hint: hint.into().trim().to_string(),
            rules,
            fallback,
        })
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn matches(&self, rate: &Rate) -> bool {
        rate.level2_hint.trim() == self.hint
    }

    /// Group for a rate name: first matching rule, else the fallback.
    pub fn route(&self, name: &str) -> Option<&GroupCode> {
        self.rules.classify(name).or(self.fallback.as_ref())
    }
}

/// Ordered set of hint routes.
#[derive(Debug, Clone, Default)]
pub struct HintRouter {
    routes: Vec<HintRoute>,
}

impl HintRouter {
    pub fn new(routes: Vec<HintRoute>) -> Self {
        Self { routes }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn routes(&self) -> &[HintRoute] {
        &self.routes
    }

    /// Add routed overrides to `table` for rates it does not already cover.
    ///
    /// Returns the number of rates routed. Range hints left without a route
    /// are logged; they fall through to the no-match tier.
    pub fn route_into(&self, rates: &[Rate], table: &mut OverrideTable) -> usize {
        let mut routed = 0;
        for rate in rates {
            if table.contains(&rate.code) {
                continue;
            }
            let hint = rate.level2_hint.trim();
            let Some(route) = self.routes.iter().find(|route| route.matches(rate)) else {
                if is_range_hint(hint) {
                    warn!(rate = %rate.code, hint, "no route for range hint");
                }
                continue;
            };
            match route.route(&rate.name) {
                Some(group) => {
                    debug!(rate = %rate.code, hint, group = %group, "routed hint");
                    table.insert(
                        rate.code.clone(),
                        OverrideTarget::group(group.clone())
                            .with_reason(format!("routed from hint {hint}")),
                    );
                    routed += 1;
                }
                None => warn!(rate = %rate.code, hint, "hint route has no matching rule"),
            }
        }
        routed
    }
}
