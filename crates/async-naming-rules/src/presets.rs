//! Rule sets assembled from built-in rules.

use crate::avoid_async_suffix::{self, AvoidAsyncSuffix};
use async_naming_core::{Config, RuleBox};

/// Returns all available rules with default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    vec![Box::new(AvoidAsyncSuffix::new())]
}

/// Returns all available rules, configured from their `[rules.*]` sections.
///
/// Disabled rules are still returned; the analyzer skips them.
#[must_use]
pub fn rules_from_config(config: &Config) -> Vec<RuleBox> {
    let avoid_async_suffix = config
        .rule(avoid_async_suffix::NAME)
        .map_or_else(AvoidAsyncSuffix::new, AvoidAsyncSuffix::from_config);

    vec![Box::new(avoid_async_suffix)]
}
