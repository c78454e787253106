//! Rule trait for symbol-level lint rules.

use crate::cancel::Cancelled;
use crate::context::SymbolContext;
use crate::symbols::MethodSymbol;
use crate::types::{Severity, Violation};

/// A lint rule evaluated once per method symbol.
///
/// The host may call [`Rule::check_method`] from many threads at once, for
/// methods of the same or different documents, in any order.
///
/// # Example
///
/// ```ignore
/// use async_naming_core::{Cancelled, MethodSymbol, Rule, SymbolContext, Violation};
///
/// pub struct NoTodoNames;
///
/// impl Rule for NoTodoNames {
///     fn name(&self) -> &'static str { "no-todo-names" }
///     fn code(&self) -> &'static str { "NoTodoNames" }
///
///     fn check_method(
///         &self,
///         _ctx: &SymbolContext<'_>,
///         method: &MethodSymbol,
///     ) -> Result<Option<Violation>, Cancelled> {
///         Ok(None)
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "avoid-async-suffix").
    fn name(&self) -> &'static str;

    /// Returns the diagnostic identifier (e.g., "AvoidAsyncSuffix").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the default severity for violations from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Whether an allow directive for this rule must give a reason.
    ///
    /// By default, rules reporting errors require a reason.
    fn requires_allow_reason(&self) -> bool {
        self.default_severity() == Severity::Error
    }

    /// Evaluates one method symbol.
    ///
    /// Returns at most one violation. Indeterminate input resolves to
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the host cancelled the run.
    fn check_method(
        &self,
        ctx: &SymbolContext<'_>,
        method: &MethodSymbol,
    ) -> Result<Option<Violation>, Cancelled>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::generated::GeneratedCodeCache;
    use crate::types::Location;
    use std::path::PathBuf;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TestRule"
        }
        fn description(&self) -> &'static str {
            "A test rule"
        }

        fn check_method(
            &self,
            ctx: &SymbolContext<'_>,
            method: &MethodSymbol,
        ) -> Result<Option<Violation>, Cancelled> {
            ctx.cancel.check()?;
            Ok(Some(Violation::new(
                self.code(),
                self.name(),
                self.default_severity(),
                Location::new(PathBuf::from("test.rs"), 1, 1),
                format!("saw {}", method.name),
            )))
        }
    }

    #[test]
    fn test_rule_trait_defaults() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.code(), "TestRule");
        assert_eq!(rule.default_severity(), Severity::Warning);
        assert!(!rule.requires_allow_reason());
    }

    #[test]
    fn test_rule_sees_context() {
        let cache = GeneratedCodeCache::new();
        let cancel = CancellationToken::new();
        let ctx = SymbolContext::new(&cache, &cancel);

        let found = TestRule
            .check_method(&ctx, &MethodSymbol::new("run"))
            .unwrap()
            .unwrap();
        assert_eq!(found.message, "saw run");

        cancel.cancel();
        assert!(TestRule.check_method(&ctx, &MethodSymbol::new("run")).is_err());
    }
}
