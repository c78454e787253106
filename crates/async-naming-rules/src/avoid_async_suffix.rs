//! Rule to flag synchronous methods named with an `Async` suffix.
//!
//! # Rationale
//!
//! The `Async` suffix tells callers that a call returns control before the
//! work completes. A method carrying the suffix without being `async` and
//! without returning a future misleads every caller.
//!
//! # Detected Patterns
//!
//! ```ignore
//! fn loadAsync() -> Config { ... }   // synchronous, no handle returned
//! fn saveAsync(&self) { ... }
//! ```
//!
//! # Good Patterns
//!
//! ```ignore
//! async fn loadAsync() -> Config { ... }
//!
//! // Forwards the handle of another asynchronous call.
//! fn loadAsync() -> impl Future<Output = Config> { inner.load() }
//!
//! fn load() -> Config { ... }
//! ```
//!
//! Methods in generated documents are never reported.

use async_naming_core::{
    Cancelled, MethodSymbol, ReturnType, Rule, RuleConfig, Severity, Suggestion, SymbolContext,
    SymbolLocation, TypeRef, Violation,
};
use tracing::{trace, warn};

/// Rule code for avoid-async-suffix.
pub const CODE: &str = "AvoidAsyncSuffix";

/// Rule name for avoid-async-suffix.
pub const NAME: &str = "avoid-async-suffix";

/// Suffix checked by default.
pub const DEFAULT_SUFFIX: &str = "Async";

/// Flags non-async methods whose name ends with the async suffix.
#[derive(Debug, Clone)]
pub struct AvoidAsyncSuffix {
    suffix: String,
    handle_types: Vec<TypeRef>,
    severity: Severity,
}

impl Default for AvoidAsyncSuffix {
    fn default() -> Self {
        Self::new()
    }
}

impl AvoidAsyncSuffix {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            handle_types: vec![TypeRef::new("Future", "std::future")],
            severity: Severity::Warning,
        }
    }

    /// Creates the rule from its `[rules.avoid-async-suffix]` section.
    ///
    /// An empty suffix and unparsable handle types are ignored with a
    /// warning.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut rule = Self::new();

        if let Some(suffix) = config.get_str("suffix") {
            if suffix.is_empty() {
                warn!("Ignoring empty suffix for {}", NAME);
            } else {
                rule.suffix = suffix.to_string();
            }
        }

        if let Some(paths) = config.get_str_array("handle_types") {
            rule.handle_types = paths
                .iter()
                .filter_map(|path| {
                    let parsed = TypeRef::parse(path);
                    if parsed.is_none() {
                        warn!("Ignoring invalid handle type {:?} for {}", path, NAME);
                    }
                    parsed
                })
                .collect();
        }

        if let Some(severity) = config.severity {
            rule.severity = severity;
        }

        rule
    }

    /// Sets the suffix that marks a method as asynchronous.
    #[must_use]
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Adds a return type that counts as an asynchronous handle.
    #[must_use]
    pub fn handle_type(mut self, handle: TypeRef) -> Self {
        self.handle_types.push(handle);
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Returns the suffix being checked.
    #[must_use]
    pub fn checked_suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the return types treated as asynchronous handles.
    #[must_use]
    pub fn handle_types(&self) -> &[TypeRef] {
        &self.handle_types
    }

    fn returns_handle(&self, return_type: &ReturnType) -> bool {
        match return_type {
            ReturnType::Named(ty) => self.handle_types.contains(ty),
            ReturnType::Void | ReturnType::Other(_) => false,
        }
    }
}

impl Rule for AvoidAsyncSuffix {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Forbids the Async suffix on methods that are neither async nor return a future"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn check_method(
        &self,
        ctx: &SymbolContext<'_>,
        method: &MethodSymbol,
    ) -> Result<Option<Violation>, Cancelled> {
        if method.is_async || !method.name.ends_with(self.suffix.as_str()) {
            return Ok(None);
        }

        let (document, location) = match method.primary_location() {
            Some(SymbolLocation::Source { document, location }) => (document, location),
            Some(SymbolLocation::External { .. }) | None => return Ok(None),
        };

        if ctx.generated.is_generated(document.as_ref(), ctx.cancel)? {
            trace!(method = %method.name, "Skipping method in generated document");
            return Ok(None);
        }

        if self.returns_handle(&method.return_type) {
            return Ok(None);
        }

        let stem = &method.name[..method.name.len() - self.suffix.len()];
        let suggestion = if stem.is_empty() {
            format!("Make `{}` async or return a future", method.name)
        } else {
            format!("Rename to `{stem}` or make `{}` async", method.name)
        };

        Ok(Some(
            Violation::new(
                CODE,
                NAME,
                self.severity,
                location.clone(),
                format!(
                    "Method `{}` ends with `{}` but is not async",
                    method.name, self.suffix
                ),
            )
            .with_suggestion(Suggestion::new(suggestion)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_naming_core::{
        collect_methods, CancellationToken, Config, DocumentRef, GeneratedCodeCache, Location,
        RustDocument,
    };
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    fn document(path: &str, content: &str) -> DocumentRef {
        Arc::new(RustDocument::new(path, content, Path::new(".")))
    }

    fn method_in(name: &str, doc: &DocumentRef) -> MethodSymbol {
        MethodSymbol::new(name).located_at(SymbolLocation::Source {
            document: Some(Arc::clone(doc)),
            location: Location::new(PathBuf::from("src/worker.rs"), 3, 8),
        })
    }

    fn check(rule: &AvoidAsyncSuffix, method: &MethodSymbol) -> Option<Violation> {
        let cache = GeneratedCodeCache::new();
        let cancel = CancellationToken::new();
        rule.check_method(&SymbolContext::new(&cache, &cancel), method).unwrap()
    }

    fn check_source(source: &str) -> Vec<Violation> {
        let doc = Arc::new(RustDocument::new("src/lib.rs", source, Path::new(".")));
        let ast = doc.parse().unwrap();
        let cache = GeneratedCodeCache::new();
        let cancel = CancellationToken::new();
        let ctx = SymbolContext::new(&cache, &cancel);
        let rule = AvoidAsyncSuffix::new();
        collect_methods(&doc, &ast)
            .iter()
            .filter_map(|m| rule.check_method(&ctx, m).unwrap())
            .collect()
    }

    fn handwritten() -> DocumentRef {
        document("src/worker.rs", "pub struct Worker;\n")
    }

    #[test]
    fn test_void_method_with_suffix() {
        let doc = handwritten();
        let violation = check(&AvoidAsyncSuffix::new(), &method_in("DoWorkAsync", &doc))
            .expect("should report");

        assert_eq!(violation.code, CODE);
        assert_eq!(violation.rule, NAME);
        assert_eq!(violation.severity, Severity::Warning);
        assert!(violation.message.contains("DoWorkAsync"));
        assert_eq!(violation.location.line, 3);
    }

    #[test]
    fn test_unrelated_return_type() {
        let doc = handwritten();
        let method = method_in("DoWorkAsync", &doc)
            .returning(ReturnType::Named(TypeRef::new("Widget", "app::ui")));
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_some());
    }

    #[test]
    fn test_async_method_exempt() {
        let doc = handwritten();
        let method = method_in("DoWorkAsync", &doc).asynchronous(true);
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_none());
    }

    #[test]
    fn test_no_suffix() {
        let doc = handwritten();
        assert!(check(&AvoidAsyncSuffix::new(), &method_in("DoWork", &doc)).is_none());
        assert!(check(&AvoidAsyncSuffix::new(), &method_in("DoWorkasync", &doc)).is_none());
    }

    #[test]
    fn test_future_return_exempt() {
        let doc = handwritten();
        let method = method_in("DoWorkAsync", &doc)
            .returning(ReturnType::Named(TypeRef::new("Future", "std::future")));
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_none());
    }

    #[test]
    fn test_same_name_other_namespace_reported() {
        let doc = handwritten();
        let method = method_in("DoWorkAsync", &doc)
            .returning(ReturnType::Named(TypeRef::new("Future", "my::future")));
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_some());
    }

    #[test]
    fn test_generated_documents_skipped() {
        let by_name = document("src/Service.rs", "pub struct Worker;\n");
        assert!(check(&AvoidAsyncSuffix::new(), &method_in("DoWorkAsync", &by_name)).is_none());

        let by_marker = document("src/worker.rs", "// <auto-generated />\npub struct Worker;\n");
        assert!(check(&AvoidAsyncSuffix::new(), &method_in("DoWorkAsync", &by_marker)).is_none());
    }

    #[test]
    fn test_no_location() {
        assert!(check(&AvoidAsyncSuffix::new(), &MethodSymbol::new("DoWorkAsync")).is_none());
    }

    #[test]
    fn test_external_location() {
        let method = MethodSymbol::new("DoWorkAsync").located_at(SymbolLocation::External {
            origin: "libworker.rlib".to_string(),
        });
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_none());
    }

    #[test]
    fn test_missing_document_still_checked() {
        let method = MethodSymbol::new("DoWorkAsync").located_at(SymbolLocation::Source {
            document: None,
            location: Location::new(PathBuf::from("src/worker.rs"), 1, 1),
        });
        assert!(check(&AvoidAsyncSuffix::new(), &method).is_some());
    }

    #[test]
    fn test_deterministic() {
        let doc = handwritten();
        let method = method_in("DoWorkAsync", &doc);
        let rule = AvoidAsyncSuffix::new();
        assert_eq!(check(&rule, &method), check(&rule, &method));
    }

    #[test]
    fn test_cancelled() {
        let doc = handwritten();
        let cache = GeneratedCodeCache::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = AvoidAsyncSuffix::new()
            .check_method(&SymbolContext::new(&cache, &cancel), &method_in("DoWorkAsync", &doc));
        assert_eq!(result, Err(Cancelled));
    }

    #[test]
    fn test_message_snapshot() {
        let doc = handwritten();
        let violation = check(&AvoidAsyncSuffix::new(), &method_in("DoWorkAsync", &doc)).unwrap();
        insta::assert_snapshot!(violation.format(), @r"
        AvoidAsyncSuffix avoid-async-suffix at src/worker.rs:3:8
          warning: Method `DoWorkAsync` ends with `Async` but is not async
          = help: Rename to `DoWork` or make `DoWorkAsync` async
        ");
    }

    #[test]
    fn test_bare_suffix_suggestion() {
        let doc = handwritten();
        let violation = check(&AvoidAsyncSuffix::new(), &method_in("Async", &doc)).unwrap();
        let help = violation.suggestion.unwrap().message;
        assert_eq!(help, "Make `Async` async or return a future");
    }

    #[test]
    fn test_from_source() {
        let violations = check_source(
            r"
use std::future::Future;
use std::pin::Pin;

pub struct Client;

impl Client {
    pub fn connectAsync(&self) {}

    pub async fn fetchAsync(&self) -> u32 { 1 }

    pub fn forwardAsync(&self) -> impl Future<Output = u32> + Send {
        async { 1 }
    }

    pub fn boxedAsync(&self) -> Pin<Box<dyn Future<Output = u32>>> {
        Box::pin(async { 1 })
    }

    pub fn close(&self) {}
}
",
        );

        let names: Vec<_> = violations
            .iter()
            .map(|v| v.message.split('`').nth(1).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["connectAsync", "boxedAsync"]);
        assert_eq!(violations[0].location.file, PathBuf::from("src/lib.rs"));
        assert_eq!(violations[0].location.line, 8);
    }

    #[test]
    fn test_from_config() {
        let config = Config::parse(
            r#"
[rules.avoid-async-suffix]
severity = "error"
suffix = "_async"
handle_types = ["tokio::task::JoinHandle", "::"]
"#,
        )
        .unwrap();
        let rule = AvoidAsyncSuffix::from_config(config.rule(NAME).unwrap());

        assert_eq!(rule.checked_suffix(), "_async");
        assert_eq!(rule.default_severity(), Severity::Error);
        assert!(rule.requires_allow_reason());
        assert_eq!(
            rule.handle_types(),
            &[TypeRef::new("JoinHandle", "tokio::task")]
        );

        let doc = handwritten();
        let method = method_in("load_async", &doc)
            .returning(ReturnType::Named(TypeRef::new("Future", "std::future")));
        assert!(check(&rule, &method).is_some(), "default handle type replaced");

        let method = method_in("load_async", &doc)
            .returning(ReturnType::Named(TypeRef::new("JoinHandle", "tokio::task")));
        assert!(check(&rule, &method).is_none());
    }

    #[test]
    fn test_empty_suffix_ignored() {
        let config = Config::parse("[rules.avoid-async-suffix]\nsuffix = \"\"\n").unwrap();
        let rule = AvoidAsyncSuffix::from_config(config.rule(NAME).unwrap());
        assert_eq!(rule.checked_suffix(), DEFAULT_SUFFIX);
    }
}
