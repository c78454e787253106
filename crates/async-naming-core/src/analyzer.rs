//! Core analyzer: discovers sources, builds method symbols and runs rules.

use crate::cancel::{CancellationToken, Cancelled};
use crate::config::{Config, ConfigError};
use crate::context::SymbolContext;
use crate::document::RustDocument;
use crate::generated::GeneratedCodeCache;
use crate::rule::{Rule, RuleBox};
use crate::sink::{CollectingSink, DiagnosticSink};
use crate::symbols::{collect_methods, MethodSymbol};
use crate::types::{LintResult, Severity, Suggestion, Violation};
use crate::utils::allowance::check_allow_with_reason;

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// IO error reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing Rust source file.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Error walking the source tree.
    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was cancelled.
    #[error("Analysis cancelled")]
    Cancelled(#[from] Cancelled),
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisStats {
    /// Number of files parsed.
    pub files_checked: usize,
    /// Number of method symbols evaluated.
    pub symbols_checked: usize,
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    root: Option<PathBuf>,
    rules: Vec<RuleBox>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    fail_on_parse_error: bool,
    generated: Option<Arc<GeneratedCodeCache>>,
    cancel: Option<CancellationToken>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Registers a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Registers a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets whether to fail on parse errors (default: false).
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Shares a generated-document cache with other analyzers.
    ///
    /// Without one, the analyzer creates its own from the configuration.
    #[must_use]
    pub fn generated_cache(mut self, cache: Arc<GeneratedCodeCache>) -> Self {
        self.generated = Some(cache);
        self
    }

    /// Sets the token through which the run can be cancelled.
    #[must_use]
    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is unavailable, an exclude
    /// pattern is invalid, or the worker pool cannot be created.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();

        let root = self.root.unwrap_or_else(|| config.analyzer.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        if exclude_patterns.is_empty() {
            exclude_patterns.extend(["**/target/**".to_string(), "**/vendor/**".to_string()]);
        }
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let pool = match config.analyzer.parallelism {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?,
            ),
            None => None,
        };

        let generated = self.generated.unwrap_or_else(|| {
            Arc::new(GeneratedCodeCache::with_detector(
                config.generated.detector(),
            ))
        });

        Ok(Analyzer {
            root,
            rules: self.rules,
            exclude,
            config,
            fail_on_parse_error: self.fail_on_parse_error,
            generated,
            cancel: self.cancel.unwrap_or_default(),
            pool,
        })
    }
}

/// A parsed file and the method symbols declared in it.
struct ParsedFile {
    document: Arc<RustDocument>,
    methods: Vec<MethodSymbol>,
}

/// The host that runs rules over every method symbol of a source tree.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    root: PathBuf,
    rules: Vec<RuleBox>,
    exclude: Vec<glob::Pattern>,
    config: Config,
    fail_on_parse_error: bool,
    generated: Arc<GeneratedCodeCache>,
    cancel: CancellationToken,
    pool: Option<rayon::ThreadPool>,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the generated-document cache used by this analyzer.
    #[must_use]
    pub fn generated_cache(&self) -> &Arc<GeneratedCodeCache> {
        &self.generated
    }

    /// Analyzes all files and returns the sorted results.
    ///
    /// # Errors
    ///
    /// Returns an error if file discovery fails, a file cannot be read, a
    /// file fails to parse while `fail_on_parse_error` is set, or the run is
    /// cancelled.
    pub fn analyze(&self) -> Result<LintResult, AnalyzerError> {
        let sink = CollectingSink::new();
        let stats = self.analyze_into(&sink)?;

        let mut result = LintResult {
            violations: sink.take_all(),
            files_checked: stats.files_checked,
            symbols_checked: stats.symbols_checked,
        };
        result.sort();

        info!(
            "Analysis complete: {} violations in {} files",
            result.violations.len(),
            result.files_checked
        );

        Ok(result)
    }

    /// Analyzes all files, reporting findings to `sink`.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze`].
    pub fn analyze_into(&self, sink: &dyn DiagnosticSink) -> Result<AnalysisStats, AnalyzerError> {
        info!("Starting analysis at {:?}", self.root);

        let outcome = match &self.pool {
            Some(pool) => pool.install(|| self.run(sink)),
            None => self.run(sink),
        };

        // The run's documents are gone, whether it finished or not.
        self.generated.purge();
        outcome
    }

    fn run(&self, sink: &dyn DiagnosticSink) -> Result<AnalysisStats, AnalyzerError> {
        self.cancel.check()?;

        let files = self.discover_files()?;
        info!("Found {} files to analyze", files.len());

        let parsed: Vec<ParsedFile> = files
            .par_iter()
            .map(|path| self.load_file(path))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .flatten()
            .collect();

        let rules: Vec<&dyn Rule> = self
            .rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .map(|rule| &**rule)
            .collect();

        let ctx = SymbolContext::new(&self.generated, &self.cancel);
        parsed
            .par_iter()
            .flat_map_iter(|file| file.methods.iter().map(move |method| (file, method)))
            .try_for_each(|(file, method)| {
                for rule in &rules {
                    if let Some(violation) = rule.check_method(&ctx, method)? {
                        self.report(file, *rule, violation, sink);
                    }
                }
                Ok::<(), Cancelled>(())
            })?;

        Ok(AnalysisStats {
            files_checked: parsed.len(),
            symbols_checked: parsed.iter().map(|f| f.methods.len()).sum(),
        })
    }

    /// Reads and parses one file. A parse failure yields `None` unless
    /// `fail_on_parse_error` is set.
    fn load_file(&self, path: &Path) -> Result<Option<ParsedFile>, AnalyzerError> {
        self.cancel.check()?;
        debug!("Analyzing: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let document = Arc::new(RustDocument::new(path, content, &self.root));

        let ast = match document.parse() {
            Ok(ast) => ast,
            Err(e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                if self.fail_on_parse_error {
                    return Err(AnalyzerError::Parse {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    });
                }
                return Ok(None);
            }
        };

        let methods = collect_methods(&document, &ast);
        Ok(Some(ParsedFile { document, methods }))
    }

    /// Applies allow directives and severity overrides, then reports.
    fn report(
        &self,
        file: &ParsedFile,
        rule: &dyn Rule,
        mut violation: Violation,
        sink: &dyn DiagnosticSink,
    ) {
        let severity = self
            .config
            .rule_severity(rule.name())
            .unwrap_or(violation.severity);

        let allow = check_allow_with_reason(
            file.document.content(),
            violation.location.line,
            &[rule.name(), rule.code()],
        );
        if allow.is_allowed() {
            let reason_required = rule.requires_allow_reason() || severity == Severity::Error;
            if reason_required && allow.reason().is_none() {
                sink.report(
                    Violation::new(
                        rule.code(),
                        rule.name(),
                        Severity::Warning,
                        violation.location,
                        format!(
                            "Allow directive for '{}' is missing required reason",
                            rule.name()
                        ),
                    )
                    .with_suggestion(Suggestion::new(
                        "Add reason=\"...\" to explain why this exception is necessary",
                    )),
                );
            }
            return;
        }

        violation.severity = severity;
        sink.report(violation);
    }

    /// Discovers all Rust source files to analyze.
    fn discover_files(&self) -> Result<Vec<PathBuf>, AnalyzerError> {
        let respect_gitignore = self.config.analyzer.respect_gitignore;
        let walker = ignore::WalkBuilder::new(&self.root)
            .git_ignore(respect_gitignore)
            .git_exclude(respect_gitignore)
            .git_global(respect_gitignore)
            .require_git(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            let is_rust_file = entry.file_type().is_some_and(|t| t.is_file())
                && path.extension().is_some_and(|ext| ext == "rs");
            if !is_rust_file {
                continue;
            }

            if self.should_exclude(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Checks if a path should be excluded. Patterns match the path relative
    /// to the root.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .build()
            .expect("Failed to build analyzer");

        assert!(analyzer.root().exists());
        assert_eq!(analyzer.rule_count(), 0);
        assert!(analyzer.generated_cache().is_empty());
    }

    #[test]
    fn test_exclude_patterns() {
        let analyzer = Analyzer::builder()
            .root(".")
            .exclude("**/target/**")
            .exclude("**/vendor/**")
            .exclude("src/generated/**")
            .build()
            .expect("Failed to build analyzer");
        let root = analyzer.root().to_path_buf();

        assert!(analyzer.should_exclude(&root.join("target/debug/main.rs")));
        assert!(analyzer.should_exclude(&root.join("crates/app/target/build.rs")));
        assert!(analyzer.should_exclude(&root.join("vendor/lib.rs")));
        assert!(analyzer.should_exclude(&root.join("src/generated/schema.rs")));
        assert!(!analyzer.should_exclude(&root.join("src/lib.rs")));
        assert!(!analyzer.should_exclude(&root.join("mysrc/generated/schema.rs")));
        assert!(!analyzer.should_exclude(&root.join("targets/lib.rs")));
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = Analyzer::builder().root(".").exclude("[").build();
        assert!(matches!(result, Err(AnalyzerError::Glob(_))));
    }

    #[test]
    fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let analyzer = Analyzer::builder()
            .root(".")
            .cancellation(cancel)
            .build()
            .expect("Failed to build analyzer");

        assert!(matches!(
            analyzer.analyze(),
            Err(AnalyzerError::Cancelled(Cancelled))
        ));
    }
}
