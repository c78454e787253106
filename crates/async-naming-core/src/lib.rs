//! # async-naming-core
//!
//! Core framework for symbol-level naming lints over Rust sources.
//!
//! This crate provides the foundational traits and types for building
//! method naming rules. It includes:
//!
//! - [`Rule`] trait for per-method rules
//! - [`Analyzer`] for discovering sources and running rules in parallel
//! - [`GeneratedCodeCache`] for memoized generated-document classification
//! - [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use async_naming_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(MyRule::new())
//!     .build()?;
//!
//! let result = analyzer.analyze()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod cancel;
mod config;
mod context;
mod document;
mod generated;
mod rule;
mod sink;
mod symbols;
mod types;

/// Utility modules for rule implementations.
pub mod utils;

pub use analyzer::{AnalysisStats, Analyzer, AnalyzerBuilder, AnalyzerError};
pub use cancel::{CancellationToken, Cancelled};
pub use config::{AnalyzerConfig, Config, ConfigError, GeneratedConfig, RuleConfig};
pub use context::SymbolContext;
pub use document::{DocumentRef, RustDocument, SourceDocument, Trivia};
pub use generated::{
    is_generated_file_name, GeneratedCodeCache, GeneratedCodeDetector, DEFAULT_MARKERS,
};
pub use rule::{Rule, RuleBox};
pub use sink::{CollectingSink, DiagnosticSink};
pub use symbols::{collect_methods, MethodSymbol, ReturnType, SymbolLocation, TypeRef};
pub use types::{LintResult, Location, Severity, Suggestion, Violation, ViolationDiagnostic};
pub use utils::allowance::AllowCheck;
