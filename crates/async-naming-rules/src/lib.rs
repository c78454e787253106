//! # async-naming-rules
//!
//! Built-in rules for async-naming.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | AvoidAsyncSuffix | `avoid-async-suffix` | Forbids the `Async` suffix on methods that are neither `async` nor return a future |
//!
//! ## Usage
//!
//! ```ignore
//! use async_naming_core::Analyzer;
//! use async_naming_rules::AvoidAsyncSuffix;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .rule(AvoidAsyncSuffix::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod avoid_async_suffix;
mod presets;

pub use avoid_async_suffix::{AvoidAsyncSuffix, CODE, DEFAULT_SUFFIX, NAME};
pub use presets::{all_rules, rules_from_config};

/// Re-export core types for convenience.
pub use async_naming_core::{Rule, Severity, Violation};
