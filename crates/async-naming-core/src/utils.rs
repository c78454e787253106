//! Utility functions shared by the front end and the analyzer.

pub mod allowance;
pub mod paths;
pub mod trivia;

#[doc(inline)]
pub use allowance::{check_allow_with_reason, AllowCheck};
