//! Subcommand implementations.

pub mod check;
pub mod classify;
pub mod init;
pub mod list_rules;
pub mod output;
