//! Classify command implementation.

use anyhow::{Context, Result};
use async_naming_core::{CancellationToken, DocumentRef, GeneratedCodeCache, RustDocument};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config_resolver::ConfigSource;

/// Runs the classify command.
pub fn run(files: &[PathBuf], source: &ConfigSource) -> Result<()> {
    let config = source.load()?;
    let cache = GeneratedCodeCache::with_detector(config.generated.detector());

    for (path, generated) in classify(files, &cache)? {
        let label = if generated { "generated" } else { "source" };
        println!("{}: {label}", path.display());
    }

    Ok(())
}

/// Classifies each file, in the order given.
fn classify<'a>(
    files: &'a [PathBuf],
    cache: &GeneratedCodeCache,
) -> Result<Vec<(&'a Path, bool)>> {
    let cancel = CancellationToken::new();
    let root = std::env::current_dir().context("Failed to read current directory")?;

    files
        .iter()
        .map(|path| -> Result<(&'a Path, bool)> {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let document: DocumentRef = Arc::new(RustDocument::new(path, content, &root));
            let generated = cache.is_generated(Some(&document), &cancel)?;
            Ok((path.as_path(), generated))
        })
        .collect()
}
