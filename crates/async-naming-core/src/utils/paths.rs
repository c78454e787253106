//! Path utilities for AST analysis.

use syn::Path;

/// Returns the identifiers of a syn path, in order.
///
/// Generic arguments are dropped, so `Box<dyn Future>` yields `["Box"]`.
#[must_use]
pub fn path_segments(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect()
}
