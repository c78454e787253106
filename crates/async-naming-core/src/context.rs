//! Context passed to rules for each evaluation.

use crate::cancel::CancellationToken;
use crate::generated::GeneratedCodeCache;

/// Context provided to every rule invocation.
///
/// Carries the shared generated-document cache and the host's cancellation
/// token. Both are shared by all workers of a run.
#[derive(Debug, Clone, Copy)]
pub struct SymbolContext<'a> {
    /// Classification of documents as generated.
    pub generated: &'a GeneratedCodeCache,
    /// Cancellation requested by the host.
    pub cancel: &'a CancellationToken,
}

impl<'a> SymbolContext<'a> {
    /// Creates a new context.
    #[must_use]
    pub fn new(generated: &'a GeneratedCodeCache, cancel: &'a CancellationToken) -> Self {
        Self { generated, cancel }
    }
}
