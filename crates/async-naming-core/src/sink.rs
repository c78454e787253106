//! Destinations for reported diagnostics.

use crate::types::{Severity, Violation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Accepts diagnostics reported by the analyzer.
///
/// Implementations must accept reports from many threads at once. Reporters
/// never read results back.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn report(&self, violation: Violation);
}

/// A sink that keeps every diagnostic in memory.
///
/// Per-severity counts are kept atomically and read without locking.
#[derive(Debug, Default)]
pub struct CollectingSink {
    violations: Mutex<Vec<Violation>>,
    counts: [AtomicUsize; 3],
}

impl CollectingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if any error-severity diagnostic was reported.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Number of diagnostics held at `severity`.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.counter(severity).load(Ordering::Relaxed)
    }

    /// Number of diagnostics held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Takes all diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Violation> {
        let mut violations = self.lock();
        for counter in &self.counts {
            counter.store(0, Ordering::Relaxed);
        }
        std::mem::take(&mut *violations)
    }

    fn counter(&self, severity: Severity) -> &AtomicUsize {
        match severity {
            Severity::Info => &self.counts[0],
            Severity::Warning => &self.counts[1],
            Severity::Error => &self.counts[2],
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Violation>> {
        // A panicking reporter cannot leave the vector half-written.
        self.violations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, violation: Violation) {
        let mut violations = self.lock();
        self.counter(violation.severity).fetch_add(1, Ordering::Relaxed);
        violations.push(violation);
    }
}
