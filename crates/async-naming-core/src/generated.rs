//! Generated-document classification.
//!
//! A document counts as generated when its file name follows a generated
//! artifact convention, or when an ordinary comment in front of its first
//! token carries an `<auto-generated` marker. Rules skip generated documents.
//!
//! [`GeneratedCodeCache`] memoizes the answer per document. It is keyed by the
//! document's allocation and only holds a [`Weak`] reference, so a cached
//! entry never keeps a document alive. Lookups and stores are individually
//! atomic; nothing is locked while a document is being inspected, so two
//! workers may classify the same document concurrently and store the same
//! answer.

use crate::cancel::{CancellationToken, Cancelled};
use crate::document::{DocumentRef, SourceDocument, Trivia};
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Comment markers recognised by default.
pub const DEFAULT_MARKERS: &[&str] = &["<auto-generated"];

/// Exact file stems of generated artifacts (lowercase).
const GENERATED_STEMS: &[&str] = &["service", "assemblyinfo", "assemblyattributes"];

/// File name prefix of temporary generated files (lowercase).
const GENERATED_PREFIX: &str = "temporarygeneratedfile_";

/// File stem suffixes of generated artifacts (lowercase).
const GENERATED_STEM_SUFFIXES: &[&str] = &[
    ".g",
    ".g.i",
    ".designer",
    ".generated",
    ".assemblyattributes",
];

/// Number of stores between sweeps for entries of dropped documents.
const PURGE_INTERVAL: usize = 64;

/// Returns true if the file name of `path` follows a generated-artifact
/// naming convention.
///
/// The comparison ignores case and looks at the whole file name, so
/// `Service.cs` matches while `MyService.cs` does not.
#[must_use]
pub fn is_generated_file_name(path: &Path) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let file_name = file_name.to_lowercase();

    if file_name.starts_with(GENERATED_PREFIX) {
        return true;
    }

    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name.as_str(), |(stem, _)| stem);

    GENERATED_STEMS.contains(&stem)
        || GENERATED_STEM_SUFFIXES
            .iter()
            .any(|suffix| stem.ends_with(suffix))
}

/// Uncached generated-document detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCodeDetector {
    markers: Vec<String>,
}

impl Default for GeneratedCodeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratedCodeDetector {
    /// Creates a detector with the default markers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_markers(DEFAULT_MARKERS.iter().copied())
    }

    /// Creates a detector recognising the given comment markers.
    #[must_use]
    pub fn with_markers<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the recognised comment markers.
    #[must_use]
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Returns true if any ordinary comment in `trivia` contains a marker.
    #[must_use]
    pub fn has_marker(&self, trivia: &[Trivia]) -> bool {
        trivia
            .iter()
            .filter_map(Trivia::comment_text)
            .any(|text| self.markers.iter().any(|m| text.contains(m.as_str())))
    }

    /// Classifies a document without consulting any cache.
    ///
    /// The file name is checked first since it needs no parsing. A document
    /// whose syntax root is unavailable is not generated.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is triggered during inspection.
    pub fn classify(
        &self,
        document: &dyn SourceDocument,
        cancel: &CancellationToken,
    ) -> Result<bool, Cancelled> {
        if document.path().is_some_and(is_generated_file_name) {
            return Ok(true);
        }

        Ok(document
            .leading_trivia(cancel)?
            .is_some_and(|trivia| self.has_marker(&trivia)))
    }
}

#[derive(Debug)]
struct CacheEntry {
    document: Weak<dyn SourceDocument>,
    generated: bool,
}

/// Thread-safe memo of [`GeneratedCodeDetector::classify`] per document.
#[derive(Debug, Default)]
pub struct GeneratedCodeCache {
    detector: GeneratedCodeDetector,
    entries: DashMap<usize, CacheEntry>,
    writes: AtomicUsize,
}

impl GeneratedCodeCache {
    /// Creates an empty cache using the default detector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache using `detector`.
    #[must_use]
    pub fn with_detector(detector: GeneratedCodeDetector) -> Self {
        Self {
            detector,
            entries: DashMap::new(),
            writes: AtomicUsize::new(0),
        }
    }

    /// Returns the detector backing this cache.
    #[must_use]
    pub fn detector(&self) -> &GeneratedCodeDetector {
        &self.detector
    }

    /// Returns true if `document` is generated.
    ///
    /// A missing document is not generated. The first call for a document
    /// inspects it; later calls return the stored answer.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is triggered before the answer is
    /// known. Nothing is stored in that case.
    pub fn is_generated(
        &self,
        document: Option<&DocumentRef>,
        cancel: &CancellationToken,
    ) -> Result<bool, Cancelled> {
        let Some(document) = document else {
            return Ok(false);
        };

        let key = document_key(document);
        if let Some(generated) = self.cached(key, document) {
            trace!(?key, generated, "generated-code cache hit");
            return Ok(generated);
        }

        cancel.check()?;
        let generated = self.detector.classify(document.as_ref(), cancel)?;
        trace!(?key, generated, "generated-code cache miss");

        self.entries.insert(
            key,
            CacheEntry {
                document: Arc::downgrade(document),
                generated,
            },
        );

        if self.writes.fetch_add(1, Ordering::Relaxed) % PURGE_INTERVAL == PURGE_INTERVAL - 1 {
            self.purge();
        }

        Ok(generated)
    }

    /// Returns the stored answer for `document` without computing it.
    #[must_use]
    pub fn get(&self, document: &DocumentRef) -> Option<bool> {
        self.cached(document_key(document), document)
    }

    /// Removes entries whose document has been dropped.
    ///
    /// Returns the number of entries removed.
    pub fn purge(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.document.strong_count() > 0);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "Purged generated-code cache");
        }
        removed
    }

    /// Number of stored entries, including any not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cached(&self, key: usize, document: &DocumentRef) -> Option<bool> {
        let entry = self.entries.get(&key)?;
        let same = entry.document.as_ptr().cast::<()>() == Arc::as_ptr(document).cast::<()>();
        same.then_some(entry.generated)
    }
}

/// The allocation address identifies a document. While an entry holds a
/// `Weak` to it the allocation cannot be reused, so a live handle at the same
/// address is the same document.
fn document_key(document: &DocumentRef) -> usize {
    Arc::as_ptr(document).cast::<()>() as usize
}
