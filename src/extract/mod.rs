//! Image extraction from search results pages
//!
//! The results page format is version-coupled to an external site and
//! changes without notice, so the actual scanning lives behind a narrow
//! strategy trait: the pattern can be swapped without touching the
//! dispatcher. A format change shows up as zero extracted records, never
//! as an error — callers are expected to log that signal.

use thiserror::Error;

use crate::types::ImageRecord;

pub mod pattern;

pub use pattern::PatternExtractor;

/// What to do with a match that fails record validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractPolicy {
    /// Skip the bad match, log it, and keep scanning. Production default;
    /// a failing record merely reduces the result count.
    Lenient,
    /// Abort on the first bad match. Lets a test suite distinguish "page
    /// format changed" from "nothing found".
    Strict,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid image record at match {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Strategy seam for turning a results page into image records
pub trait ImageExtractor: Send + Sync {
    /// Scan `html` and return up to `max_results` records in document order.
    /// Zero matches is an empty vec, not an error.
    fn extract(
        &self,
        html: &str,
        max_results: usize,
        policy: ExtractPolicy,
    ) -> Result<Vec<ImageRecord>, ExtractError>;
}
