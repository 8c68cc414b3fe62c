//! Text processing: normalization of scraped text and chapter segmentation.

pub mod normalizer;
pub mod segmenter;

pub use normalizer::normalize;
pub use segmenter::{SENTINEL_TITLE, segment, select_range};

/// A chapter of the source document, ready for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRecord {
    /// Filesystem-safe title (`Book_<n>_Chapter_<m>` or the sentinel)
    pub title: String,
    /// Chapter text, including its header line
    pub body: String,
    /// Position in the segmented document (0-based)
    pub index: usize,
}

impl ChapterRecord {
    /// Create a new chapter record.
    pub fn new(title: impl Into<String>, body: impl Into<String>, index: usize) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            index,
        }
    }
}

/// Normalize and segment a raw document in one step.
///
/// Every caller sources its chapters through here, whether the text came
/// from a file on disk or straight from a scraper.
pub fn prepare_chapters(raw: &str) -> Vec<ChapterRecord> {
    segment(&normalize(raw))
}
