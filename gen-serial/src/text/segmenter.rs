//! Chapter segmentation on canonical `Book <n> and Chapter <m>` headers.

use super::ChapterRecord;
use crate::error::{PipelineError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Title used for text that precedes the first recognized header.
pub const SENTINEL_TITLE: &str = "segment";

static CHAPTER_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Book (\d+) and Chapter (\d+)").expect("chapter header pattern is valid")
});

/// Parse a canonical header line into its filesystem-safe title.
///
/// Returns `None` for ordinary text, including header-like lines whose
/// numbers do not parse (those stay in the chapter body).
pub fn header_title(line: &str) -> Option<String> {
    let caps = CHAPTER_HEADER.captures(line)?;
    let (book, chapter) = (&caps[1], &caps[2]);

    if book.parse::<u64>().is_err() || chapter.parse::<u64>().is_err() {
        log::debug!("Treating malformed header as body text: {}", line);
        return None;
    }

    Some(format!("Book_{}_Chapter_{}", book, chapter))
}

/// Split normalized text into ordered chapter records.
///
/// Each header line starts a new chapter and also stays in that chapter's
/// body. Text before the first header becomes a record titled
/// [`SENTINEL_TITLE`].
pub fn segment(normalized: &str) -> Vec<ChapterRecord> {
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_title: Option<String> = None;

    for line in normalized.lines() {
        if let Some(title) = header_title(line) {
            if !current.is_empty() {
                records.push(ChapterRecord::new(
                    current_title.as_deref().unwrap_or(SENTINEL_TITLE),
                    current.join("\n"),
                    records.len(),
                ));
                current.clear();
            }
            current_title = Some(title);
        }
        current.push(line);
    }

    if !current.is_empty() {
        records.push(ChapterRecord::new(
            current_title.as_deref().unwrap_or(SENTINEL_TITLE),
            current.join("\n"),
            records.len(),
        ));
    }

    records
}

/// Narrow records to an inclusive index range such as `"3"` or `"0-10"`.
///
/// Records keep their original indices. Bounds past the end are clamped.
pub fn select_range(records: Vec<ChapterRecord>, range: &str) -> Result<Vec<ChapterRecord>> {
    let (start, end) = parse_range(range)?;
    Ok(records
        .into_iter()
        .filter(|r| r.index >= start && r.index <= end)
        .collect())
}

fn parse_range(range: &str) -> Result<(usize, usize)> {
    let invalid = || {
        PipelineError::Config(format!(
            "Invalid chapter range '{}'. Use 'start-end' (e.g., '0-10') or a single index",
            range
        ))
    };

    let (start, end) = match range.split_once('-') {
        Some((start, end)) => (
            start.trim().parse::<usize>().map_err(|_| invalid())?,
            end.trim().parse::<usize>().map_err(|_| invalid())?,
        ),
        None => {
            let index = range.trim().parse::<usize>().map_err(|_| invalid())?;
            (index, index)
        }
    };

    if start > end {
        return Err(invalid());
    }
    Ok((start, end))
}
