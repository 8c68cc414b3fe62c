//! Text normalization: decorative divider removal and shorthand chapter code expansion.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Lines made only of 3+ divider symbols (e.g. `=====`, `---`, `....`).
static DECORATIVE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*[=~\-*_.]{3,}\s*$").expect("decorative pattern is valid")
});

/// Shorthand chapter codes such as `B3` or `B3C12`, on word boundaries.
static SHORTHAND_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bB(\d+)(?:C(\d+))?\b").expect("shorthand pattern is valid"));

/// Normalize a scraped document for segmentation and synthesis.
///
/// Drops decorative divider lines and rewrites shorthand chapter codes
/// (`B3C12` -> `Book 3 and Chapter 12`, `B7` -> `Book 7`) in every remaining
/// line. Lines are rejoined with `\n`; a trailing terminator survives only if
/// the input had one.
pub fn normalize(raw: &str) -> String {
    let mut kept: Vec<Cow<'_, str>> = Vec::new();

    for line in raw.lines() {
        if is_decorative(line) {
            log::debug!("Skipping decorative line: {}", line);
            continue;
        }
        kept.push(expand_shorthand(line));
    }

    let mut result = kept.join("\n");
    if raw.ends_with('\n') && !kept.is_empty() {
        result.push('\n');
    }
    result
}

/// Check whether a line is a pure visual divider.
pub fn is_decorative(line: &str) -> bool {
    DECORATIVE_LINE.is_match(line.trim())
}

/// Expand shorthand chapter codes inside a single line.
pub fn expand_shorthand(line: &str) -> Cow<'_, str> {
    SHORTHAND_CODE.replace_all(line, |caps: &Captures<'_>| match caps.get(2) {
        Some(chapter) => format!("Book {} and Chapter {}", &caps[1], chapter.as_str()),
        None => format!("Book {}", &caps[1]),
    })
}
