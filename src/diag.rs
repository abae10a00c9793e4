// src/diag.rs

//! Common diagnostic framing shared by both parsers.
//!
//! A diagnostic frames the offending text between tilde banners and points
//! at the exact column: a caret directly under the column while the offset
//! from line start is small, or a dashed leader ending in a caret once the
//! column is deep enough that a bare caret would drown in indentation.

/// Banners never get narrower than this, even for empty lines.
const MIN_BANNER_WIDTH: usize = 10;

/// Tilde banner sized to the widest of the framed lines.
pub(crate) fn banner(lines: &[&str]) -> String {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    "~".repeat(width.max(MIN_BANNER_WIDTH))
}

/// Pointer line aimed at `col` (0-based character column within the line).
pub(crate) fn pointer(col: usize) -> String {
    if col >= 10 {
        format!("  here {}^", "-".repeat(col - 7))
    } else {
        format!("{}^--- here", " ".repeat(col))
    }
}
