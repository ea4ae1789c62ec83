//! Mapping between rendered and source line numbering.
//!
//! A rendered view does not count the front-matter block at the top of a
//! document, while the raw source does. [`adjust`] reconciles a rendered
//! line index with the editing mode the target surface is in.

use serde::{Deserialize, Serialize};

/// Line that opens and closes a front-matter block.
pub const FRONTMATTER_DELIMITER: &str = "---";

/// How the target surface is currently showing its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingMode {
    /// Raw text, front matter included.
    Source,
    /// Rendered reading view.
    Preview,
    /// No editable view could be resolved.
    Unknown,
}

/// Which numbering a line index was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSpace {
    Rendered,
    Source,
}

/// Number of lines taken by a leading front-matter block, closing delimiter
/// included.
///
/// Returns 0 when line 0 is not the delimiter or when the block is never
/// closed.
pub fn frontmatter_line_count<S: AsRef<str>>(lines: &[S]) -> usize {
    match lines.first() {
        Some(first) if first.as_ref() == FRONTMATTER_DELIMITER => {}
        _ => return 0,
    }
    lines
        .iter()
        .skip(1)
        .position(|line| line.as_ref() == FRONTMATTER_DELIMITER)
        .map_or(0, |offset| offset + 2)
}

/// Map a rendered line index onto the surface being navigated.
///
/// - `Source`: clamp into the document, then subtract the front-matter
///   length, never going below line 0.
/// - `Preview`: returned unchanged. No preview-to-source reconciliation is
///   defined yet, so the index is passed through as is.
/// - `Unknown`: returned unchanged, with a warning.
pub fn adjust<S: AsRef<str>>(rendered: usize, mode: EditingMode, source_lines: &[S]) -> usize {
    match mode {
        EditingMode::Preview => rendered,
        EditingMode::Unknown => {
            tracing::warn!(
                line = rendered,
                "editing mode unresolvable, using line unadjusted"
            );
            rendered
        }
        EditingMode::Source => {
            let frontmatter = frontmatter_line_count(source_lines);
            let clamped = rendered.min(source_lines.len().saturating_sub(1));
            clamped.saturating_sub(frontmatter)
        }
    }
}
