use std::collections::BTreeSet;
use std::ops::Range;

use ropey::Rope;

use super::{EditingSurface, Viewport};
use crate::source_map::EditingMode;

/// Default number of lines an in-memory surface shows at once.
const DEFAULT_VIEW_HEIGHT: u16 = 24;

/// A position in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Position {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
}

impl Position {
    /// Create a position at a specific line and column.
    pub const fn at(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// A selected range; `head` is where the cursor ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

/// A text buffer backed by a rope data structure.
///
/// Tracks the cursor, an optional selection, line markers, a viewport and
/// the editing mode it is shown in, which is everything the reveal
/// pipeline needs from a surface.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Position,
    selection: Option<Selection>,
    markers: BTreeSet<usize>,
    mode: EditingMode,
    viewport: Viewport,
}

impl EditorBuffer {
    /// Create a new buffer from a string, shown in source mode.
    pub fn from_text(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let total = rope.len_lines();
        Self {
            rope,
            cursor: Position::default(),
            selection: None,
            markers: BTreeSet::new(),
            mode: EditingMode::Source,
            viewport: Viewport::new(DEFAULT_VIEW_HEIGHT, total),
        }
    }

    /// Builder-style override of the editing mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: EditingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Switch between source and preview.
    pub const fn set_mode(&mut self, mode: EditingMode) {
        self.mode = mode;
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// The current selection, if any.
    pub const fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Lines currently carrying a marker, ascending.
    pub fn markers(&self) -> Vec<usize> {
        self.markers.iter().copied().collect()
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Insert a string at the cursor position and move past it.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let char_idx = self.char_idx(self.cursor);
        self.rope.insert(char_idx, s);

        let lines: Vec<&str> = s.split('\n').collect();
        if lines.len() > 1 {
            self.cursor.line += lines.len() - 1;
            self.cursor.col = lines.last().map_or(0, |l| l.len());
        } else {
            self.cursor.col += s.len();
        }
        self.viewport.set_total_lines(self.rope.len_lines());
    }

    /// Move cursor to a specific line and column, clamped to the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor = self.clamp(Position::at(line, col));
    }

    fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count().saturating_sub(1));
        let col = pos.col.min(self.line_len(line));
        Position::at(line, col)
    }

    /// Convert a position to a ropey char index.
    fn char_idx(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let line_start = self.rope.line_to_char(pos.line);
        let line_str = self.rope.line(pos.line).to_string();
        // Columns are byte offsets; ropey indexes by char
        let byte_col = pos.col.min(line_str.len());
        line_start + line_str[..byte_col].chars().count()
    }
}

impl EditingSurface for EditorBuffer {
    fn text(&self) -> String {
        Self::text(self)
    }

    fn line(&self, line: usize) -> Option<String> {
        self.line_at(line)
    }

    fn mode(&self) -> EditingMode {
        self.mode
    }

    fn set_cursor(&mut self, pos: Position) {
        self.move_to(pos.line, pos.col);
        self.selection = None;
    }

    fn set_selection(&mut self, anchor: Position, head: Position) {
        let anchor = self.clamp(anchor);
        let head = self.clamp(head);
        self.cursor = head;
        self.selection = Some(Selection { anchor, head });
    }

    fn scroll_into_view(&mut self, lines: Range<usize>) {
        self.viewport.scroll_into_view(lines);
    }

    fn add_line_marker(&mut self, line: usize) {
        self.markers.insert(line);
    }

    fn remove_line_marker(&mut self, line: usize) {
        self.markers.remove(&line);
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
