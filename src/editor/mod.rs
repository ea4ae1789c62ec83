//! Editing surfaces.
//!
//! [`EditingSurface`] is the live, mutable view of a document that the
//! reveal pipeline drives. [`SurfaceHost`] hands surfaces out by id and
//! reports whether each one is still loading or has gone away.
//! [`EditorBuffer`] is a rope-backed implementation used by the in-memory
//! workspace.

mod buffer;
mod viewport;

use std::ops::Range;

pub use buffer::{EditorBuffer, Position, Selection};
pub use viewport::Viewport;

use crate::source_map::EditingMode;

/// Identity of an editing surface within its host.
pub type SurfaceId = u64;

/// A live document view capable of cursor placement, selection and
/// scrolling.
pub trait EditingSurface {
    /// Full document text as currently shown.
    fn text(&self) -> String;

    /// Text of one line without its line ending, or `None` past the end.
    fn line(&self, line: usize) -> Option<String>;

    /// Current editing mode.
    fn mode(&self) -> EditingMode;

    fn set_cursor(&mut self, pos: Position);

    fn set_selection(&mut self, anchor: Position, head: Position);

    /// Scroll so the given line range is on screen.
    fn scroll_into_view(&mut self, lines: Range<usize>);

    /// Apply a transient visual marker to a line.
    fn add_line_marker(&mut self, line: usize);

    /// Remove a marker added by [`EditingSurface::add_line_marker`].
    fn remove_line_marker(&mut self, line: usize);
}

/// What a host currently has for a surface id.
#[derive(Debug)]
pub enum SurfaceStatus<'a, S: ?Sized> {
    /// The view exists but its editor has not finished loading.
    Loading,
    /// The editor is ready to be driven.
    Ready(&'a mut S),
    /// The view was closed or never existed.
    Gone,
}

/// Looks up editing surfaces by id.
pub trait SurfaceHost {
    type Surface: EditingSurface + ?Sized;

    fn surface(&mut self, id: SurfaceId) -> SurfaceStatus<'_, Self::Surface>;
}
