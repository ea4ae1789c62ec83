use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use super::{FileKind, ViewInfo, Workspace};
use crate::editor::{EditorBuffer, SurfaceHost, SurfaceId, SurfaceStatus};
use crate::source_map::EditingMode;

#[derive(Debug, Clone)]
enum MemoryFile {
    Document(String),
    Other,
}

#[derive(Debug)]
enum ViewState {
    /// Restored tab that has never been activated.
    Deferred,
    /// Activated; becomes ready after `polls_left` more lookups.
    Loading { polls_left: u32 },
    Loaded(EditorBuffer),
}

#[derive(Debug)]
struct MemoryView {
    id: SurfaceId,
    path: PathBuf,
    state: ViewState,
}

/// A workspace held entirely in memory.
///
/// Views load lazily: a newly opened or focused view answers `Loading` for
/// a configurable number of lookups before its editor appears, and a
/// deferred tab stays unloaded until it is focused.
#[derive(Debug)]
pub struct MemoryWorkspace {
    files: HashMap<PathBuf, MemoryFile>,
    views: Vec<MemoryView>,
    next_id: SurfaceId,
    focused: Option<SurfaceId>,
    load_polls: u32,
    mode: EditingMode,
}

impl Default for MemoryWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            views: Vec::new(),
            next_id: 1,
            focused: None,
            load_polls: 0,
            mode: EditingMode::Source,
        }
    }

    /// Number of readiness lookups a view answers `Loading` to after being
    /// activated.
    #[must_use]
    pub const fn with_load_delay(mut self, polls: u32) -> Self {
        self.load_polls = polls;
        self
    }

    /// Editing mode new editors start in.
    #[must_use]
    pub const fn with_mode(mut self, mode: EditingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn add_document(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.files
            .insert(path.into(), MemoryFile::Document(text.into()));
    }

    /// Register a path that exists but cannot be shown in an editor.
    pub fn add_other(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into(), MemoryFile::Other);
    }

    /// Add a tab for `path` that will not load until focused.
    pub fn open_deferred(&mut self, path: impl Into<PathBuf>) -> SurfaceId {
        self.push_view(path.into(), ViewState::Deferred)
    }

    /// Close a view; reveals aimed at it become stale.
    pub fn close(&mut self, id: SurfaceId) -> bool {
        let before = self.views.len();
        self.views.retain(|view| view.id != id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        self.views.len() != before
    }

    pub const fn focused(&self) -> Option<SurfaceId> {
        self.focused
    }

    /// Editor of a loaded view.
    pub fn buffer(&self, id: SurfaceId) -> Option<&EditorBuffer> {
        self.views
            .iter()
            .find(|view| view.id == id)
            .and_then(|view| match &view.state {
                ViewState::Loaded(buffer) => Some(buffer),
                _ => None,
            })
    }

    fn push_view(&mut self, path: PathBuf, state: ViewState) -> SurfaceId {
        let id = self.next_id;
        self.next_id += 1;
        self.views.push(MemoryView { id, path, state });
        id
    }
}

impl SurfaceHost for MemoryWorkspace {
    type Surface = EditorBuffer;

    fn surface(&mut self, id: SurfaceId) -> SurfaceStatus<'_, EditorBuffer> {
        let Some(view) = self.views.iter_mut().find(|view| view.id == id) else {
            return SurfaceStatus::Gone;
        };

        if let ViewState::Loading { polls_left } = &mut view.state {
            if *polls_left > 0 {
                *polls_left -= 1;
                return SurfaceStatus::Loading;
            }
            let Some(MemoryFile::Document(text)) = self.files.get(&view.path) else {
                // Deleted or replaced while loading
                return SurfaceStatus::Gone;
            };
            view.state = ViewState::Loaded(EditorBuffer::from_text(text).with_mode(self.mode));
        }

        match &mut view.state {
            ViewState::Loaded(buffer) => SurfaceStatus::Ready(buffer),
            ViewState::Deferred | ViewState::Loading { .. } => SurfaceStatus::Loading,
        }
    }
}

impl Workspace for MemoryWorkspace {
    fn views(&self) -> Vec<ViewInfo> {
        self.views
            .iter()
            .map(|view| ViewInfo {
                id: view.id,
                file: matches!(view.state, ViewState::Loaded(_)).then(|| view.path.clone()),
                state_file: Some(view.path.clone()),
            })
            .collect()
    }

    fn focus(&mut self, id: SurfaceId) {
        let load_polls = self.load_polls;
        if let Some(view) = self.views.iter_mut().find(|view| view.id == id) {
            if matches!(view.state, ViewState::Deferred) {
                view.state = ViewState::Loading {
                    polls_left: load_polls,
                };
            }
            self.focused = Some(id);
        }
    }

    fn open(&mut self, path: &Path) -> io::Result<()> {
        match self.files.get(path) {
            Some(MemoryFile::Document(_)) => {}
            Some(MemoryFile::Other) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is not a document", path.display()),
                ));
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                ));
            }
        }
        let id = self.push_view(
            path.to_path_buf(),
            ViewState::Loading {
                polls_left: self.load_polls,
            },
        );
        self.focused = Some(id);
        Ok(())
    }

    fn file_kind(&self, path: &Path) -> FileKind {
        match self.files.get(path) {
            Some(MemoryFile::Document(_)) => FileKind::Document,
            Some(MemoryFile::Other) => FileKind::Other,
            None => FileKind::Missing,
        }
    }
}
