//! Jumping from a task to its line in an open document.
//!
//! [`Navigator::open_task`] is the whole flow a "go to task" action needs:
//! find the view already showing the file (or open one), bring it forward,
//! and hand a task target to the [`RevealCoordinator`]. The task is located
//! in the view's text only once its editor is ready, since the document may
//! have changed since the caller last saw it.

mod memory;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use memory::MemoryWorkspace;

use crate::editor::{SurfaceHost, SurfaceId};
use crate::error::NavigateError;
use crate::reveal::{
    Clock, RevealCoordinator, RevealEvent, RevealTarget, RevealTiming, Strategy, SystemClock,
};
use crate::source_map::LineSpace;
use crate::task::TaskDescriptor;

/// What the host knows about a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// A text document that can be shown in an editor.
    Document,
    /// Exists, but is not a document (folder, binary, ...).
    Other,
    Missing,
}

/// One open view as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInfo {
    pub id: SurfaceId,
    /// File shown by the loaded view, if it has loaded.
    pub file: Option<PathBuf>,
    /// File recorded in the view's saved state; set for tabs that have not
    /// been activated yet.
    pub state_file: Option<PathBuf>,
}

/// The host application's view management.
pub trait Workspace: SurfaceHost {
    /// Every open document view, in tab order.
    fn views(&self) -> Vec<ViewInfo>;

    /// Bring a view to the foreground and give it focus.
    fn focus(&mut self, id: SurfaceId);

    /// Open `path` in a new view. The view may still be loading afterwards.
    fn open(&mut self, path: &Path) -> io::Result<()>;

    fn file_kind(&self, path: &Path) -> FileKind;
}

/// First view showing `path`, checking the loaded file before the saved
/// state so deferred tabs are found too.
pub fn find_view(views: &[ViewInfo], path: &Path) -> Option<SurfaceId> {
    views
        .iter()
        .find(|view| {
            view.file.as_deref() == Some(path) || view.state_file.as_deref() == Some(path)
        })
        .map(|view| view.id)
}

/// A request to show a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub path: PathBuf,
    pub task: TaskDescriptor,
    /// Numbering the task's line should be read in once found.
    pub space: LineSpace,
    pub strategy: Strategy,
}

impl NavigationRequest {
    /// Select the task's line in source numbering.
    pub fn new(path: impl Into<PathBuf>, task: TaskDescriptor) -> Self {
        Self {
            path: path.into(),
            task,
            space: LineSpace::Source,
            strategy: Strategy::SelectAndScroll,
        }
    }

    #[must_use]
    pub const fn with_space(mut self, space: LineSpace) -> Self {
        self.space = space;
        self
    }

    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Outcome of dispatching a navigation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dispatch", rename_all = "snake_case")]
pub enum Dispatch {
    /// A reveal is running (or already finished) on `surface`.
    Scheduled {
        surface: SurfaceId,
        /// Whether a new view had to be opened.
        opened: bool,
        /// Events produced before `open_task` returned.
        events: Vec<RevealEvent>,
    },
    /// The file was opened but the host shows no view for it.
    NoView,
}

/// Drives task navigation against a [`Workspace`].
#[derive(Debug)]
pub struct Navigator<C: Clock = SystemClock> {
    coordinator: RevealCoordinator<C>,
}

impl Navigator<SystemClock> {
    pub fn with_system_clock(timing: RevealTiming) -> Self {
        Self::new(RevealCoordinator::with_system_clock(timing))
    }
}

impl<C: Clock> Navigator<C> {
    pub const fn new(coordinator: RevealCoordinator<C>) -> Self {
        Self { coordinator }
    }

    pub const fn coordinator(&self) -> &RevealCoordinator<C> {
        &self.coordinator
    }

    /// Show a task: find or open its file's view, focus it, and schedule the
    /// reveal.
    ///
    /// # Errors
    ///
    /// Returns an error when `path` is missing or is not a document, or when
    /// the host fails to open it. A task absent from the document is not an
    /// error; it surfaces as [`RevealEvent::TaskNotFound`].
    pub fn open_task<W: Workspace>(
        &mut self,
        workspace: &mut W,
        request: NavigationRequest,
    ) -> Result<Dispatch, NavigateError> {
        let NavigationRequest {
            path,
            task,
            space,
            strategy,
        } = request;

        match workspace.file_kind(&path) {
            FileKind::Document => {}
            FileKind::Other => return Err(NavigateError::NotADocument(path)),
            FileKind::Missing => return Err(NavigateError::MissingFile(path)),
        }

        let (surface, opened) = if let Some(id) = find_view(&workspace.views(), &path) {
            workspace.focus(id);
            (id, false)
        } else {
            workspace
                .open(&path)
                .map_err(|source| NavigateError::Open {
                    path: path.clone(),
                    source,
                })?;
            let Some(id) = find_view(&workspace.views(), &path) else {
                tracing::warn!(path = %path.display(), "opened file but no view shows it");
                return Ok(Dispatch::NoView);
            };
            (id, true)
        };

        tracing::debug!(path = %path.display(), surface, opened, "revealing task");
        let events = self.coordinator.reveal(
            workspace,
            surface,
            RevealTarget::Task { task, space },
            strategy,
        );
        Ok(Dispatch::Scheduled {
            surface,
            opened,
            events,
        })
    }

    /// See [`RevealCoordinator::tick`].
    pub fn tick<W: Workspace>(&mut self, workspace: &mut W) -> Vec<RevealEvent> {
        self.coordinator.tick(workspace)
    }

    /// See [`RevealCoordinator::run_until_idle`].
    pub fn run_until_idle<W, F>(&mut self, workspace: &mut W, sleep: F) -> Vec<RevealEvent>
    where
        W: Workspace,
        F: FnMut(std::time::Duration),
    {
        self.coordinator.run_until_idle(workspace, sleep)
    }
}
