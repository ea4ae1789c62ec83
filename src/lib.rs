// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. task::TaskDescriptor)
    clippy::module_name_repetitions
)]

//! # taskreveal
//!
//! Jump from a task to its line in a markdown document.
//!
//! Given a file and a task (its text, and optionally an id marker), taskreveal
//! finds or opens the view showing the file, waits for its editor to load,
//! locates the task in the live text and reveals the line by selecting it or
//! by marking it for a while.
//!
//! ## Architecture
//!
//! The host application is reached only through traits, and every delay is a
//! deadline against an injected clock:
//! - **Locate**: pure line lookup by id marker, then by text
//! - **Map**: convert rendered line numbers to source numbering
//! - **Reveal**: per-surface pipelines advanced by `tick`
//! - **Navigate**: find or open the right view, then start a reveal
//!
//! ## Modules
//!
//! - [`task`]: Task descriptors and line lookup
//! - [`source_map`]: Rendered/source line mapping and front matter
//! - [`editor`]: Editing surface traits and an in-memory editor
//! - [`reveal`]: Reveal pipelines, timing and clocks
//! - [`navigate`]: Workspace traits and the task navigator
//! - [`config`]: Saved command-line defaults
//! - [`error`]: Navigation errors

pub mod config;
pub mod editor;
pub mod error;
pub mod navigate;
pub mod reveal;
pub mod source_map;
pub mod task;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::editor::{EditingSurface, EditorBuffer, SurfaceHost, SurfaceStatus};
    pub use crate::error::NavigateError;
    pub use crate::navigate::{MemoryWorkspace, NavigationRequest, Navigator, Workspace};
    pub use crate::reveal::{RevealCoordinator, RevealEvent, RevealTarget, Strategy};
    pub use crate::source_map::{EditingMode, LineSpace, adjust};
    pub use crate::task::{TaskDescriptor, locate};
}
