use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that mean the caller asked for something the host contradicts.
///
/// A task that is not in the document is not an error; see
/// [`crate::reveal::RevealEvent::TaskNotFound`].
#[derive(Debug, Error)]
pub enum NavigateError {
    #[error("File not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Not a document: {}", .0.display())]
    NotADocument(PathBuf),

    #[error("Failed to open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
