use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving and serving a video file
#[derive(Debug, Error)]
pub enum VideoError {
    /// Nothing exists at the resolved path
    #[error("Video not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The resolved path has no file extension (treated as a server fault)
    #[error("Resolved path has no extension: {}", .0.display())]
    MissingExtension(PathBuf),

    /// The extension is not on the allow-list (should map to HTTP 400)
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    /// Filesystem error other than "not found"
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VideoError {
    /// Build an error from a failed metadata lookup on `path`.
    pub fn from_metadata(err: std::io::Error, path: PathBuf) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VideoError::NotFound(path)
        } else {
            VideoError::Io(err)
        }
    }
}
