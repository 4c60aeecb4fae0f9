//! Errors raised while opening a distribution and reading its metadata.

use std::path::PathBuf;

/// Errors from reading a distribution artifact.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Unknown distribution format: '{}'", .0.display())]
    UnknownFormat(PathBuf),

    #[error("No {member} in archive: {}", .path.display())]
    MissingMember { member: &'static str, path: PathBuf },

    #[error("Too many top-level members in sdist archive: {}", .0.display())]
    MultipleRoots(PathBuf),

    #[error("Invalid distribution metadata: {0}")]
    InvalidMetadata(String),
}
