//! Error types for mount and manager operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for manager operations.
pub type PackageResult<T> = Result<T, PackageError>;

/// Errors surfaced by the package manager.
///
/// A missing member is not an error: lookups return `None` or `false`.
#[derive(Debug, Clone, Error)]
pub enum PackageError {
    #[error("unable to mount {} at {mount}: {reason}", .source_path.display())]
    MountFailed {
        source_path: PathBuf,
        mount: String,
        reason: String,
    },
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),
    #[error("could not load save file {name}: {reason}")]
    SaveFile { name: String, reason: String },
    #[error("io error: {0}")]
    Io(String),
}

impl PackageError {
    pub(crate) fn mount_failed(
        source_path: impl Into<PathBuf>,
        mount: &str,
        reason: impl std::fmt::Display,
    ) -> Self {
        PackageError::MountFailed {
            source_path: source_path.into(),
            mount: mount.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for PackageError {
    fn from(err: std::io::Error) -> Self {
        PackageError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_failure_names_source_and_mount() {
        let err = PackageError::mount_failed("/games/data.zip", "/", "no such file");
        assert_eq!(
            err.to_string(),
            "unable to mount /games/data.zip at /: no such file"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err: PackageError = io.into();
        assert!(matches!(err, PackageError::Io(ref msg) if msg == "disk on fire"));
    }
}
