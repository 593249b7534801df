//! Save-file storage.
//!
//! Saves live outside the mount table, keyed by bare file name.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::provider::MemberStream;

/// Source of saved games.
pub trait SaveStorage: Send + Sync {
    /// Open a save by file name for reading.
    fn open_for_loading(&self, name: &str) -> io::Result<MemberStream>;
}

/// Saves stored as plain files in one directory.
#[derive(Debug, Clone)]
pub struct DirSaveStorage {
    dir: PathBuf,
}

impl DirSaveStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SaveStorage for DirSaveStorage {
    fn open_for_loading(&self, name: &str) -> io::Result<MemberStream> {
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid save name: {name:?}"),
            ));
        }
        Ok(Box::new(File::open(self.dir.join(name))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn opens_saves_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("slot1.sav"), b"progress").unwrap();
        let storage = DirSaveStorage::new(dir.path());

        let mut data = Vec::new();
        storage
            .open_for_loading("slot1.sav")
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        assert_eq!(data, b"progress");
        assert_eq!(storage.dir(), dir.path());
    }

    #[test]
    fn missing_save_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirSaveStorage::new(dir.path());
        let err = storage.open_for_loading("slot9.sav").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn names_cannot_leave_the_directory() {
        let storage = DirSaveStorage::new("/nonexistent");
        for name in ["", "..", "../etc/passwd", "a/b.sav", "a\\b.sav"] {
            let err = storage.open_for_loading(name).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "name {name:?}");
        }
    }
}
