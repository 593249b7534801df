//! Zip archive provider.

use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use zip::result::ZipError;
use zip::ZipArchive;

use super::index::MemberIndex;
use super::{member_not_found, MemberStream, ProviderKind, ResourceProvider};

/// Upper bound on the buffer reserved from a member's declared size.
const MAX_PREALLOC: usize = 1 << 20;

/// Members of a zip file.
///
/// The central directory is read once when the archive is opened. Opening a
/// member decompresses it fully into memory and hands back a seekable cursor.
pub struct ArchiveProvider {
    path: PathBuf,
    archive: Mutex<ZipArchive<File>>,
    index: MemberIndex<usize>,
}

impl fmt::Debug for ArchiveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveProvider")
            .field("path", &self.path)
            .field("files", &self.index.file_count())
            .finish()
    }
}

impl ArchiveProvider {
    /// Open a zip file. Fails if the file is missing or not a readable archive.
    pub fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::open(&path)?;
        let mut archive = ZipArchive::new(file).map_err(zip_to_io)?;

        let mut index = MemberIndex::new();
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i).map_err(zip_to_io)?;
            if entry.is_dir() {
                index.insert_dir(entry.name());
            } else {
                index.insert_file(entry.name(), i);
            }
        }

        Ok(Self {
            path,
            archive: Mutex::new(archive),
            index,
        })
    }
}

impl ResourceProvider for ArchiveProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Archive
    }

    fn source(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn has_member(&self, name: &str) -> bool {
        self.index.contains_file(name)
    }

    fn open_member(&self, name: &str) -> io::Result<MemberStream> {
        let &i = self.index.file(name).ok_or_else(|| member_not_found(name))?;

        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entry = archive.by_index(i).map_err(zip_to_io)?;
        let size = usize::try_from(entry.size()).unwrap_or(0);
        let mut data = Vec::with_capacity(size.min(MAX_PREALLOC));
        entry.read_to_end(&mut data)?;

        Ok(Box::new(Cursor::new(data)))
    }

    fn list_members(&self) -> Vec<String> {
        self.index.names()
    }
}

fn zip_to_io(err: ZipError) -> io::Error {
    match err {
        ZipError::Io(err) => err,
        ZipError::FileNotFound => io::Error::new(io::ErrorKind::NotFound, "archive member not found"),
        other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
    }
}
