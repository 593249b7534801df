//! Directory provider.
//!
//! Wraps a real directory tree. The tree is indexed once, when the provider
//! is created, down to a fixed number of levels.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use super::index::MemberIndex;
use super::{member_not_found, MemberStream, ProviderKind, ResourceProvider};

/// Levels indexed by default: the directory itself plus five below it.
pub const DEFAULT_DEPTH: usize = 6;

/// Files of a directory tree on the real filesystem.
///
/// `depth` counts levels including the top directory: with depth 1 only the
/// top directory's own entries are visible, with depth 2 their children as
/// well, and so on. Subdirectories on the last level still appear as
/// directory members, they just are not descended into.
#[derive(Debug)]
pub struct DirectoryProvider {
    root: PathBuf,
    depth: usize,
    index: MemberIndex<PathBuf>,
}

impl DirectoryProvider {
    /// Index `root` down to `depth` levels.
    ///
    /// Fails if `root` does not exist, is not a directory, or cannot be listed.
    /// Unreadable subdirectories are skipped.
    pub fn open(root: impl Into<PathBuf>, depth: usize) -> io::Result<Self> {
        let root = root.into();
        if !fs::metadata(&root)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("not a directory: {}", root.display()),
            ));
        }

        let mut index = MemberIndex::new();
        let mut stack = vec![(root.clone(), String::new(), depth)];
        let mut at_top = true;

        while let Some((dir, prefix, remaining)) = stack.pop() {
            if remaining == 0 {
                continue;
            }

            let entries = match fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if at_top => return Err(err),
                Err(err) => {
                    tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
                    continue;
                }
            };
            at_top = false;

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::debug!(dir = %dir.display(), error = %err, "skipping unreadable entry");
                        continue;
                    }
                };
                let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
                let path = entry.path();

                // Follow symlinks; the depth bound stops cycles.
                let Ok(meta) = fs::metadata(&path) else {
                    continue;
                };

                if meta.is_dir() {
                    index.insert_dir(&name);
                    stack.push((path, format!("{name}/"), remaining - 1));
                } else {
                    index.insert_file(&name, path);
                }
            }
        }

        Ok(Self { root, depth, index })
    }

    /// Number of levels indexed.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl ResourceProvider for DirectoryProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Directory
    }

    fn source(&self) -> Option<&Path> {
        Some(&self.root)
    }

    fn has_member(&self, name: &str) -> bool {
        self.index.contains_file(name)
    }

    fn open_member(&self, name: &str) -> io::Result<MemberStream> {
        let path = self.index.file(name).ok_or_else(|| member_not_found(name))?;
        Ok(Box::new(File::open(path)?))
    }

    fn list_members(&self) -> Vec<String> {
        self.index.names()
    }
}
