//! Resource providers: the sources a mount entry delegates to.
//!
//! Three providers are included:
//!
//! - **ArchiveProvider**: members of a zip file
//! - **DirectoryProvider**: a real directory tree, indexed to a bounded depth
//! - **MemoryProvider**: host-supplied bytes, mostly for tests and generated content
//!
//! All of them speak the same member naming: paths relative to the mount
//! point, `/`-separated, with directory members ending in `/`. Parent
//! directories are implied by the files beneath them, so every provider
//! enumerates `gfx/` alongside `gfx/hero.png`.

mod archive;
mod directory;
mod index;
mod memory;

pub use archive::ArchiveProvider;
pub use directory::{DirectoryProvider, DEFAULT_DEPTH};
pub use memory::MemoryProvider;

use std::fmt;
use std::io::{self, Read, Seek};
use std::path::Path;

use pakfs_glob::Pattern;

/// A readable, seekable byte stream.
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// An open member. The caller owns it and the handle underneath.
pub type MemberStream = Box<dyn ReadSeek>;

/// Which kind of source backs a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Archive,
    Directory,
    Memory,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderKind::Archive => "archive",
            ProviderKind::Directory => "directory",
            ProviderKind::Memory => "memory",
        })
    }
}

/// Archive-like source of members.
///
/// Member names passed in and returned are relative to the mount point.
/// `has_member` and `open_member` address file members only.
pub trait ResourceProvider: Send + Sync {
    /// The kind of source.
    fn kind(&self) -> ProviderKind;

    /// Where the provider reads from on disk, if anywhere.
    fn source(&self) -> Option<&Path> {
        None
    }

    /// True if a file member with this exact name exists.
    fn has_member(&self, name: &str) -> bool;

    /// Open a file member for reading.
    fn open_member(&self, name: &str) -> io::Result<MemberStream>;

    /// Every member name, sorted, directories included.
    fn list_members(&self) -> Vec<String>;

    /// Member names matching a wildcard pattern.
    fn list_matching(&self, pattern: &Pattern) -> Vec<String> {
        self.list_members()
            .into_iter()
            .filter(|name| pattern.matches(name))
            .collect()
    }
}

pub(crate) fn member_not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such member: {name}"))
}
