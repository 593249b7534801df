//! The mount table: resolution and search over mounted providers.
//!
//! Entries are kept in precedence order, front first. Resolution walks the
//! table and stops at the first entry whose mount path owns the logical
//! path *and* whose provider has the member; an entry that owns the path
//! but lacks the member is passed over. Search visits every owning entry
//! and keeps every hit.

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::path::PathBuf;

use pakfs_glob::Pattern;

use crate::path::{normalize, strip_mount, ROOT};
use crate::provider::{MemberStream, ProviderKind, ResourceProvider};

/// Where a new entry goes in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Front of the table: consulted before everything already mounted.
    Highest,
    /// Back of the table: consulted after everything already mounted.
    Lowest,
}

/// Type of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Which member types a search keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTypes {
    /// Keep file members.
    pub files: bool,
    /// Keep directory members (names ending in `/`).
    pub dirs: bool,
}

impl EntryTypes {
    /// Keep only files.
    pub fn files_only() -> Self {
        Self {
            files: true,
            dirs: false,
        }
    }

    /// Keep only directories.
    pub fn dirs_only() -> Self {
        Self {
            files: false,
            dirs: true,
        }
    }

    /// Keep both.
    pub fn all() -> Self {
        Self {
            files: true,
            dirs: true,
        }
    }

    /// Whether a member name passes this filter.
    pub fn accepts(&self, name: &str) -> bool {
        if name.ends_with('/') {
            self.dirs
        } else {
            self.files
        }
    }
}

/// One binding of a logical prefix to a provider.
struct MountEntry {
    mount_path: String,
    provider: Box<dyn ResourceProvider>,
}

/// Description of a mount, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// Logical mount point (e.g. "/" or "/music").
    pub path: String,
    /// Kind of provider behind it.
    pub kind: ProviderKind,
    /// On-disk source, if the provider has one.
    pub source: Option<PathBuf>,
}

/// A resolved file member.
pub struct Member<'a> {
    mount_path: &'a str,
    name: String,
    provider: &'a dyn ResourceProvider,
}

impl fmt::Debug for Member<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("mount_path", &self.mount_path)
            .field("name", &self.name)
            .field("kind", &self.provider.kind())
            .finish()
    }
}

impl Member<'_> {
    /// Name relative to the mount point.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mount point of the entry that answered.
    pub fn mount_path(&self) -> &str {
        self.mount_path
    }

    /// Kind of provider that answered.
    pub fn kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Open the member for reading.
    pub fn open(&self) -> io::Result<MemberStream> {
        self.provider.open_member(&self.name)
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Mount point of the entry that produced the hit.
    pub mount_path: String,
    /// Member name relative to that mount point.
    pub name: String,
}

impl SearchHit {
    /// True for directory members.
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    /// Absolute logical path of the hit.
    pub fn path(&self) -> String {
        if self.mount_path == ROOT {
            format!("{ROOT}{}", self.name)
        } else {
            format!("{}/{}", self.mount_path, self.name)
        }
    }
}

/// Ordered mount entries. The table only grows; entries are never changed
/// after insertion and are dropped together with the table.
#[derive(Default)]
pub struct MountTable {
    entries: VecDeque<MountEntry>,
}

impl fmt::Debug for MountTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountTable")
            .field(
                "mounts",
                &self.entries.iter().map(|e| &e.mount_path).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl MountTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a provider at `mount_path`, which is normalized against the root.
    pub fn insert(
        &mut self,
        mount_path: &str,
        provider: Box<dyn ResourceProvider>,
        precedence: Precedence,
    ) {
        let entry = MountEntry {
            mount_path: normalize(mount_path, ROOT),
            provider,
        };
        match precedence {
            Precedence::Highest => self.entries.push_front(entry),
            Precedence::Lowest => self.entries.push_back(entry),
        }
    }

    /// All mounts in precedence order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.entries
            .iter()
            .map(|entry| MountInfo {
                path: entry.mount_path.clone(),
                kind: entry.provider.kind(),
                source: entry.provider.source().map(PathBuf::from),
            })
            .collect()
    }

    /// Entries owning `path`, with the path relative to each.
    fn owning<'a, 'p>(
        &'a self,
        path: &'p str,
    ) -> impl Iterator<Item = (&'a MountEntry, &'p str)> {
        self.entries
            .iter()
            .filter_map(move |entry| strip_mount(path, &entry.mount_path).map(|rest| (entry, rest)))
    }

    /// Find the member for a normalized logical path.
    pub fn resolve(&self, path: &str) -> Option<Member<'_>> {
        self.owning(path)
            .find(|(entry, rest)| entry.provider.has_member(rest))
            .map(|(entry, rest)| Member {
                mount_path: &entry.mount_path,
                name: rest.to_string(),
                provider: entry.provider.as_ref(),
            })
    }

    /// Append members matching a normalized wildcard filter to `out`.
    ///
    /// Every entry owning the filter contributes, in table order, with no
    /// deduplication across entries. Returns the number of hits appended.
    pub fn search_into(
        &self,
        out: &mut Vec<SearchHit>,
        filter: &str,
        types: EntryTypes,
        case_insensitive: bool,
    ) -> usize {
        let before = out.len();

        for (entry, relative) in self.owning(filter) {
            let pattern = Pattern::new(relative).case_insensitive(case_insensitive);
            out.extend(
                entry
                    .provider
                    .list_matching(&pattern)
                    .into_iter()
                    .filter(|name| types.accepts(name))
                    .map(|name| SearchHit {
                        mount_path: entry.mount_path.clone(),
                        name,
                    }),
            );
        }

        out.len() - before
    }
}
