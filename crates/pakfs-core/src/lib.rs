//! pakfs-core: a layered virtual filesystem over archives and directories.
//!
//! Callers address files by logical path. The bytes live in mounted
//! sources (zip archives, plain directories, or in-memory providers) that
//! are consulted in precedence order:
//!
//! ```text
//! caller
//!   │  "gfx/hero.png"
//!   ▼
//! PackageManager ── normalize against current directory ──► "/gfx/hero.png"
//!   │
//!   ▼
//! MountTable (front = highest precedence)
//!   ├── /      DirectoryProvider  ./patch        (directory mounts go in front)
//!   ├── /      ArchiveProvider    data.zip       (archive mounts go at the back)
//!   └── /music ArchiveProvider    music.zip
//! ```
//!
//! The first mount whose prefix matches *and* which contains the member
//! answers the request. Searches visit every matching mount and keep all
//! hits, duplicates included.
//!
//! A `PackageManager` has no internal locking. Hosts that share one across
//! threads serialize access themselves.

pub mod config;
mod error;
pub mod manager;
pub mod mount;
pub mod path;
pub mod paths;
pub mod provider;
pub mod save;

pub use config::{PackageConfig, PackageKind, PackageSpec};
pub use error::{PackageError, PackageResult};
pub use manager::PackageManager;
pub use mount::{EntryType, EntryTypes, Member, MountInfo, MountTable, Precedence, SearchHit};
pub use path::{normalize, PATH_SEPARATOR, ROOT};
pub use provider::{
    ArchiveProvider, DirectoryProvider, MemberStream, MemoryProvider, ProviderKind,
    ResourceProvider,
};
pub use save::{DirSaveStorage, SaveStorage};
