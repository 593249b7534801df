//! The package manager: current directory, mount table, and the read,
//! stat and search operations built on them.
//!
//! Every operation runs to completion on the caller's thread. Lookups that
//! find nothing return `None`/`false`; only mount failures and unsupported
//! requests come back as errors.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::config::{PackageConfig, PackageKind, DEFAULT_LARGE_FILE_WARNING, DEFAULT_SAVE_EXTENSION};
use crate::error::{PackageError, PackageResult};
use crate::mount::{EntryType, EntryTypes, Member, MountInfo, MountTable, Precedence, SearchHit};
use crate::path::{normalize, ROOT};
use crate::paths;
use crate::provider::{
    ArchiveProvider, DirectoryProvider, MemberStream, ResourceProvider, DEFAULT_DEPTH,
};
use crate::save::{DirSaveStorage, SaveStorage};

/// Owns the mount table and current directory for one host.
///
/// Loading and changing directory take `&mut self`; everything else is a
/// read. There is no internal locking.
pub struct PackageManager {
    current_directory: String,
    root_folder: PathBuf,
    mounts: MountTable,
    saves: Box<dyn SaveStorage>,
    save_extension: String,
    large_file_warning: u64,
    case_insensitive_search: bool,
    directory_depth: usize,
}

impl std::fmt::Debug for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageManager")
            .field("current_directory", &self.current_directory)
            .field("root_folder", &self.root_folder)
            .field("mounts", &self.mounts)
            .finish_non_exhaustive()
    }
}

impl PackageManager {
    /// Create a manager with nothing mounted, current directory `/`, and
    /// saves read from the default save directory.
    pub fn new(root_folder: impl Into<PathBuf>) -> Self {
        Self {
            current_directory: ROOT.to_string(),
            root_folder: root_folder.into(),
            mounts: MountTable::new(),
            saves: Box::new(DirSaveStorage::new(paths::save_dir())),
            save_extension: DEFAULT_SAVE_EXTENSION.to_string(),
            large_file_warning: DEFAULT_LARGE_FILE_WARNING,
            case_insensitive_search: false,
            directory_depth: DEFAULT_DEPTH,
        }
    }

    /// Create a manager from configuration and mount its packages in order.
    ///
    /// Packages that fail to mount are logged and skipped.
    pub fn from_config(config: &PackageConfig) -> Self {
        let save_dir = config.save_dir.clone().unwrap_or_else(paths::save_dir);
        let mut manager = Self::new(&config.root_folder)
            .with_save_storage(DirSaveStorage::new(save_dir));
        manager.save_extension = config.save_extension.clone();
        manager.large_file_warning = config.large_file_warning;
        manager.case_insensitive_search = config.case_insensitive_search;
        manager.directory_depth = config.directory_depth;

        for spec in &config.packages {
            let loaded = match spec.kind {
                PackageKind::Archive => manager.load_package(&spec.source, &spec.mount),
                PackageKind::Directory => manager.load_directory_as_package(&spec.source, &spec.mount),
            };
            if let Err(err) = loaded {
                tracing::warn!(error = %err, "skipping configured package");
            }
        }

        manager
    }

    /// Replace the save-file storage.
    pub fn with_save_storage(mut self, storage: impl SaveStorage + 'static) -> Self {
        self.saves = Box::new(storage);
        self
    }

    /// Base directory for relative package sources.
    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// The mount table.
    pub fn mount_table(&self) -> &MountTable {
        &self.mounts
    }

    /// All mounts in precedence order.
    pub fn mounts(&self) -> Vec<MountInfo> {
        self.mounts.mounts()
    }

    fn source_path(&self, source: &Path) -> PathBuf {
        if source.is_absolute() {
            source.to_path_buf()
        } else {
            self.root_folder.join(source)
        }
    }

    /// Mount a zip archive at the back of the table.
    ///
    /// On failure nothing is mounted.
    #[tracing::instrument(level = "debug", skip(self, source), fields(source = %source.as_ref().display()))]
    pub fn load_package(&mut self, source: impl AsRef<Path>, mount_position: &str) -> PackageResult<()> {
        let path = self.source_path(source.as_ref());
        let archive = ArchiveProvider::open(&path).map_err(|err| {
            tracing::error!(source = %path.display(), mount = mount_position, error = %err, "unable to mount package");
            PackageError::mount_failed(&path, mount_position, err)
        })?;

        tracing::info!(source = %path.display(), mount = mount_position, "package mounted");
        self.mount_provider(archive, mount_position, Precedence::Lowest);
        Ok(())
    }

    /// Mount a directory tree at the front of the table.
    ///
    /// On failure nothing is mounted.
    #[tracing::instrument(level = "debug", skip(self, directory), fields(directory = %directory.as_ref().display()))]
    pub fn load_directory_as_package(
        &mut self,
        directory: impl AsRef<Path>,
        mount_position: &str,
    ) -> PackageResult<()> {
        let path = self.source_path(directory.as_ref());
        let provider = DirectoryProvider::open(&path, self.directory_depth).map_err(|err| {
            tracing::error!(directory = %path.display(), mount = mount_position, error = %err, "unable to mount directory");
            PackageError::mount_failed(&path, mount_position, err)
        })?;

        tracing::info!(directory = %path.display(), mount = mount_position, "directory mounted");
        self.mount_provider(provider, mount_position, Precedence::Highest);
        Ok(())
    }

    /// Mount any provider. The load operations are built on this.
    pub fn mount_provider(
        &mut self,
        provider: impl ResourceProvider + 'static,
        mount_position: &str,
        precedence: Precedence,
    ) {
        let members = provider.list_members();
        tracing::debug!(mount = mount_position, kind = %provider.kind(), count = members.len(), "members at mount time");
        for member in &members {
            tracing::trace!(mount = mount_position, member = %member);
        }

        self.mounts.insert(mount_position, Box::new(provider), precedence);
    }

    /// Current directory, always absolute and normalized.
    pub fn current_directory(&self) -> &str {
        &self.current_directory
    }

    /// Change the current directory. Any path is accepted; nothing checks
    /// that it exists.
    pub fn change_directory(&mut self, directory: &str) {
        self.current_directory = normalize(directory, &self.current_directory);
    }

    /// Normalize a path against the current directory.
    pub fn absolute_path(&self, path: &str) -> String {
        normalize(path, &self.current_directory)
    }

    fn resolve(&self, path: &str) -> Option<Member<'_>> {
        self.mounts.resolve(&self.absolute_path(path))
    }

    fn open_member(member: &Member<'_>) -> Option<MemberStream> {
        match member.open() {
            Ok(stream) => Some(stream),
            Err(err) => {
                tracing::debug!(mount = member.mount_path(), member = member.name(), error = %err, "could not open member");
                None
            }
        }
    }

    /// True if some mount has the file.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn file_exists(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }

    /// Size of the file in bytes, or `None` if it cannot be found or opened.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn file_size(&self, path: &str) -> Option<u64> {
        let member = self.resolve(path)?;
        let mut stream = Self::open_member(&member)?;
        stream_len(&mut stream).ok()
    }

    /// Member type detection is not supported.
    pub fn file_type(&self, path: &str) -> PackageResult<EntryType> {
        tracing::warn!(path, "file type detection is not implemented");
        Err(PackageError::Unimplemented("file type detection"))
    }

    /// Read a whole file into memory.
    ///
    /// Paths ending in the save extension are read from save storage by file
    /// name, bypassing the mount table. Only this operation is routed that
    /// way; existence, size and stream queries always use the mounts.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        if self.is_save_path(path) {
            return self.read_save(path);
        }

        let member = self.resolve(path)?;
        let mut stream = Self::open_member(&member)?;
        self.read_stream(path, &mut stream)
    }

    /// An empty save extension turns save routing off.
    fn is_save_path(&self, path: &str) -> bool {
        !self.save_extension.is_empty() && path.ends_with(&self.save_extension)
    }

    fn read_save(&self, path: &str) -> Option<Vec<u8>> {
        let name = crate::path::file_name(path);
        let mut stream = match self.saves.open_for_loading(name) {
            Ok(stream) => stream,
            Err(err) => {
                let err = PackageError::SaveFile {
                    name: name.to_string(),
                    reason: err.to_string(),
                };
                tracing::error!(error = %err, "could not load save");
                return None;
            }
        };
        self.read_stream(path, &mut stream)
    }

    fn read_stream(&self, path: &str, stream: &mut MemberStream) -> Option<Vec<u8>> {
        let read = stream_len(stream).and_then(|len| {
            if len > self.large_file_warning {
                tracing::warn!(path, size = len, "reading large file into memory");
            }
            let mut data = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
            stream.read_to_end(&mut data)?;
            Ok(data)
        });

        match read {
            Ok(data) => Some(data),
            Err(err) => {
                tracing::debug!(path, error = %err, "read failed");
                None
            }
        }
    }

    /// Open a file for incremental or random access. The stream is the
    /// caller's to drop.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn open_stream(&self, path: &str) -> Option<MemberStream> {
        let member = self.resolve(path)?;
        Self::open_member(&member)
    }

    /// Collect members matching a wildcard filter across all owning mounts.
    ///
    /// See [`search_into`](Self::search_into).
    pub fn search(&self, filter: &str, path_hint: &str, types: EntryTypes) -> PackageResult<Vec<SearchHit>> {
        let mut hits = Vec::new();
        self.search_into(&mut hits, filter, path_hint, types)?;
        Ok(hits)
    }

    /// Append members matching a wildcard filter to `out` and return how
    /// many were appended.
    ///
    /// The filter is normalized against the current directory. Each mount
    /// that owns it contributes its matches in table order; the same name
    /// from several mounts appears several times. A non-empty `path_hint`
    /// is not supported and is rejected.
    #[tracing::instrument(level = "debug", skip(self, out))]
    pub fn search_into(
        &self,
        out: &mut Vec<SearchHit>,
        filter: &str,
        path_hint: &str,
        types: EntryTypes,
    ) -> PackageResult<usize> {
        if !path_hint.is_empty() {
            tracing::warn!(filter, path_hint, "path-hinted search is not implemented");
            return Err(PackageError::Unimplemented("path-hinted search"));
        }

        let filter = self.absolute_path(filter);
        Ok(self
            .mounts
            .search_into(out, &filter, types, self.case_insensitive_search))
    }
}

/// Length of a stream, leaving it positioned at the start.
fn stream_len(stream: &mut MemberStream) -> io::Result<u64> {
    let len = stream.seek(SeekFrom::End(0))?;
    stream.seek(SeekFrom::Start(0))?;
    Ok(len)
}
