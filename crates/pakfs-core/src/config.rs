//! Configuration for a package manager.
//!
//! Configuration is loaded from `~/.config/pakfs/packages.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paths;
use crate::provider::DEFAULT_DEPTH;

/// Save files are recognized by this suffix unless configured otherwise.
pub const DEFAULT_SAVE_EXTENSION: &str = ".sav";

/// Reads above this many bytes log a warning unless configured otherwise.
pub const DEFAULT_LARGE_FILE_WARNING: u64 = 200 * 1024;

/// Package manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Base directory for relative package sources.
    #[serde(default = "default_root_folder")]
    pub root_folder: PathBuf,

    /// Directory holding save files. Defaults to the XDG data dir.
    #[serde(default)]
    pub save_dir: Option<PathBuf>,

    /// Logical paths ending in this suffix are read from save storage.
    #[serde(default = "default_save_extension")]
    pub save_extension: String,

    /// Warn when reading a file larger than this many bytes into memory.
    #[serde(default = "default_large_file_warning")]
    pub large_file_warning: u64,

    /// Fold case when matching search wildcards.
    #[serde(default)]
    pub case_insensitive_search: bool,

    /// Levels indexed for directory packages.
    #[serde(default = "default_directory_depth")]
    pub directory_depth: usize,

    /// Packages to mount at startup, in order.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,
}

fn default_root_folder() -> PathBuf {
    PathBuf::from(".")
}

fn default_save_extension() -> String {
    DEFAULT_SAVE_EXTENSION.to_string()
}

fn default_large_file_warning() -> u64 {
    DEFAULT_LARGE_FILE_WARNING
}

fn default_directory_depth() -> usize {
    DEFAULT_DEPTH
}

fn default_mount() -> String {
    "/".to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            root_folder: default_root_folder(),
            save_dir: None,
            save_extension: default_save_extension(),
            large_file_warning: default_large_file_warning(),
            case_insensitive_search: false,
            directory_depth: default_directory_depth(),
            packages: Vec::new(),
        }
    }
}

impl PackageConfig {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        paths::config_dir().join("packages.toml")
    }
}

/// What kind of source a package is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// A zip archive, mounted at the back of the table.
    Archive,
    /// A directory, mounted at the front of the table.
    Directory,
}

/// A package to mount at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub kind: PackageKind,

    /// Archive file or directory; relative paths are under `root_folder`.
    pub source: PathBuf,

    /// Logical mount point.
    #[serde(default = "default_mount")]
    pub mount: String,
}
