//! XDG base directories for pakfs and its hosts.
//!
//! | Purpose | XDG Variable | Default |
//! |---------|--------------|---------|
//! | Data | `$XDG_DATA_HOME` | `~/.local/share` |
//! | Config | `$XDG_CONFIG_HOME` | `~/.config` |
//!
//! Hosts that keep their own layout compose on the primitives:
//!
//! ```
//! use pakfs_core::paths::xdg_data_home;
//!
//! let my_saves = xdg_data_home().join("mygame").join("saves");
//! assert!(my_saves.ends_with("mygame/saves"));
//! ```

use std::path::PathBuf;

use directories::BaseDirs;

/// The user's home directory, falling back to `/tmp` when `$HOME` is unset.
pub fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

/// `$XDG_DATA_HOME`, or `~/.local/share`.
pub fn xdg_data_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".local").join("share"))
}

/// `$XDG_CONFIG_HOME`, or `~/.config`.
pub fn xdg_config_home() -> PathBuf {
    BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| home_dir().join(".config"))
}

/// pakfs data directory: `$XDG_DATA_HOME/pakfs`.
pub fn data_dir() -> PathBuf {
    xdg_data_home().join("pakfs")
}

/// pakfs config directory: `$XDG_CONFIG_HOME/pakfs`.
pub fn config_dir() -> PathBuf {
    xdg_config_home().join("pakfs")
}

/// Default location for save files.
pub fn save_dir() -> PathBuf {
    data_dir().join("saves")
}
