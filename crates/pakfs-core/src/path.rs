//! Logical path normalization.
//!
//! Logical paths are `/`-separated and always absolute once normalized:
//! `.` segments and empty segments vanish, `..` removes the previous segment
//! (and is ignored at the root), and there is never a trailing separator
//! except for the root itself.

/// Separator used throughout the logical namespace.
pub const PATH_SEPARATOR: char = '/';

/// The logical root.
pub const ROOT: &str = "/";

/// Normalize `path` against `current_directory`.
///
/// Paths starting with the separator are already absolute and ignore the
/// current directory; anything else is appended to it.
///
/// ```
/// use pakfs_core::normalize;
/// assert_eq!(normalize("gfx/../sfx/./boom.wav", "/data"), "/data/sfx/boom.wav");
/// assert_eq!(normalize("/x//y/", "/data"), "/x/y");
/// assert_eq!(normalize("..", "/"), "/");
/// ```
pub fn normalize(path: &str, current_directory: &str) -> String {
    if path.starts_with(PATH_SEPARATOR) {
        return collapse(path);
    }

    collapse(&format!("{current_directory}{PATH_SEPARATOR}{path}"))
}

/// Collapse segments; an input with no named segments becomes the root.
fn collapse(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(PATH_SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            name => segments.push(name),
        }
    }

    if segments.is_empty() {
        return ROOT.to_string();
    }

    let mut out = String::with_capacity(path.len());
    for segment in segments {
        out.push(PATH_SEPARATOR);
        out.push_str(segment);
    }
    out
}

/// Strip a mount prefix from a normalized path.
///
/// Matching is by whole segments: `/data` owns `/data` and `/data/...`
/// but not `/database`. The root mount owns every path. The returned
/// remainder has no leading separator and is empty when `path` names the
/// mount point itself.
pub fn strip_mount<'a>(path: &'a str, mount: &str) -> Option<&'a str> {
    if mount == ROOT {
        return Some(path.trim_start_matches(PATH_SEPARATOR));
    }

    let rest = path.strip_prefix(mount)?;
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(PATH_SEPARATOR)
    }
}

/// Final segment of a logical path.
pub fn file_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}
