//! Sorted member index shared by the providers.

use std::collections::{BTreeMap, BTreeSet};

/// File members mapped to provider-specific locators, plus the set of
/// directory members (stored with a trailing `/`).
#[derive(Debug)]
pub(crate) struct MemberIndex<T> {
    files: BTreeMap<String, T>,
    dirs: BTreeSet<String>,
}

impl<T> Default for MemberIndex<T> {
    fn default() -> Self {
        Self {
            files: BTreeMap::new(),
            dirs: BTreeSet::new(),
        }
    }
}

impl<T> MemberIndex<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a file member and its parent directories.
    ///
    /// Returns false (and records nothing) for names that reduce to nothing.
    pub(crate) fn insert_file(&mut self, name: &str, locator: T) -> bool {
        let name = clean_name(name);
        let name = name.trim_end_matches('/');
        if name.is_empty() {
            return false;
        }
        self.insert_parents(name);
        self.files.insert(name.to_string(), locator);
        true
    }

    /// Record a directory member and its parents.
    pub(crate) fn insert_dir(&mut self, name: &str) {
        let name = clean_name(name);
        let name = name.trim_end_matches('/');
        if name.is_empty() {
            return;
        }
        self.insert_parents(name);
        self.dirs.insert(format!("{name}/"));
    }

    fn insert_parents(&mut self, name: &str) {
        for (idx, _) in name.match_indices('/') {
            self.dirs.insert(name[..=idx].to_string());
        }
    }

    pub(crate) fn file(&self, name: &str) -> Option<&T> {
        self.files.get(name)
    }

    pub(crate) fn contains_file(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// All member names in sorted order.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .dirs
            .iter()
            .chain(self.files.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub(crate) fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Bring a stored name into member form: forward slashes, no leading
/// `/` or `./`, no empty segments.
fn clean_name(name: &str) -> String {
    name.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
