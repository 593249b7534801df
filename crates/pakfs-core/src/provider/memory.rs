//! In-memory provider.
//!
//! Holds host-supplied bytes. Useful for generated content and for tests.

use std::io::{self, Cursor};

use super::index::MemberIndex;
use super::{member_not_found, MemberStream, ProviderKind, ResourceProvider};

/// Members held in memory, fixed once the provider is built.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    index: MemberIndex<Vec<u8>>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file member. Names that reduce to nothing are ignored.
    pub fn with_file(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        self.index.insert_file(name, data.into());
        self
    }

    /// Add an empty directory member.
    pub fn with_dir(mut self, name: &str) -> Self {
        self.index.insert_dir(name);
        self
    }
}

impl ResourceProvider for MemoryProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Memory
    }

    fn has_member(&self, name: &str) -> bool {
        self.index.contains_file(name)
    }

    fn open_member(&self, name: &str) -> io::Result<MemberStream> {
        let data = self.index.file(name).ok_or_else(|| member_not_found(name))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }

    fn list_members(&self) -> Vec<String> {
        self.index.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pakfs_glob::Pattern;
    use std::io::Read;

    fn read(provider: &MemoryProvider, name: &str) -> String {
        let mut data = String::new();
        provider
            .open_member(name)
            .unwrap()
            .read_to_string(&mut data)
            .unwrap();
        data
    }

    #[test]
    fn built_files_can_be_opened() {
        let provider = MemoryProvider::new().with_file("gfx/hero.png", b"hero".to_vec());

        assert_eq!(read(&provider, "gfx/hero.png"), "hero");
        assert!(provider.has_member("gfx/hero.png"));
        assert!(!provider.has_member("gfx"));
        assert_eq!(provider.kind(), ProviderKind::Memory);
        assert!(provider.source().is_none());
    }

    #[test]
    fn later_file_replaces_earlier() {
        let provider = MemoryProvider::new()
            .with_file("a.txt", "one")
            .with_file("a.txt", "two");

        assert_eq!(read(&provider, "a.txt"), "two");
        assert_eq!(provider.list_members(), vec!["a.txt"]);
    }

    #[test]
    fn empty_names_are_ignored() {
        let provider = MemoryProvider::new().with_file("/", "x").with_dir("");
        assert!(provider.list_members().is_empty());
        assert_eq!(
            provider.open_member("").err().expect("expected error").kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn list_matching_uses_pattern() {
        let provider = MemoryProvider::new()
            .with_file("gfx/hero.png", "h")
            .with_file("gfx/HERO2.PNG", "h2")
            .with_file("sfx/boom.wav", "b")
            .with_dir("maps");

        assert_eq!(
            provider.list_matching(&Pattern::new("*.png")),
            vec!["gfx/hero.png"]
        );
        assert_eq!(
            provider.list_matching(&Pattern::new("*.png").case_insensitive(true)),
            vec!["gfx/HERO2.PNG", "gfx/hero.png"]
        );
        assert_eq!(
            provider.list_matching(&Pattern::new("*/")),
            vec!["gfx/", "maps/", "sfx/"]
        );
    }
}
