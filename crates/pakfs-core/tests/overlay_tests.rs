//! Overlay behaviour of archives and directories mounted together.
//!
//! Archives are real zip files and directories real trees, both built in
//! temporary directories per test.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use pakfs_core::{
    EntryTypes, MemoryProvider, PackageConfig, PackageError, PackageKind, PackageManager,
    PackageSpec, Precedence, ProviderKind,
};
use rstest::rstest;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, data) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (name, data) in files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
}

/// A game folder with `data.zip`, `extra.zip` and a `patch/` directory.
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_zip(
            &dir.path().join("data.zip"),
            &[
                ("gfx/hero.png", "archive hero"),
                ("gfx/map.png", "archive map"),
                ("sfx/boom.wav", "archive boom"),
                ("scripts/start.lua", ""),
            ],
        );
        write_zip(
            &dir.path().join("extra.zip"),
            &[("gfx/hero.png", "extra hero"), ("gfx/bonus.png", "extra bonus")],
        );
        write_tree(&dir.path().join("patch"), &[("gfx/hero.png", "patch hero")]);
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn manager(&self) -> PackageManager {
        PackageManager::new(self.root())
    }
}

fn read_string(manager: &PackageManager, path: &str) -> Option<String> {
    manager
        .read_file(path)
        .map(|data| String::from_utf8(data).unwrap())
}

fn names(manager: &PackageManager, filter: &str, types: EntryTypes) -> Vec<String> {
    manager
        .search(filter, "", types)
        .unwrap()
        .into_iter()
        .map(|hit| hit.name)
        .collect()
}

#[test]
fn directory_overrides_archive_mounted_before_it() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_directory_as_package("patch", "/").unwrap();

    assert_eq!(read_string(&manager, "/gfx/hero.png").unwrap(), "patch hero");
}

#[test]
fn directory_overrides_archive_mounted_after_it() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_directory_as_package("patch", "/").unwrap();
    manager.load_package("data.zip", "/").unwrap();

    assert_eq!(read_string(&manager, "/gfx/hero.png").unwrap(), "patch hero");
}

#[test]
fn earlier_archive_wins_over_later_archive() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_package("extra.zip", "/").unwrap();

    assert_eq!(read_string(&manager, "/gfx/hero.png").unwrap(), "archive hero");
    assert_eq!(read_string(&manager, "/gfx/bonus.png").unwrap(), "extra bonus");
}

// Regression: a mount that owns the path but lacks the member must not end
// the lookup.
#[test]
fn lookup_continues_past_mount_without_member() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_directory_as_package("patch", "/").unwrap();

    assert_eq!(manager.mounts()[0].kind, ProviderKind::Directory);
    assert_eq!(read_string(&manager, "/sfx/boom.wav").unwrap(), "archive boom");
}

#[rstest]
#[case::archive_file("/gfx/map.png", Some("archive map"))]
#[case::patched_file("/gfx/hero.png", Some("patch hero"))]
#[case::relative("gfx/map.png", Some("archive map"))]
#[case::dotted("/gfx/./../sfx/boom.wav", Some("archive boom"))]
#[case::empty_member("/scripts/start.lua", Some(""))]
#[case::directory_member("/gfx", None)]
#[case::missing("/gfx/villain.png", None)]
#[case::root("/", None)]
fn resolves(#[case] path: &str, #[case] expected: Option<&str>) {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_directory_as_package("patch", "/").unwrap();

    assert_eq!(read_string(&manager, path).as_deref(), expected);
    assert_eq!(manager.file_exists(path), expected.is_some());
    assert_eq!(
        manager.file_size(path),
        expected.map(|contents| contents.len() as u64)
    );
}

#[test]
fn exists_agrees_with_read_file() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_package("extra.zip", "/bonus").unwrap();
    manager.load_directory_as_package("patch", "/").unwrap();

    for path in [
        "/gfx/hero.png",
        "/gfx/bonus.png",
        "/bonus/gfx/bonus.png",
        "/bonus/gfx/map.png",
        "/scripts/start.lua",
        "/scripts",
        "/nothing",
    ] {
        assert_eq!(
            manager.file_exists(path),
            manager.read_file(path).is_some(),
            "path {path}"
        );
    }
}

// Save paths are the one exception: existence is answered by the mounts,
// whole reads by save storage.
#[test]
fn exists_and_read_file_split_on_save_paths() {
    let fixture = Fixture::new();
    let empty_saves = fixture.root().join("no-saves");
    fs::create_dir_all(&empty_saves).unwrap();

    let mut manager = fixture
        .manager()
        .with_save_storage(pakfs_core::DirSaveStorage::new(&empty_saves));
    manager.mount_provider(
        MemoryProvider::new().with_file("saves/slot2.sav", "packaged"),
        "/",
        Precedence::Lowest,
    );

    assert!(manager.file_exists("/saves/slot2.sav"));
    assert_eq!(manager.file_size("/saves/slot2.sav"), Some(8));
    assert!(manager.read_file("/saves/slot2.sav").is_none());
}

#[test]
fn mounts_at_a_prefix_only_answer_beneath_it() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("extra.zip", "/bonus/").unwrap();

    assert_eq!(manager.mounts()[0].path, "/bonus");
    assert_eq!(read_string(&manager, "/bonus/gfx/bonus.png").unwrap(), "extra bonus");
    assert!(!manager.file_exists("/gfx/bonus.png"));
    assert!(!manager.file_exists("/bonusgfx/bonus.png"));

    manager.change_directory("/bonus/gfx");
    assert_eq!(read_string(&manager, "bonus.png").unwrap(), "extra bonus");
}

#[test]
fn failed_load_leaves_table_unchanged() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();

    let err = manager.load_package("missing.zip", "/").unwrap_err();
    assert!(matches!(err, PackageError::MountFailed { ref mount, .. } if mount == "/"));
    let err = manager.load_directory_as_package("no-such-dir", "/").unwrap_err();
    assert!(matches!(err, PackageError::MountFailed { .. }));

    assert_eq!(manager.mount_table().len(), 1);
    assert!(manager.file_exists("/gfx/map.png"));
    assert!(!manager.file_exists("/gfx/villain.png"));
}

#[test]
fn corrupt_archive_fails_to_mount() {
    let fixture = Fixture::new();
    fs::write(fixture.root().join("bad.zip"), "PK but not really").unwrap();

    let mut manager = fixture.manager();
    assert!(manager.load_package("bad.zip", "/").is_err());
    assert!(manager.mount_table().is_empty());
}

#[test]
fn absolute_sources_ignore_root_folder() {
    let fixture = Fixture::new();
    let mut manager = PackageManager::new("/definitely/not/here");
    let archive: PathBuf = fixture.root().join("data.zip");
    manager.load_package(&archive, "/").unwrap();

    assert_eq!(manager.mounts()[0].source.as_deref(), Some(archive.as_path()));
    assert!(manager.load_package("data.zip", "/").is_err());
}

#[test]
fn search_concatenates_without_shadowing() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_directory_as_package("patch", "/").unwrap();

    let listing = names(&manager, "*.png", EntryTypes::files_only()).join("\n");
    assert_snapshot!(listing, @r"
    gfx/hero.png
    gfx/hero.png
    gfx/map.png
    ");
}

#[test]
fn search_directories() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();

    assert_eq!(
        names(&manager, "/*", EntryTypes::dirs_only()),
        vec!["gfx/", "scripts/", "sfx/"]
    );
}

#[test]
fn search_is_relative_to_current_directory_and_mount() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();
    manager.load_package("extra.zip", "/bonus").unwrap();

    manager.change_directory("/bonus");
    let hits = manager.search("gfx/*", "", EntryTypes::files_only()).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.mount_path == "/bonus"));

    // `*` also matches the empty suffix, so the directory itself is a hit.
    let dirs = manager.search("gfx/*", "", EntryTypes::dirs_only()).unwrap();
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].name, "gfx/");

    // The /bonus mount does not own "/", so only data.zip answers here.
    let everything = manager.search("/*.png", "", EntryTypes::files_only()).unwrap();
    assert_eq!(everything.len(), 2);
    assert!(everything.iter().all(|hit| hit.mount_path == "/"));
}

#[test]
fn search_with_path_hint_fails_loudly() {
    let fixture = Fixture::new();
    let mut manager = fixture.manager();
    manager.load_package("data.zip", "/").unwrap();

    let mut hits = Vec::new();
    let result = manager.search_into(&mut hits, "*.png", "gfx", EntryTypes::files_only());
    assert!(matches!(result, Err(PackageError::Unimplemented(_))));
    assert!(hits.is_empty());
}

#[test]
fn save_files_bypass_the_mount_table() {
    let fixture = Fixture::new();
    let saves = fixture.root().join("saves");
    write_tree(&saves, &[("slot1.sav", "saved progress")]);

    let mut manager = fixture
        .manager()
        .with_save_storage(pakfs_core::DirSaveStorage::new(&saves));
    manager.mount_provider(
        MemoryProvider::new().with_file("saves/slot1.sav", "packaged"),
        "/",
        Precedence::Highest,
    );

    assert_eq!(read_string(&manager, "/saves/slot1.sav").unwrap(), "saved progress");
    assert_eq!(read_string(&manager, "anywhere/slot1.sav").unwrap(), "saved progress");
    assert!(manager.read_file("/saves/slot2.sav").is_none());

    // Only whole-file reads are routed to save storage.
    let mut packaged = String::new();
    manager
        .open_stream("/saves/slot1.sav")
        .unwrap()
        .read_to_string(&mut packaged)
        .unwrap();
    assert_eq!(packaged, "packaged");
}

#[test]
fn config_mounts_packages_in_order() {
    let fixture = Fixture::new();
    let config = PackageConfig {
        root_folder: fixture.root().to_path_buf(),
        save_dir: Some(fixture.root().join("saves")),
        case_insensitive_search: true,
        packages: vec![
            PackageSpec {
                kind: PackageKind::Archive,
                source: "data.zip".into(),
                mount: "/".into(),
            },
            PackageSpec {
                kind: PackageKind::Archive,
                source: "missing.zip".into(),
                mount: "/".into(),
            },
            PackageSpec {
                kind: PackageKind::Directory,
                source: "patch".into(),
                mount: "/".into(),
            },
        ],
        ..PackageConfig::default()
    };

    let manager = PackageManager::from_config(&config);
    let kinds: Vec<_> = manager.mounts().into_iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![ProviderKind::Directory, ProviderKind::Archive]);
    assert_eq!(read_string(&manager, "/gfx/hero.png").unwrap(), "patch hero");
    assert_eq!(
        names(&manager, "/GFX/MAP.*", EntryTypes::files_only()),
        vec!["gfx/map.png"]
    );
}
