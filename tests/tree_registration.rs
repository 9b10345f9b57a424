// tests/tree_registration.rs

mod common;
use crate::common::{init_tracing, RecordingRegistry};

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use touchbridge::fs::mock::MockFileSystem;
use touchbridge::fs::{classify_entry, is_hidden_name, DirectoryEntry, FileSystem, RealFileSystem};
use touchbridge::watch::tree::{decide, is_below_hidden_dir, EntryDecision};
use touchbridge::watch::{register_roots, register_tree, WatchRoot};

fn project_fs() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_dir("/work/app/src/handlers");
    fs.add_file("/work/app/src/main.go");
    fs.add_dir("/work/app/.git/objects/ab");
    fs.add_file("/work/app/.git/HEAD");
    fs.add_dir("/work/app/docs");
    fs.add_file("/work/app/.env");
    fs
}

fn pb(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}

#[test]
fn registers_every_visible_directory_depth_first() {
    init_tracing();
    let fs = project_fs();
    let mut registry = RecordingRegistry::new();

    let stats = register_tree(&fs, &mut registry, &WatchRoot::new("/work/app"));

    assert_eq!(
        registry.registered(),
        pb(&[
            "/work/app",
            "/work/app/src",
            "/work/app/src/handlers",
            "/work/app/docs",
        ])
    );
    assert_eq!(stats.registered, 4);
    assert_eq!(stats.skipped_hidden, 1);
}

#[test]
fn hidden_directories_are_never_registered_or_descended() {
    let fs = project_fs();
    let mut registry = RecordingRegistry::new();

    register_tree(&fs, &mut registry, &WatchRoot::new("/work/app"));

    assert!(
        registry
            .registered()
            .iter()
            .all(|p| !p.starts_with("/work/app/.git"))
    );
}

#[test]
fn symlinked_directories_are_skipped_with_their_subtree() {
    let fs = MockFileSystem::new();
    fs.add_dir("/work/app/src");
    fs.add_dir("/elsewhere/deep/tree");
    fs.add_symlink("/work/app/vendor", "/elsewhere");
    // A link back up would loop forever if followed.
    fs.add_symlink("/work/app/src/loop", "/work/app");
    let mut registry = RecordingRegistry::new();

    let stats = register_tree(&fs, &mut registry, &WatchRoot::new("/work/app"));

    assert_eq!(registry.registered(), pb(&["/work/app", "/work/app/src"]));
    assert_eq!(stats.skipped_symlinks, 2);
}

#[test]
fn unreadable_directory_counts_as_empty_and_walk_continues() {
    let fs = project_fs();
    fs.make_unreadable("/work/app/src");
    let mut registry = RecordingRegistry::new();

    let stats = register_tree(&fs, &mut registry, &WatchRoot::new("/work/app"));

    // `src` itself is still registered; its children are not visited.
    assert_eq!(
        registry.registered(),
        pb(&["/work/app", "/work/app/src", "/work/app/docs"])
    );
    assert_eq!(stats.unreadable, 1);
}

#[test]
fn root_is_registered_even_if_it_cannot_be_listed() {
    let fs = MockFileSystem::new();
    fs.add_dir("/work/locked/inner");
    fs.make_unreadable("/work/locked");
    let mut registry = RecordingRegistry::new();

    let stats = register_tree(&fs, &mut registry, &WatchRoot::new("/work/locked"));

    assert_eq!(registry.registered(), pb(&["/work/locked"]));
    assert_eq!(stats.registered, 1);
    assert_eq!(stats.unreadable, 1);
}

#[test]
fn registration_failure_is_not_fatal() {
    let fs = project_fs();
    let mut registry = RecordingRegistry::new();
    registry.fail_on("/work/app/src");

    let stats = register_tree(&fs, &mut registry, &WatchRoot::new("/work/app"));

    assert_eq!(stats.failed, 1);
    assert_eq!(stats.registered, 3);
    assert!(registry.registered().contains(&PathBuf::from("/work/app/src/handlers")));
    assert!(registry.registered().contains(&PathBuf::from("/work/app/docs")));
}

#[test]
fn all_roots_are_walked_and_counters_summed() {
    let fs = project_fs();
    fs.add_dir("/work/lib/pkg");
    let mut registry = RecordingRegistry::new();

    let roots = vec![WatchRoot::new("/work/app"), WatchRoot::new("/work/lib")];
    let stats = register_roots(&fs, &mut registry, &roots);

    assert_eq!(stats.registered, 6);
    assert!(registry.registered().ends_with(&pb(&["/work/lib", "/work/lib/pkg"])));
}

#[test]
fn decide_checks_link_before_anything_else() {
    let entry = |name: &str, is_dir, is_symlink| DirectoryEntry {
        name: name.into(),
        parent: PathBuf::from("/p"),
        is_dir,
        is_symlink,
    };

    assert_eq!(decide(&entry("src", true, false)), EntryDecision::Descend);
    assert_eq!(decide(&entry(".git", true, false)), EntryDecision::SkipHidden);
    assert_eq!(decide(&entry(".hidden-link", false, true)), EntryDecision::SkipSymlink);
    assert_eq!(decide(&entry("link", false, true)), EntryDecision::SkipSymlink);
    assert_eq!(decide(&entry("main.go", false, false)), EntryDecision::NotADirectory);
}

#[test]
fn below_hidden_dir_uses_the_closest_root() {
    let roots = vec![WatchRoot::new("/home/me"), WatchRoot::new("/home/me/.config/app")];

    assert!(is_below_hidden_dir(&roots, Path::new("/home/me/.cache/x")));
    assert!(!is_below_hidden_dir(&roots, Path::new("/home/me/.bashrc")));
    // Hidden component lies above the closest root.
    assert!(!is_below_hidden_dir(&roots, Path::new("/home/me/.config/app/settings.json")));
    assert!(!is_below_hidden_dir(&roots, Path::new("/elsewhere/.git/HEAD")));
}

#[cfg(unix)]
#[test]
fn real_filesystem_walk_skips_hidden_and_symlinked_dirs() {
    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().canonicalize().unwrap();

    std::fs::create_dir_all(root.join("src/nested")).unwrap();
    std::fs::create_dir_all(root.join(".git/refs")).unwrap();
    std::fs::create_dir_all(root.join("outside/inner")).unwrap();
    std::fs::write(root.join("src/main.rs"), b"fn main() {}").unwrap();
    std::os::unix::fs::symlink(root.join("outside"), root.join("src/link")).unwrap();

    let entries = RealFileSystem.read_dir(&root.join("src")).unwrap();
    let link = entries.iter().find(|e| e.name == "link").unwrap();
    assert!(link.is_symlink);
    assert!(!link.is_dir);

    let mut registry = RecordingRegistry::new();
    register_tree(&RealFileSystem, &mut registry, &WatchRoot::new(&root));

    let mut registered = registry.registered();
    registered.sort();
    let mut expected = vec![
        root.clone(),
        root.join("outside"),
        root.join("outside/inner"),
        root.join("src"),
        root.join("src/nested"),
    ];
    expected.sort();
    assert_eq!(registered, expected);
}

#[test]
fn hidden_names_are_matched_on_raw_bytes() {
    assert!(is_hidden_name(OsStr::new(".git")));
    assert!(!is_hidden_name(OsStr::new("src")));
    assert!(!is_hidden_name(OsStr::new("")));

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        assert!(is_hidden_name(OsStr::from_bytes(b".caf\xe9")));
        assert!(!is_hidden_name(OsStr::from_bytes(b"caf\xe9")));
    }
}

// Linux filesystems accept arbitrary bytes in names; APFS does not.
#[cfg(target_os = "linux")]
#[test]
fn non_utf8_directories_are_registered_under_their_real_path() {
    use std::os::unix::ffi::OsStrExt;

    init_tracing();
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().canonicalize().unwrap();
    let odd = root.join(OsStr::from_bytes(b"caf\xe9"));
    let hidden_odd = root.join(OsStr::from_bytes(b".h\xff"));
    std::fs::create_dir_all(odd.join("inner")).unwrap();
    std::fs::create_dir_all(hidden_odd.join("deep")).unwrap();

    let mut registry = RecordingRegistry::new();
    let stats = register_tree(&RealFileSystem, &mut registry, &WatchRoot::new(&root));

    let mut registered = registry.registered();
    registered.sort();
    let mut expected = vec![root.clone(), odd.clone(), odd.join("inner")];
    expected.sort();
    assert_eq!(registered, expected);
    assert!(registered.iter().all(|p| p.exists()));
    assert_eq!(stats.skipped_hidden, 1);
}

#[test]
fn an_entry_with_unreadable_type_is_skipped_alone() {
    init_tracing();
    let parent = Path::new("/work/app");
    let gone = std::io::Error::from(std::io::ErrorKind::NotFound);

    assert_eq!(classify_entry(parent, OsString::from("vanished"), Err(gone)), None);

    let tmp = tempfile::tempdir().unwrap();
    let file_type = std::fs::symlink_metadata(tmp.path()).map(|m| m.file_type());
    let entry = classify_entry(parent, OsString::from("src"), file_type).unwrap();
    assert_eq!(entry.path(), PathBuf::from("/work/app/src"));
    assert!(entry.is_dir);
    assert!(!entry.is_symlink);
}
