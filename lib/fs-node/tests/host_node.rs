use fs_node::{FsEntry, FsError, FsNode, HomeFinder, ListMode, PATH_SEPARATOR};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn node(path: &Path) -> FsNode {
    FsNode::new(path.to_str().expect("temp paths are UTF-8"))
}

fn entry(path: &Path) -> FsEntry {
    FsEntry::new(path.to_str().expect("temp paths are UTF-8"))
}

/// A directory with two files, one sub-directory and two hidden entries.
fn rom_library() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("pitfall.a26"), vec![0xea; 4096]).unwrap();
    fs::write(root.join("combat.bin"), vec![0x00; 2048]).unwrap();
    fs::create_dir(root.join("homebrew")).unwrap();
    fs::write(root.join(".stella.pro"), b"hidden").unwrap();
    fs::create_dir(root.join(".snapshots")).unwrap();
    temp
}

fn names(nodes: &[FsNode]) -> Vec<String> {
    let mut names: Vec<String> = nodes.iter().map(|n| n.name().to_string()).collect();
    names.sort();
    names
}

#[test]
#[tracing_test::traced_test]
fn test_children_parent_round_trip() {
    let temp = rom_library();
    let dir = node(temp.path());
    assert!(dir.is_directory());
    assert!(dir.path().ends_with(PATH_SEPARATOR));

    let children = dir.children(ListMode::All).unwrap();
    assert_eq!(names(&children), vec!["combat.bin", "homebrew", "pitfall.a26"]);

    for child in &children {
        let parent = child.parent().expect("entries always have a parent");
        assert_eq!(parent.path(), dir.path(), "parent of {}", child.path());
    }
}

#[test]
#[tracing_test::traced_test]
fn test_children_paths_and_sizes() {
    let temp = rom_library();
    let dir = node(temp.path());

    for child in dir.children(ListMode::All).unwrap() {
        let mut expected = format!("{}{}", dir.path(), child.name());
        if child.is_directory() {
            expected.push(PATH_SEPARATOR);
        }
        assert_eq!(child.path(), expected);
        match child.name() {
            "pitfall.a26" => assert_eq!(child.size(), 4096),
            "combat.bin" => assert_eq!(child.size(), 2048),
            "homebrew" => assert_eq!(child.size(), 0),
            other => panic!("unexpected child {other}"),
        }
    }
}

#[test]
#[tracing_test::traced_test]
fn test_list_modes() {
    let temp = rom_library();
    let dir = node(temp.path());

    let files = dir.children(ListMode::FilesOnly).unwrap();
    assert_eq!(names(&files), vec!["combat.bin", "pitfall.a26"]);
    assert!(files.iter().all(|f| f.is_file() && !f.is_directory()));

    let dirs = dir.children(ListMode::DirectoriesOnly).unwrap();
    assert_eq!(names(&dirs), vec!["homebrew"]);
    assert!(dirs.iter().all(|d| d.is_directory() && !d.is_file()));

    for mode in [ListMode::All, ListMode::FilesOnly, ListMode::DirectoriesOnly] {
        let listed = dir.children(mode).unwrap();
        assert!(listed.iter().all(|n| !n.name().starts_with('.')), "{mode:?}");
    }
}

#[test]
#[tracing_test::traced_test]
fn test_empty_directory_lists_nothing() {
    let temp = TempDir::new().unwrap();
    assert!(node(temp.path()).children(ListMode::All).unwrap().is_empty());
}

#[test]
#[tracing_test::traced_test]
fn test_children_of_missing_directory() {
    let temp = TempDir::new().unwrap();
    let missing = node(&temp.path().join("gone"));

    assert_eq!(missing.children(ListMode::All).unwrap_err(), FsError::NotFound);
    assert!(logs_contain("cannot list directory"));
}

#[test]
#[tracing_test::traced_test]
fn test_missing_path() {
    let temp = TempDir::new().unwrap();
    let missing = node(&temp.path().join("does-not-exist.a26"));

    assert!(!missing.is_directory());
    assert!(!missing.is_file());
    assert!(!missing.exists());
    assert!(!missing.is_readable());
    assert_eq!(missing.name(), "does-not-exist.a26");
    assert_eq!(
        missing.as_entry().map(FsEntry::kind),
        Some(fs_node::EntryKind::Missing)
    );
}

#[test]
#[tracing_test::traced_test]
fn test_existing_file_predicates() {
    let temp = rom_library();
    let rom = node(&temp.path().join("pitfall.a26"));

    assert!(rom.is_file());
    assert!(!rom.is_directory());
    assert!(rom.exists());
    assert!(rom.is_readable());
    assert!(rom.is_writable());
    assert!(!rom.path().ends_with(PATH_SEPARATOR));
}

#[test]
#[tracing_test::traced_test]
fn test_short_path() {
    let home = HomeFinder::shared();
    let Some(home_path) = home.home_path() else {
        return;
    };
    if !Path::new(home_path).is_dir() {
        return;
    }

    let short = FsNode::new(home_path).short_path();
    assert!(
        short == "~" || short == format!("~{PATH_SEPARATOR}"),
        "unexpected short path {short}"
    );
    assert_eq!(FsNode::new("~").short_path(), short);

    let temp = TempDir::new().unwrap();
    let unrelated = node(temp.path());
    if !unrelated.path().to_lowercase().starts_with(&home_path.to_lowercase()) {
        assert_eq!(unrelated.short_path(), unrelated.path());
    }
}

#[test]
#[tracing_test::traced_test]
fn test_write_then_read() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let rom = entry(&temp.path().join("dump.bin"));
    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    assert_eq!(rom.write(&data)?, data.len());

    let mut read_back = Vec::new();
    assert_eq!(rom.read(&mut read_back, 0)?, data.len());
    assert_eq!(read_back, data);
    Ok(())
}

#[test]
#[tracing_test::traced_test]
fn test_zero_byte_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("empty.bin");
    fs::File::create(&path).unwrap();
    let empty = entry(&path);

    assert!(empty.is_file());
    let mut buffer = vec![1, 2, 3];
    assert_eq!(empty.read(&mut buffer, 0), Err(FsError::ZeroByteFile));
    assert_eq!(empty.read(&mut buffer, 16), Err(FsError::ZeroByteFile));
    assert_eq!(
        empty.read_to_string(&mut String::new()),
        Err(FsError::ZeroByteFile)
    );
}

#[test]
#[tracing_test::traced_test]
fn test_volume_root_traversal() {
    let root = node(Path::new(if cfg!(windows) { "C:\\" } else { "/" }));
    if !root.exists() {
        return;
    }
    assert!(root.is_directory());

    let volumes = root.parent().expect("a volume has the volume list as parent");
    assert!(volumes.is_pseudo_root());
    assert!(volumes.is_directory());
    assert!(volumes.parent().is_none());

    let mounted = volumes.children(ListMode::All).unwrap();
    assert!(!mounted.is_empty());
    assert!(mounted.iter().all(FsNode::is_directory));
    assert!(mounted.iter().any(|v| v.path() == root.path()));
    assert!(volumes.children(ListMode::DirectoriesOnly).unwrap().len() == mounted.len());
}

#[test]
#[tracing_test::traced_test]
fn test_top_level_directory_parent_is_volume() {
    let temp = TempDir::new().unwrap();
    let mut current = node(temp.path());
    // Walking up always ends at the volume list.
    for _ in 0..64 {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    assert!(current.is_pseudo_root());
}

#[test]
#[tracing_test::traced_test]
fn test_make_dir() {
    let temp = TempDir::new().unwrap();
    let mut saves = entry(&temp.path().join("saves"));
    assert!(!saves.exists());

    saves.make_dir().unwrap();
    assert!(saves.is_directory());
    assert!(saves.exists());
    assert!(saves.path().ends_with(PATH_SEPARATOR));

    assert!(saves.make_dir().is_err(), "directory already exists");
    assert!(saves.is_directory());

    let mut nested = entry(&temp.path().join("a").join("b"));
    assert!(nested.make_dir().is_err());
    assert!(!nested.exists());
}

#[test]
#[tracing_test::traced_test]
fn test_rename_success() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("pitfall.bin");
    let to = temp.path().join("pitfall.a26");
    fs::write(&from, b"rom").unwrap();

    let mut rom = entry(&from);
    rom.rename(to.to_str().unwrap()).unwrap();

    assert_eq!(rom.path(), entry(&to).path());
    assert_eq!(rom.name(), "pitfall.a26");
    assert!(rom.is_file());
    assert!(rom.exists());
    assert!(!entry(&from).exists());
}

#[test]
#[tracing_test::traced_test]
fn test_rename_directory() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("old")).unwrap();

    let mut dir = entry(&temp.path().join("old"));
    dir.rename(temp.path().join("new").to_str().unwrap()).unwrap();

    assert!(dir.is_directory());
    assert_eq!(dir.name(), "new");
    assert!(dir.path().ends_with(PATH_SEPARATOR));
    assert!(temp.path().join("new").is_dir());
}

#[test]
#[tracing_test::traced_test]
fn test_rename_failure_leaves_entry_unchanged() {
    let temp = TempDir::new().unwrap();
    let from = temp.path().join("combat.bin");
    fs::write(&from, b"rom").unwrap();

    let mut rom = entry(&from);
    let before = (rom.path().to_string(), rom.name().to_string(), rom.kind());
    let target = temp.path().join("missing-dir").join("combat.bin");

    assert!(rom.rename(target.to_str().unwrap()).is_err());
    assert!(logs_contain("cannot rename"));
    assert_eq!((rom.path().to_string(), rom.name().to_string(), rom.kind()), before);
    assert!(rom.exists());
}
