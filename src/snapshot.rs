use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    fingerprint::{fingerprint, Fingerprint},
    work_tree::WorkTree,
};

/// Name of the metadata directory kept inside every repository.
pub const METADATA_DIR: &str = ".minigit";

/// One file's tracked state at a point in time.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    pub fingerprint: Fingerprint,
    pub content: String,
    /// Never set by the repository. Deletion is the absence of a file from a
    /// snapshot plus its name in a commit's deleted files.
    pub deleted: bool,
}

impl FileRecord {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        FileRecord {
            filename: filename.into(),
            fingerprint: fingerprint(content.as_bytes()),
            content,
            deleted: false,
        }
    }

    /// Fingerprints the raw bytes, keeping a lossy UTF-8 rendering as content.
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        FileRecord {
            filename: filename.into(),
            fingerprint: fingerprint(bytes),
            content: String::from_utf8_lossy(bytes).into_owned(),
            deleted: false,
        }
    }
}

/// Name patterns excluded from scans. A file is ignored if its name contains
/// any of the patterns.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Ignores {
    set: BTreeSet<String>,
}

impl Default for Ignores {
    fn default() -> Self {
        Ignores {
            set: vec![String::from(METADATA_DIR)].into_iter().collect(),
        }
    }
}

impl Ignores {
    pub fn insert(&mut self, pattern: impl Into<String>) {
        self.set.insert(pattern.into());
    }

    pub fn is_ignored(&self, filename: &str) -> bool {
        self.set.iter().any(|pattern| filename.contains(pattern.as_str()))
    }
}

/// Every tracked file in a directory, by name, at one instant.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub files: BTreeMap<String, FileRecord>,
}

impl Snapshot {
    /// Scans the regular files directly inside `dir`. A missing directory gives an
    /// empty snapshot and an unreadable file is tracked with empty content; the
    /// caller decides whether either is worth reporting.
    pub fn build<W: WorkTree>(work_tree: &W, dir: &Path, ignores: &Ignores) -> Snapshot {
        let mut files = BTreeMap::new();
        if !work_tree.directory_exists(dir) {
            log::warn!("{:?} does not exist, snapshot is empty", dir);
            return Snapshot { files };
        }
        let names = match work_tree.list_regular_files(dir) {
            Ok(names) => names,
            Err(err) => {
                log::warn!("could not list {:?}: {}", dir, err);
                return Snapshot { files };
            }
        };
        for name in names {
            if ignores.is_ignored(&name) {
                log::debug!("ignoring {}", name);
                continue;
            }
            let bytes = work_tree.read_all_bytes(&dir.join(&name)).unwrap_or_else(|err| {
                log::warn!("could not read {}, treating it as empty: {}", name, err);
                Vec::new()
            });
            files.insert(name.clone(), FileRecord::from_bytes(name, &bytes));
        }
        log::info!("scanned {} files in {:?}", files.len(), dir);
        Snapshot { files }
    }

    pub fn get(&self, filename: &str) -> Option<&FileRecord> {
        self.files.get(filename)
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[test]
fn test_snapshot_skips_metadata_and_subdirectories() {
    use crate::work_tree::in_memory::InMemoryWorkTree;

    let mut tree = InMemoryWorkTree::new();
    tree.write("/repo/a.txt", "x");
    tree.write("/repo/.minigit/state", "ignored");
    tree.write("/repo/notes.minigit.bak", "ignored too");
    tree.write("/repo/sub/b.txt", "not scanned");

    let snapshot = Snapshot::build(&tree, Path::new("/repo"), &Ignores::default());
    assert_eq!(snapshot.len(), 1);
    let record = snapshot.get("a.txt").unwrap();
    assert_eq!(record.content, "x");
    assert_eq!(record.fingerprint, fingerprint(b"x"));
    assert!(!record.deleted);
}

#[test]
fn test_snapshot_fingerprints_raw_bytes() {
    use crate::work_tree::in_memory::InMemoryWorkTree;

    let mut tree = InMemoryWorkTree::new();
    tree.write("/repo/blob.bin", vec![0xFF]);
    let before = Snapshot::build(&tree, Path::new("/repo"), &Ignores::default());
    tree.write("/repo/blob.bin", vec![0xFE]);
    let after = Snapshot::build(&tree, Path::new("/repo"), &Ignores::default());

    let (before, after) = (before.get("blob.bin").unwrap(), after.get("blob.bin").unwrap());
    assert_eq!(before.content, after.content);
    assert_eq!(before.fingerprint, fingerprint(&[0xFF]));
    assert_ne!(before.fingerprint, after.fingerprint);
}

#[test]
fn test_unreadable_file_is_tracked_as_empty() {
    use crate::work_tree::in_memory::InMemoryWorkTree;

    let mut tree = InMemoryWorkTree::new();
    tree.write("/repo/a.txt", "x");
    tree.write("/repo/locked.txt", "secret");
    tree.make_unreadable("/repo/locked.txt");

    let snapshot = Snapshot::build(&tree, Path::new("/repo"), &Ignores::default());
    assert_eq!(snapshot.len(), 2);
    let record = snapshot.get("locked.txt").unwrap();
    assert_eq!(record.content, "");
    assert_eq!(record.fingerprint, fingerprint(b""));
    assert_eq!(snapshot.get("a.txt").unwrap().content, "x");
}

#[test]
fn test_snapshot_of_missing_directory_is_empty() {
    use crate::work_tree::in_memory::InMemoryWorkTree;

    let tree = InMemoryWorkTree::new();
    let snapshot = Snapshot::build(&tree, Path::new("/nowhere"), &Ignores::default());
    assert!(snapshot.is_empty());
}

#[test]
fn test_snapshot_from_disk() {
    use crate::work_tree::fs::FsWorkTree;

    let tempdir = tempfile::tempdir().unwrap();
    std::fs::write(tempdir.path().join("a.txt"), "one\ntwo\n").unwrap();
    std::fs::write(tempdir.path().join("target.log"), "build output").unwrap();
    std::fs::create_dir(tempdir.path().join(METADATA_DIR)).unwrap();

    let mut ignores = Ignores::default();
    ignores.insert("target");
    let snapshot = Snapshot::build(&FsWorkTree, tempdir.path(), &ignores);
    let names: Vec<&String> = snapshot.files.keys().collect();
    assert_eq!(names, vec!["a.txt"]);
    assert_eq!(snapshot.get("a.txt").unwrap().content, "one\ntwo\n");
}
