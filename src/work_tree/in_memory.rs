use std::{
    collections::{BTreeMap, BTreeSet},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use super::WorkTree;

/// A [`WorkTree`] kept entirely in memory, for driving a repository without
/// touching the disk.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkTree {
    directories: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    unreadable: BTreeSet<PathBuf>,
}

impl InMemoryWorkTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a file, creating its parent directories.
    pub fn write(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        let path = path.into();
        if let Some(parent) = path.parent() {
            self.insert_directory(parent);
        }
        self.files.insert(path, contents.into());
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.unreadable.remove(path.as_ref());
        self.files.remove(path.as_ref())
    }

    /// Keeps the file listed but makes every read of it fail.
    pub fn make_unreadable(&mut self, path: impl Into<PathBuf>) {
        self.unreadable.insert(path.into());
    }

    /// Removes a directory together with everything below it.
    pub fn remove_directory(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.directories.retain(|d| !d.starts_with(path));
        self.files.retain(|f, _| !f.starts_with(path));
    }

    fn insert_directory(&mut self, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.directories.insert(ancestor.to_path_buf());
        }
    }
}

impl WorkTree for InMemoryWorkTree {
    fn directory_exists(&self, path: &Path) -> bool {
        self.directories.contains(path)
    }

    fn create_directory(&mut self, path: &Path) -> Result<(), std::io::Error> {
        self.insert_directory(path);
        Ok(())
    }

    fn list_regular_files(&self, path: &Path) -> Result<Vec<String>, std::io::Error> {
        if !self.directory_exists(path) {
            return Err(ErrorKind::NotFound.into());
        }
        Ok(self
            .files
            .keys()
            .filter(|f| f.parent() == Some(path))
            .filter_map(|f| f.file_name())
            .filter_map(|name| name.to_str())
            .map(String::from)
            .collect())
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, std::io::Error> {
        if self.unreadable.contains(path) {
            return Err(ErrorKind::PermissionDenied.into());
        }
        match self.files.get(path) {
            Some(v) => Ok(v.clone()),
            None => Err(ErrorKind::NotFound.into()),
        }
    }
}

#[test]
fn test_in_memory_work_tree() {
    let mut tree = InMemoryWorkTree::new();
    tree.write("/repo/a.txt", "hello");
    tree.write("/repo/sub/b.txt", "nested");
    assert!(tree.directory_exists(Path::new("/repo/sub")));
    assert_eq!(
        tree.list_regular_files(Path::new("/repo")).unwrap(),
        vec![String::from("a.txt")]
    );
    assert_eq!(
        tree.read_all_bytes(Path::new("/repo/a.txt")).unwrap(),
        b"hello".to_vec()
    );

    tree.make_unreadable("/repo/a.txt");
    assert!(tree.read_all_bytes(Path::new("/repo/a.txt")).is_err());
    assert_eq!(tree.remove("/repo/a.txt"), Some(b"hello".to_vec()));
    assert!(tree.list_regular_files(Path::new("/repo")).unwrap().is_empty());

    tree.remove_directory("/repo");
    assert!(!tree.directory_exists(Path::new("/repo")));
    assert!(tree.list_regular_files(Path::new("/repo")).is_err());
}
