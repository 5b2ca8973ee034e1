use std::{
    fs::{create_dir_all, read_dir, File},
    io::Read,
    path::Path,
};

use super::WorkTree;

/// A [`WorkTree`] backed by the real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWorkTree;

impl WorkTree for FsWorkTree {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&mut self, path: &Path) -> Result<(), std::io::Error> {
        if !path.try_exists()? {
            log::info!("creating directory {:?}", path);
            create_dir_all(path)?;
        }
        Ok(())
    }

    fn list_regular_files(&self, path: &Path) -> Result<Vec<String>, std::io::Error> {
        log::info!("listing files in {:?}", path);
        let mut names = Vec::new();
        for f in read_dir(path)? {
            let dir_entry = f?;
            if !dir_entry.file_type()?.is_file() {
                continue;
            }
            match dir_entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => log::warn!("skipping file with non UTF-8 name {:?}", name),
            }
        }
        Ok(names)
    }

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, std::io::Error> {
        let mut f = File::options().read(true).open(path)?;
        let mut v = Vec::new();
        f.read_to_end(&mut v)?;
        Ok(v)
    }
}

#[test]
fn test_fs_work_tree() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut tree = FsWorkTree;
    let nested = tempdir.path().join("nested");
    tree.create_directory(&nested).unwrap();
    tree.create_directory(&nested).unwrap();
    assert!(tree.directory_exists(&nested));

    std::fs::write(tempdir.path().join("a.txt"), b"hello").unwrap();
    let mut names = tree.list_regular_files(tempdir.path()).unwrap();
    names.sort();
    assert_eq!(names, vec![String::from("a.txt")]);
    assert_eq!(
        tree.read_all_bytes(&tempdir.path().join("a.txt")).unwrap(),
        b"hello".to_vec()
    );
    assert!(tree.read_all_bytes(&tempdir.path().join("missing")).is_err());
}
