use std::path::Path;

pub mod fs;
pub mod in_memory;

/// The file system operations the repository needs from the outside world.
pub trait WorkTree {
    fn directory_exists(&self, path: &Path) -> bool;

    /// Creates the directory and any missing parents. Succeeds if it already exists.
    fn create_directory(&mut self, path: &Path) -> Result<(), std::io::Error>;

    /// Names of the regular files directly inside `path`.
    fn list_regular_files(&self, path: &Path) -> Result<Vec<String>, std::io::Error>;

    fn read_all_bytes(&self, path: &Path) -> Result<Vec<u8>, std::io::Error>;
}
