use std::path::{Path, PathBuf};

use derive_more::{Display, From};

use crate::{
    clock::Clock,
    commit::{CommitRecord, LogEntry},
    config::Config,
    snapshot::{Ignores, Snapshot},
    status::Status,
    work_tree::WorkTree,
};

#[derive(Debug, Display, From)]
pub enum Error {
    #[display(fmt = "repository not initialized, use 'init' first")]
    NotInitialized,
    #[display(fmt = "commit message must not be empty")]
    EmptyCommitMessage,
    #[display(fmt = "repository path does not exist: {}", _0)]
    RepositoryPathMissing(String),
    #[from]
    #[display(fmt = "{}", _0)]
    IO(std::io::Error),
}

impl std::error::Error for Error {}

/// Everything the repository remembers between operations. None of it outlives
/// the process.
#[derive(Debug, Default)]
pub struct RepositoryState {
    /// The working tree as of the latest status or commit.
    pub staging: Snapshot,
    /// Full contents of every file as of the latest commit.
    pub last_commit: Snapshot,
    pub head: Option<Box<CommitRecord>>,
    pub next_commit_id: u64,
}

impl RepositoryState {
    fn new() -> Self {
        RepositoryState {
            next_commit_id: 1,
            ..RepositoryState::default()
        }
    }
}

/// A version tracked directory. It starts out unbound, and every operation
/// besides [`Repository::init`] fails with [`Error::NotInitialized`] until it is
/// bound to a path.
pub struct Repository<W, C> {
    work_tree: W,
    clock: C,
    metadata_dir: String,
    ignores: Ignores,
    root: Option<PathBuf>,
    state: RepositoryState,
}

impl<W: WorkTree, C: Clock> Repository<W, C> {
    pub fn new(work_tree: W, clock: C, config: Config) -> Self {
        Repository {
            work_tree,
            clock,
            ignores: config.effective_ignores(),
            metadata_dir: config.metadata_dir,
            root: None,
            state: RepositoryState::new(),
        }
    }

    /// Binds the repository to `path`, creating it and its metadata directory if
    /// needed. Initializing again moves the binding but keeps the history.
    pub fn init(&mut self, path: &Path) -> Result<(), Error> {
        if !self.work_tree.directory_exists(path) {
            self.work_tree.create_directory(path)?;
            log::info!("created directory {:?}", path);
        }
        self.work_tree
            .create_directory(&path.join(&self.metadata_dir))?;
        log::info!("initialized repository in {:?}", path);
        self.root = Some(path.to_path_buf());
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn state(&self) -> &RepositoryState {
        &self.state
    }

    pub fn head(&self) -> Option<&CommitRecord> {
        self.state.head.as_deref()
    }

    pub fn work_tree(&self) -> &W {
        &self.work_tree
    }

    pub fn work_tree_mut(&mut self) -> &mut W {
        &mut self.work_tree
    }

    /// Compares the working tree against the last commit.
    pub fn status(&mut self) -> Result<Status, Error> {
        let staging = self.scan()?;
        let status = Status::between(&self.state.last_commit, &staging);
        self.state.staging = staging;
        Ok(status)
    }

    /// Records the working tree as a new commit on top of the head. Commits
    /// without any changes are allowed.
    pub fn commit(&mut self, message: &str) -> Result<&CommitRecord, Error> {
        let root = self.root.as_ref().ok_or(Error::NotInitialized)?;
        if message.trim().is_empty() {
            return Err(Error::EmptyCommitMessage);
        }
        log::debug!("committing {:?} in {:?}", message, root);
        let staging = self.scan()?;

        let id = self.state.next_commit_id;
        let commit = CommitRecord::record(
            id,
            message.to_owned(),
            self.clock.now(),
            &self.state.last_commit,
            &staging,
            self.state.head.take(),
        );
        log::info!(
            "commit {}: {} added, {} modified, {} deleted",
            id,
            commit.added_files.len(),
            commit.deltas.len(),
            commit.deleted_files.len()
        );

        self.state.next_commit_id += 1;
        self.state.last_commit = staging.clone();
        self.state.staging = staging;
        let head = self.state.head.insert(Box::new(commit));
        Ok(&**head)
    }

    /// The history from the head back to the root commit.
    pub fn log(&self) -> Result<Vec<LogEntry>, Error> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        Ok(self
            .head()
            .map(|head| head.history().map(LogEntry::from).collect())
            .unwrap_or_default())
    }

    fn scan(&self) -> Result<Snapshot, Error> {
        let root = self.root.as_ref().ok_or(Error::NotInitialized)?;
        if !self.work_tree.directory_exists(root) {
            return Err(Error::RepositoryPathMissing(root.display().to_string()));
        }
        Ok(Snapshot::build(&self.work_tree, root, &self.ignores))
    }
}

#[cfg(test)]
type TestRepository =
    Repository<crate::work_tree::in_memory::InMemoryWorkTree, crate::clock::FixedClock>;

#[cfg(test)]
fn in_memory_repository() -> TestRepository {
    Repository::new(
        crate::work_tree::in_memory::InMemoryWorkTree::new(),
        crate::clock::FixedClock(String::from("2024-01-01 00:00:00")),
        Config::default(),
    )
}

#[test]
fn test_operations_require_init() {
    let mut repo = in_memory_repository();
    assert!(matches!(repo.status(), Err(Error::NotInitialized)));
    assert!(matches!(repo.commit("c1"), Err(Error::NotInitialized)));
    assert!(matches!(repo.log(), Err(Error::NotInitialized)));
    assert_eq!(repo.state().next_commit_id, 1);
    assert!(repo.head().is_none());
}

#[test]
fn test_init_creates_directories() {
    let mut repo = in_memory_repository();
    repo.init(Path::new("/repo")).unwrap();
    assert!(repo.is_initialized());
    assert_eq!(repo.root(), Some(Path::new("/repo")));
    assert!(repo.work_tree().directory_exists(Path::new("/repo/.minigit")));
    assert_eq!(repo.log().unwrap(), Vec::new());
}

#[test]
fn test_rejected_commits_leave_state_alone() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/a.txt", "x");
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();

    repo.work_tree_mut().write("/repo/a.txt", "y");
    assert!(matches!(repo.commit("   "), Err(Error::EmptyCommitMessage)));

    repo.work_tree_mut().remove_directory("/repo");
    assert!(matches!(
        repo.commit("c2"),
        Err(Error::RepositoryPathMissing(_))
    ));
    assert!(matches!(
        repo.status(),
        Err(Error::RepositoryPathMissing(_))
    ));

    assert_eq!(repo.state().next_commit_id, 2);
    assert_eq!(repo.head().map(|c| c.id), Some(1));
    assert_eq!(repo.state().last_commit.get("a.txt").unwrap().content, "x");
}

#[test]
fn test_ids_increase_by_one() {
    let mut repo = in_memory_repository();
    repo.init(Path::new("/repo")).unwrap();
    for i in 1..=5u64 {
        repo.work_tree_mut().write("/repo/counter", i.to_string());
        assert_eq!(repo.commit(&format!("c{}", i)).unwrap().id, i);
    }
    let ids: Vec<u64> = repo.log().unwrap().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_empty_commit_is_accepted() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/a.txt", "x");
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();
    let commit = repo.commit("again").unwrap();
    assert_eq!(commit.id, 2);
    assert!(commit.deltas.is_empty());
    assert!(commit.added_files.is_empty());
    assert!(commit.deleted_files.is_empty());
    assert!(commit.full_snapshot.is_empty());
}

#[test]
fn test_status_is_idempotent() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/a.txt", "x");
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();
    repo.work_tree_mut().write("/repo/a.txt", "y");
    repo.work_tree_mut().write("/repo/b.txt", "z");

    let first = repo.status().unwrap();
    let second = repo.status().unwrap();
    assert_eq!(first, second);
    assert_eq!(repo.head().map(|c| c.id), Some(1));
    assert_eq!(repo.state().last_commit.get("a.txt").unwrap().content, "x");
}

#[test]
fn test_scenarios_on_disk() {
    use crate::{clock::LocalClock, work_tree::fs::FsWorkTree};
    use std::collections::BTreeSet;

    let tempdir = tempfile::tempdir().unwrap();
    let dir = tempdir.path().join("project");
    let mut repo = Repository::new(FsWorkTree, LocalClock, Config::default());

    // A: empty directory, initial commit.
    repo.init(&dir).unwrap();
    assert!(dir.join(".minigit").is_dir());
    let root = repo.commit("initial").unwrap();
    assert!(root.is_root());
    assert!(root.full_snapshot.is_empty());
    let log = repo.log().unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0].added.is_empty() && log[0].modified.is_empty() && log[0].deleted.is_empty());

    // B: a tracked file is edited.
    std::fs::write(dir.join("a.txt"), "x").unwrap();
    repo.commit("c1").unwrap();
    std::fs::write(dir.join("a.txt"), "y").unwrap();
    let status = repo.status().unwrap();
    assert_eq!(status.modified, BTreeSet::from([String::from("a.txt")]));
    assert!(status.added.is_empty());
    assert!(status.deleted.is_empty());

    // C: the edit is committed as a delta.
    let c2 = repo.commit("c2").unwrap();
    assert_eq!(c2.id, 3);
    assert_eq!(c2.deltas.len(), 1);
    assert_eq!(c2.deltas[0].filename, "a.txt");
    assert_eq!(c2.deltas[0].added_lines, vec!["y"]);
    assert_eq!(c2.deltas[0].deleted_lines, vec!["x"]);
    assert_eq!(c2.deltas[0].modified_line_indices, vec![0]);

    // D: a new file is stored in full.
    std::fs::write(dir.join("b.txt"), "z").unwrap();
    let c3 = repo.commit("c3").unwrap();
    assert_eq!(c3.added_files, vec!["b.txt"]);
    assert_eq!(c3.full_snapshot["b.txt"].content, "z");

    // E: a deleted file drops out of tracking.
    std::fs::remove_file(dir.join("a.txt")).unwrap();
    let c4 = repo.commit("c4").unwrap();
    assert_eq!(c4.deleted_files, vec!["a.txt"]);
    let status = repo.status().unwrap();
    assert!(status.is_clean());
    assert!(!repo.state().last_commit.contains("a.txt"));
}

#[test]
fn test_scenario_c_ids() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/a.txt", "x");
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();
    repo.work_tree_mut().write("/repo/a.txt", "y");
    let c2 = repo.commit("c2").unwrap();
    assert_eq!(c2.id, 2);
    assert_eq!(
        c2.deltas,
        vec![crate::delta::FileDelta {
            filename: String::from("a.txt"),
            added_lines: vec![String::from("y")],
            deleted_lines: vec![String::from("x")],
            modified_line_indices: vec![0],
        }]
    );
    assert_eq!(c2.timestamp, "2024-01-01 00:00:00");
}

#[test]
fn test_byte_edit_is_detected() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/blob.bin", vec![0xFF]);
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();

    repo.work_tree_mut().write("/repo/blob.bin", vec![0xFE]);
    let status = repo.status().unwrap();
    assert!(status.modified.contains("blob.bin"));
    let commit = repo.commit("c2").unwrap();
    assert_eq!(commit.modified_files().collect::<Vec<_>>(), vec!["blob.bin"]);
}

#[test]
fn test_deleted_file_stops_being_tracked() {
    let mut repo = in_memory_repository();
    repo.work_tree_mut().write("/repo/a.txt", "x");
    repo.work_tree_mut().write("/repo/b.txt", "z");
    repo.init(Path::new("/repo")).unwrap();
    repo.commit("c1").unwrap();

    assert!(repo.work_tree_mut().remove("/repo/a.txt").is_some());
    assert!(repo.status().unwrap().deleted.contains("a.txt"));
    let commit = repo.commit("c2").unwrap();
    assert_eq!(commit.deleted_files, vec!["a.txt"]);

    let status = repo.status().unwrap();
    assert!(status.is_clean());
    assert!(!repo.state().last_commit.contains("a.txt"));
    let log = repo.log().unwrap();
    assert_eq!(log[0].deleted, vec!["a.txt"]);
}
