//! # Mini Revision Control
//!
//! This is an implementation of a minimal, in-memory revision control system
//! tracking the files of a single directory in a linear history.

/// Clocks used to timestamp commits.
pub mod clock;
/// Commit records, the linked history and its traversal.
pub mod commit;
pub mod config;
/// Positional line-level deltas between two versions of a file.
pub mod delta;
/// Content fingerprints used to detect changed files.
pub mod fingerprint;
/// The repository state machine tying the rest together.
pub mod repository;
/// Scanning a directory into a mapping of file names to [`snapshot::FileRecord`]s.
pub mod snapshot;
pub mod status;
/// File system access the repository is built on.
pub mod work_tree;
