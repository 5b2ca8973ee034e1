use std::{collections::BTreeMap, fmt::Display};

use serde::{Serialize, Serializer};

use crate::{
    delta::{compute_delta, FileDelta},
    snapshot::{FileRecord, Snapshot},
};

/// One entry in the linear history. The root commit carries the full contents of
/// every tracked file; later commits carry only what changed, with full
/// contents for newly added files and positional deltas for modified ones.
#[derive(PartialEq, Eq, Debug, Serialize)]
pub struct CommitRecord {
    pub id: u64,
    pub message: String,
    pub timestamp: String,
    pub full_snapshot: BTreeMap<String, FileRecord>,
    pub deltas: Vec<FileDelta>,
    pub added_files: Vec<String>,
    pub deleted_files: Vec<String>,
    /// The previous commit, owned by this one.
    #[serde(rename = "parent_id", serialize_with = "serialize_parent_id")]
    parent: Option<Box<CommitRecord>>,
}

fn serialize_parent_id<S: Serializer>(
    parent: &Option<Box<CommitRecord>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    parent.as_ref().map(|p| p.id).serialize(serializer)
}

impl CommitRecord {
    /// Records the change from `last_commit` to `staging` on top of `parent`.
    /// Without a parent this is the root commit and `last_commit` is not consulted.
    pub fn record(
        id: u64,
        message: String,
        timestamp: String,
        last_commit: &Snapshot,
        staging: &Snapshot,
        parent: Option<Box<CommitRecord>>,
    ) -> CommitRecord {
        let mut commit = CommitRecord {
            id,
            message,
            timestamp,
            full_snapshot: BTreeMap::new(),
            deltas: Vec::new(),
            added_files: Vec::new(),
            deleted_files: Vec::new(),
            parent,
        };

        if commit.is_root() {
            commit.full_snapshot = staging.files.clone();
            return commit;
        }

        for (name, record) in &staging.files {
            match last_commit.get(name) {
                None => {
                    commit.added_files.push(name.clone());
                    commit.full_snapshot.insert(name.clone(), record.clone());
                }
                Some(old) if old.fingerprint != record.fingerprint => {
                    commit
                        .deltas
                        .push(compute_delta(name, &old.content, &record.content));
                }
                Some(_) => {}
            }
        }
        commit.deleted_files = last_commit
            .files
            .keys()
            .filter(|name| !staging.contains(name))
            .cloned()
            .collect();
        commit
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<&CommitRecord> {
        self.parent.as_deref()
    }

    /// Names of the files this commit changed, in delta order.
    pub fn modified_files(&self) -> impl Iterator<Item = &str> {
        self.deltas.iter().map(|d| d.filename.as_str())
    }

    /// Walks from this commit back to the root.
    pub fn history(&self) -> History<'_> {
        History { next: Some(self) }
    }
}

impl Drop for CommitRecord {
    // Unlink the chain one commit at a time instead of recursing through every
    // nested box.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(mut commit) = next {
            next = commit.parent.take();
        }
    }
}

impl Display for CommitRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_root() {
            writeln!(f, "Creating initial commit...")?;
            for (name, record) in &self.full_snapshot {
                writeln!(f, "  Added: {} (hash: {})", name, record.fingerprint)?;
            }
        } else {
            writeln!(f, "Creating commit...")?;
            for name in &self.added_files {
                writeln!(f, "  Added: {}", name)?;
            }
            for delta in &self.deltas {
                writeln!(f, "  Modified: {} (delta stored)", delta.filename)?;
                writeln!(
                    f,
                    "    Changes: {} lines modified, {} lines added/changed",
                    delta.modified_line_indices.len(),
                    delta.added_lines.len()
                )?;
            }
            for name in &self.deleted_files {
                writeln!(f, "  Deleted: {}", name)?;
            }
        }
        writeln!(f, "\n[Commit {}] {}", self.id, self.message)?;
        writeln!(f, "Timestamp: {}", self.timestamp)
    }
}

/// Newest-first walk over a commit chain.
pub struct History<'a> {
    next: Option<&'a CommitRecord>,
}

impl<'a> Iterator for History<'a> {
    type Item = &'a CommitRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

/// What the log reports about a single commit.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
pub struct LogEntry {
    pub id: u64,
    pub message: String,
    pub timestamp: String,
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub deleted: Vec<String>,
}

impl From<&CommitRecord> for LogEntry {
    fn from(commit: &CommitRecord) -> Self {
        LogEntry {
            id: commit.id,
            message: commit.message.clone(),
            timestamp: commit.timestamp.clone(),
            added: commit.added_files.clone(),
            modified: commit.modified_files().map(String::from).collect(),
            deleted: commit.deleted_files.clone(),
        }
    }
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Commit ID: {}", self.id)?;
        writeln!(f, "Message: {}", self.message)?;
        writeln!(f, "Timestamp: {}", self.timestamp)?;
        for (title, names) in [
            ("Added files", &self.added),
            ("Modified files", &self.modified),
            ("Deleted files", &self.deleted),
        ] {
            if !names.is_empty() {
                writeln!(f, "{}: {}", title, names.join(" "))?;
            }
        }
        writeln!(f, "---")
    }
}

#[cfg(test)]
fn snapshot_of(files: &[(&str, &str)]) -> Snapshot {
    Snapshot {
        files: files
            .iter()
            .map(|(name, content)| (name.to_string(), FileRecord::new(*name, *content)))
            .collect(),
    }
}

#[test]
fn test_root_commit_holds_everything() {
    let staging = snapshot_of(&[("a.txt", "x"), ("b.txt", "y")]);
    let root = CommitRecord::record(
        1,
        "initial".into(),
        "now".into(),
        &Snapshot::default(),
        &staging,
        None,
    );
    assert!(root.is_root());
    assert_eq!(root.full_snapshot, staging.files);
    assert!(root.deltas.is_empty());
    assert!(root.added_files.is_empty());
    assert!(root.deleted_files.is_empty());
    assert!(root.to_string().contains("Added: a.txt (hash: "));
}

#[test]
fn test_child_commit_partitions_changes() {
    let last = snapshot_of(&[("kept", "same"), ("edited", "old"), ("gone", "bye")]);
    let staging = snapshot_of(&[("kept", "same"), ("edited", "new"), ("fresh", "hi")]);
    let root = CommitRecord::record(1, "c1".into(), "t1".into(), &Snapshot::default(), &last, None);
    let child = CommitRecord::record(
        2,
        "c2".into(),
        "t2".into(),
        &last,
        &staging,
        Some(Box::new(root)),
    );

    assert_eq!(child.added_files, vec!["fresh"]);
    assert_eq!(child.full_snapshot.keys().collect::<Vec<_>>(), vec!["fresh"]);
    assert_eq!(child.modified_files().collect::<Vec<_>>(), vec!["edited"]);
    assert_eq!(child.deleted_files, vec!["gone"]);
    assert_eq!(child.parent().map(|p| p.id), Some(1));

    let json = serde_json::to_value(&child).unwrap();
    assert_eq!(json["parent_id"], 1);
}

#[test]
fn test_history_is_newest_first() {
    let empty = Snapshot::default();
    let mut head: Option<Box<CommitRecord>> = None;
    for id in 1..=3 {
        let commit = CommitRecord::record(id, format!("c{}", id), "t".into(), &empty, &empty, head);
        head = Some(Box::new(commit));
    }
    let head = head.unwrap();
    let ids: Vec<u64> = head.history().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let entries: Vec<LogEntry> = head.history().map(LogEntry::from).collect();
    assert_eq!(entries[2].message, "c1");
    assert!(entries[0].to_string().starts_with("Commit ID: 3\n"));
}

#[test]
fn test_long_chain_drops() {
    let empty = Snapshot::default();
    let mut head: Option<Box<CommitRecord>> = None;
    for id in 1..=200_000 {
        let commit = CommitRecord::record(id, String::new(), String::new(), &empty, &empty, head);
        head = Some(Box::new(commit));
    }
    drop(head);
}
