use std::{collections::BTreeSet, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// How the working tree differs from the last commit.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Status {
    /// Present now, absent at the last commit.
    pub added: BTreeSet<String>,
    /// Present in both with different fingerprints.
    pub modified: BTreeSet<String>,
    /// Present at the last commit, absent now.
    pub deleted: BTreeSet<String>,
}

impl Status {
    pub fn between(last_commit: &Snapshot, staging: &Snapshot) -> Status {
        let mut status = Status::default();
        for (name, record) in &staging.files {
            match last_commit.get(name) {
                None => {
                    status.added.insert(name.clone());
                }
                Some(old) if old.fingerprint != record.fingerprint => {
                    status.modified.insert(name.clone());
                }
                Some(_) => {}
            }
        }
        status.deleted = last_commit
            .files
            .keys()
            .filter(|name| !staging.contains(name))
            .cloned()
            .collect();
        status
    }

    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Repository Status ===")?;
        if self.is_clean() {
            return writeln!(f, "Nothing to commit, working tree clean");
        }
        let sections = [
            ("New files", "+", &self.added),
            ("Modified files", "M", &self.modified),
            ("Deleted files", "-", &self.deleted),
        ];
        for (title, marker, names) in sections {
            if names.is_empty() {
                continue;
            }
            writeln!(f, "\n{}:", title)?;
            for name in names {
                writeln!(f, "  {} {}", marker, name)?;
            }
        }
        Ok(())
    }
}

#[test]
fn test_status_between() {
    use crate::snapshot::FileRecord;

    let mut last = Snapshot::default();
    for (name, content) in [("kept", "same"), ("edited", "old"), ("gone", "bye")] {
        last.files.insert(name.into(), FileRecord::new(name, content));
    }
    let mut staging = Snapshot::default();
    for (name, content) in [("kept", "same"), ("edited", "new"), ("fresh", "hi")] {
        staging.files.insert(name.into(), FileRecord::new(name, content));
    }

    let status = Status::between(&last, &staging);
    assert_eq!(status.added, BTreeSet::from([String::from("fresh")]));
    assert_eq!(status.modified, BTreeSet::from([String::from("edited")]));
    assert_eq!(status.deleted, BTreeSet::from([String::from("gone")]));
    assert!(!status.is_clean());

    let shown = status.to_string();
    assert!(shown.contains("  + fresh"));
    assert!(shown.contains("  M edited"));
    assert!(shown.contains("  - gone"));
}

#[test]
fn test_clean_status() {
    let status = Status::between(&Snapshot::default(), &Snapshot::default());
    assert!(status.is_clean());
    assert!(status.to_string().contains("working tree clean"));
}
