use serde::{Deserialize, Serialize};

/// A positional, line-level description of how one file's content changed.
///
/// Lines are compared index by index, so an insertion near the top of a file
/// shows up as a run of modified lines rather than a single added one.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileDelta {
    pub filename: String,
    /// New lines at modified indices, followed by any lines the file grew by.
    pub added_lines: Vec<String>,
    /// Old lines at modified indices, followed by any lines the file shrank by.
    pub deleted_lines: Vec<String>,
    /// Indices below the shorter length whose lines differ.
    pub modified_line_indices: Vec<usize>,
}

impl FileDelta {
    pub fn is_empty(&self) -> bool {
        self.added_lines.is_empty()
            && self.deleted_lines.is_empty()
            && self.modified_line_indices.is_empty()
    }
}

/// Splits content on line terminators. A trailing unterminated line counts as a
/// line, a final terminator does not start a new one.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.lines().collect()
}

pub fn compute_delta(filename: &str, old_content: &str, new_content: &str) -> FileDelta {
    let old_lines = split_lines(old_content);
    let new_lines = split_lines(new_content);
    let shared = old_lines.len().min(new_lines.len());

    let mut delta = FileDelta {
        filename: filename.to_owned(),
        ..FileDelta::default()
    };

    for (i, (old, new)) in old_lines.iter().zip(&new_lines).enumerate() {
        if old != new {
            delta.modified_line_indices.push(i);
            delta.deleted_lines.push((*old).to_owned());
            delta.added_lines.push((*new).to_owned());
        }
    }

    delta
        .added_lines
        .extend(new_lines[shared..].iter().map(|line| (*line).to_owned()));
    delta
        .deleted_lines
        .extend(old_lines[shared..].iter().map(|line| (*line).to_owned()));

    log::debug!(
        "delta for {}: {} modified, {} added, {} deleted",
        filename,
        delta.modified_line_indices.len(),
        delta.added_lines.len(),
        delta.deleted_lines.len()
    );
    delta
}

#[test]
fn test_single_line_change() {
    let delta = compute_delta("a.txt", "x", "y");
    assert_eq!(delta.filename, "a.txt");
    assert_eq!(delta.added_lines, vec!["y"]);
    assert_eq!(delta.deleted_lines, vec!["x"]);
    assert_eq!(delta.modified_line_indices, vec![0]);
}

#[test]
fn test_identical_content_is_empty() {
    let content = "one\ntwo\nthree\n";
    assert!(compute_delta("f", content, content).is_empty());
}

#[test]
fn test_empty_old_content() {
    let delta = compute_delta("f", "", "a\nb\n");
    assert_eq!(delta.added_lines, vec!["a", "b"]);
    assert!(delta.deleted_lines.is_empty());
    assert!(delta.modified_line_indices.is_empty());
}

#[test]
fn test_empty_new_content() {
    let delta = compute_delta("f", "a\nb", "");
    assert_eq!(delta.deleted_lines, vec!["a", "b"]);
    assert!(delta.added_lines.is_empty());
    assert!(delta.modified_line_indices.is_empty());
}

#[test]
fn test_tail_growth_and_modification() {
    let delta = compute_delta("f", "a\nb\n", "a\nB\nc\nd\n");
    assert_eq!(delta.modified_line_indices, vec![1]);
    assert_eq!(delta.deleted_lines, vec!["b"]);
    assert_eq!(delta.added_lines, vec!["B", "c", "d"]);
}

#[test]
fn test_insertion_cascades_positionally() {
    let delta = compute_delta("f", "a\nb\nc", "new\na\nb\nc");
    assert_eq!(delta.modified_line_indices, vec![0, 1, 2]);
    assert_eq!(delta.deleted_lines, vec!["a", "b", "c"]);
    assert_eq!(delta.added_lines, vec!["new", "a", "b", "c"]);
}

#[test]
fn test_trailing_terminator_is_not_a_line() {
    assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
    assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
    assert!(split_lines("").is_empty());
}
