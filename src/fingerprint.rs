use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// A cheap identifier for a particular piece of file content.
/// Under the hood, this is the first 64 bits of a [`blake3`] hash.
///
/// Two equal fingerprints are taken to mean the content is unchanged. This is a
/// heuristic, not a proof: truncating to 64 bits admits collisions.
///
/// It is displayed in hexadecimal format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

/// Fingerprints the given content.
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    Fingerprint::from(content)
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<&[u8]> for Fingerprint {
    fn from(bytes: &[u8]) -> Self {
        let hash = blake3::hash(bytes);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        Fingerprint(u64::from_le_bytes(prefix))
    }
}

impl From<&str> for Fingerprint {
    fn from(content: &str) -> Self {
        content.as_bytes().into()
    }
}

#[test]
fn test_fingerprint_is_deterministic() {
    let a = fingerprint(b"hello, world");
    let b = Fingerprint::from("hello, world");
    assert_eq!(a, b);
    assert_ne!(a, fingerprint(b"hello, world!"));
}

#[test]
fn test_fingerprint_display() {
    let shown = format!("{}", fingerprint(b""));
    assert_eq!(shown.len(), 16);
    assert!(shown.chars().all(|c| c.is_ascii_hexdigit()));
}
