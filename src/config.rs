use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::snapshot::{Ignores, METADATA_DIR};

/// Settings for a repository, readable from a JSON file.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Subdirectory of the repository reserved for the engine.
    pub metadata_dir: String,
    /// Extra name patterns left out of every scan.
    pub ignores: Ignores,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            metadata_dir: String::from(METADATA_DIR),
            ignores: Ignores::default(),
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> Result<Config, serde_json::Error> {
        let file = File::options()
            .read(true)
            .open(path)
            .map_err(serde_json::Error::io)?;
        serde_json::from_reader(file)
    }

    /// The ignores actually applied to scans, which always cover the metadata directory.
    pub fn effective_ignores(&self) -> Ignores {
        let mut ignores = self.ignores.clone();
        ignores.insert(self.metadata_dir.clone());
        ignores
    }
}

#[test]
fn test_read_config() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("minirev.json");
    std::fs::write(
        &path,
        r#"{ "metadata_dir": ".rev", "ignores": { "set": ["target"] } }"#,
    )
    .unwrap();
    let config = Config::read(&path).unwrap();
    assert_eq!(config.metadata_dir, ".rev");

    let ignores = config.effective_ignores();
    assert!(ignores.is_ignored("target"));
    assert!(ignores.is_ignored(".rev"));
    assert!(!ignores.is_ignored("a.txt"));
}

#[test]
fn test_partial_config_uses_defaults() {
    let tempdir = tempfile::tempdir().unwrap();
    let path = tempdir.path().join("minirev.json");
    std::fs::write(&path, "{}").unwrap();
    assert_eq!(Config::read(&path).unwrap(), Config::default());
    assert!(Config::read(&tempdir.path().join("missing.json")).is_err());
}
