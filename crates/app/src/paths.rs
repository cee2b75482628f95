use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const DEFAULT_DATA_DIR: &str = "fitlog";
const DATABASE_FILE: &str = "fitness_tracker.sqlite";
const KEY_VALUE_FILE: &str = "settings.json";

/// Locations of all files written by the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's data directory.
    #[must_use]
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Database holding the training sessions.
    #[must_use]
    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    /// Key-value file holding the settings and recent log entries.
    #[must_use]
    pub fn key_value_store(&self) -> PathBuf {
        self.root.join(KEY_VALUE_FILE)
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_data_paths() {
        let paths = DataPaths::new("/data");

        assert_eq!(paths.root(), Path::new("/data"));
        assert_eq!(paths.database(), PathBuf::from("/data/fitness_tracker.sqlite"));
        assert_eq!(paths.key_value_store(), PathBuf::from("/data/settings.json"));
    }

    #[test]
    fn test_data_paths_default() {
        assert!(DataPaths::default().root().ends_with(DEFAULT_DATA_DIR));
    }

    #[test]
    fn test_data_paths_ensure() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("nested").join("fitlog"));

        paths.ensure().unwrap();
        paths.ensure().unwrap();

        assert!(paths.root().is_dir());
    }
}
