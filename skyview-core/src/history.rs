use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::config::project_dirs;

/// Previously searched place names, persisted as a JSON array.
///
/// Append-only; a name is stored once, compared by exact string match.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    path: PathBuf,
    entries: Vec<String>,
}

impl SearchHistory {
    /// Open the history in the platform data directory.
    pub fn open_default() -> Result<Self> {
        Self::open(&Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join("history.json"))
    }

    /// Load the history at `path`; a missing file is an empty history.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read search history: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse search history: {}", path.display()))?
        } else {
            Vec::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name)
    }

    /// Append `name` and persist. Returns `false` if it was already present.
    pub fn record(&mut self, name: &str) -> Result<bool> {
        if self.contains(name) {
            return Ok(false);
        }

        self.entries.push(name.to_string());
        self.save()?;
        debug!(name, "recorded search");
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string(&self.entries)
            .context("Failed to serialize search history")?;

        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write search history: {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_not_re_added() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = SearchHistory::open(&dir.path().join("history.json")).unwrap();

        assert!(history.record("Paris").unwrap());
        assert!(history.record("Rome").unwrap());
        assert!(!history.record("Paris").unwrap());

        assert_eq!(history.entries(), ["Paris", "Rome"]);
    }

    #[test]
    fn match_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = SearchHistory::open(&dir.path().join("history.json")).unwrap();

        history.record("paris").unwrap();
        assert!(history.record("Paris").unwrap());
        assert_eq!(history.entries().len(), 2);
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("history.json");

        let mut history = SearchHistory::open(&path).unwrap();
        history.record("Oslo").unwrap();
        history.record("Lima").unwrap();

        let reopened = SearchHistory::open(&path).unwrap();
        assert_eq!(reopened.entries(), ["Oslo", "Lima"]);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();

        let err = SearchHistory::open(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse search history"));
    }
}
