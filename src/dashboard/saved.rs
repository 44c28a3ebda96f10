// Saved dashboard store.
// A named dashboard is a selection the user chose to keep. The list is
// persisted as a JSON file; the selection's encoded text form is what
// gets carried in shareable URLs.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::selection::{self, Selection};

/// A named, persisted selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDashboard {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    pub selection: Selection,
}

impl SavedDashboard {
    pub fn new(name: impl Into<String>, selection: Selection) -> Self {
        Self {
            name: name.into(),
            description: None,
            created: None,
            selection,
        }
    }
}

/// In-memory list of saved dashboards with JSON file persistence.
#[derive(Debug, Default)]
pub struct DashboardStore {
    dashboards: Vec<SavedDashboard>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the store from a JSON file. A missing file yields an empty
    /// store; a corrupt file is an error the caller surfaces.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let dashboards: Vec<SavedDashboard> = serde_json::from_str(&contents)?;
        Ok(Self { dashboards })
    }

    /// Write the store as JSON, atomically via a temp file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.dashboards)?;

        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        debug!(count = self.dashboards.len(), "saved dashboards written");
        Ok(())
    }

    pub fn dashboards(&self) -> &[SavedDashboard] {
        &self.dashboards
    }

    pub fn get(&self, name: &str) -> Option<&SavedDashboard> {
        self.dashboards.iter().find(|d| d.name == name)
    }

    /// Add a dashboard, stamping its creation time. Adding a name that
    /// already exists is a no-op and returns false.
    pub fn add(&mut self, mut dashboard: SavedDashboard) -> bool {
        if self.get(&dashboard.name).is_some() {
            return false;
        }
        dashboard.created = Some(Utc::now());
        self.dashboards.push(dashboard);
        true
    }

    /// Remove a dashboard by name. Returns false if no such dashboard.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.dashboards.len();
        self.dashboards.retain(|d| d.name != name);
        self.dashboards.len() < before
    }

    pub fn clear(&mut self) {
        self.dashboards.clear();
    }

    /// The encoded selection text for a named dashboard, ready to be
    /// placed in a URL query string.
    pub fn query(&self, name: &str) -> Option<String> {
        self.get(name).map(|d| selection::encode(&d.selection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dashboard(name: &str) -> SavedDashboard {
        let mut selection = Selection::new();
        selection.add_workflow("octo/app", 1);
        selection.add_workflow("octo/app", 2);
        selection.add_repo("octo/lib");
        SavedDashboard::new(name, selection)
    }

    #[test]
    fn test_add_stamps_created_and_rejects_duplicates() {
        let mut store = DashboardStore::new();

        assert!(store.add(dashboard("ci overview")));
        assert!(store.get("ci overview").unwrap().created.is_some());

        assert!(!store.add(dashboard("ci overview")));
        assert_eq!(store.dashboards().len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = DashboardStore::new();
        store.add(dashboard("a"));
        store.add(dashboard("b"));

        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert_eq!(store.dashboards().len(), 1);
        assert!(store.get("b").is_some());
    }

    #[test]
    fn test_query_encodes_selection() {
        let mut store = DashboardStore::new();
        store.add(dashboard("ci overview"));

        assert_eq!(
            store.query("ci overview").unwrap(),
            "octo/app[1,2],octo/lib[]"
        );
        assert!(store.query("missing").is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dashboards.json");

        let mut store = DashboardStore::new();
        store.add(dashboard("ci overview"));
        store.save(&path).unwrap();

        let loaded = DashboardStore::load(&path).unwrap();
        assert_eq!(loaded.dashboards(), store.dashboards());
    }

    #[test]
    fn test_load_missing_file_yields_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let store = DashboardStore::load(&path).unwrap();
        assert!(store.dashboards().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dashboards.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(DashboardStore::load(&path).is_err());
    }
}
