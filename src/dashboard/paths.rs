// Persisted-state file locations.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Base data directory (~/.local/share/ampere on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ampere").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the saved dashboards file.
pub fn dashboards_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("dashboards.json"))
}
