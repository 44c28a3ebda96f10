// Saved dashboards module.
// Local persistence for named selections, replacing browser localStorage.

pub mod paths;
pub mod saved;

pub use paths::dashboards_path;
pub use saved::{DashboardStore, SavedDashboard};
