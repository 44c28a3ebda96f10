//! Core library for a GitHub Actions dashboard.
//!
//! Two mechanisms carry the design weight here: a read-through response
//! cache with per-entry TTL that keeps the dashboard off GitHub's rate
//! limits, and a compact reversible text encoding of "which repositories
//! and which workflow ids are selected" that travels through URLs and
//! saved dashboards. Everything else is glue around them: an
//! authenticated API client, the service that reshapes upstream
//! responses into view types, and the saved-dashboard store.

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod github;
pub mod selection;
pub mod service;

pub use cache::{CachePolicy, ResponseCache};
pub use config::AppConfig;
pub use dashboard::{DashboardStore, SavedDashboard};
pub use error::{AmpereError, Result};
pub use github::GitHubClient;
pub use selection::{RepoSelection, Selection, decode, encode};
pub use service::{DashboardService, RunFilter};
