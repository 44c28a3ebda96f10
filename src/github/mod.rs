// GitHub API module.
// Client, typed endpoints, and response/view types for the GitHub REST
// API. Authentication is token-based (GITHUB_TOKEN).

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use types::*;
