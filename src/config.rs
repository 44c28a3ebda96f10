// Application configuration.
// Loaded from environment variables, validated before use. The GitHub
// token itself is read by the API client, not stored here.

use std::env;

use tracing::info;

use crate::error::{AmpereError, Result};

/// Where the list of dashboard repositories comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepoSource {
    /// An explicit `owner/repo` list from `REPO_LIST`.
    #[default]
    RepoList,
    /// Every repository of `GITHUB_OWNER`.
    Owner,
}

impl RepoSource {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "repoList" => Ok(RepoSource::RepoList),
            "owner" => Ok(RepoSource::Owner),
            other => Err(AmpereError::Config(format!(
                "invalid REPO_SOURCE: {other}, must be one of repoList, owner"
            ))),
        }
    }
}

/// Pagination limits for upstream API calls, one per resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiLimits {
    pub repos: u32,
    pub workflows: u32,
    pub workflow_runs: u32,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            repos: 10,
            workflows: 10,
            workflow_runs: 10,
        }
    }
}

/// Validated application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Owner whose repositories are shown when `repo_source` is `Owner`.
    pub owner: String,
    pub repo_source: RepoSource,
    /// `owner/repo` names used when `repo_source` is `RepoList`.
    pub repo_list: Vec<String>,
    /// Branch to check for workflow runs on.
    pub default_branch: String,
    pub api_limits: ApiLimits,
    /// Serve live upstream data unconditionally (cache bypass).
    pub cache_disabled: bool,
}

impl AppConfig {
    /// Load and validate configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            owner: env::var("GITHUB_OWNER").unwrap_or_default(),
            repo_source: RepoSource::parse(
                &env::var("REPO_SOURCE").unwrap_or_else(|_| "repoList".to_string()),
            )?,
            repo_list: env::var("REPO_LIST")
                .unwrap_or_default()
                .split(',')
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            default_branch: env::var("DEFAULT_BRANCH").unwrap_or_else(|_| "main".to_string()),
            api_limits: ApiLimits {
                repos: env_limit("API_LIMIT_REPOS", 10)?,
                workflows: env_limit("API_LIMIT_WORKFLOWS", 10)?,
                workflow_runs: env_limit("API_LIMIT_WORKFLOW_RUNS", 10)?,
            },
            cache_disabled: env::var("DISABLE_CACHE").is_ok_and(|v| v == "1" || v == "true"),
        };

        config.validate()?;
        info!(
            source = ?config.repo_source,
            repos = config.repo_list.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        match self.repo_source {
            RepoSource::RepoList if self.repo_list.is_empty() => {
                return Err(AmpereError::Config(
                    "REPO_LIST must name at least one owner/repo when REPO_SOURCE is repoList"
                        .to_string(),
                ));
            }
            RepoSource::Owner if self.owner.is_empty() => {
                return Err(AmpereError::Config(
                    "GITHUB_OWNER must be set when REPO_SOURCE is owner".to_string(),
                ));
            }
            _ => {}
        }

        if self.default_branch.is_empty() {
            return Err(AmpereError::Config(
                "DEFAULT_BRANCH must be a branch name".to_string(),
            ));
        }

        for (name, value) in [
            ("repos", self.api_limits.repos),
            ("workflows", self.api_limits.workflows),
            ("workflow_runs", self.api_limits.workflow_runs),
        ] {
            if value == 0 {
                return Err(AmpereError::Config(format!(
                    "API limit for {name} must be > 0"
                )));
            }
        }

        Ok(())
    }
}

fn env_limit(name: &str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| AmpereError::Config(format!("{name} must be an integer: {value}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_config() -> AppConfig {
        AppConfig {
            repo_list: vec!["octo/app".to_string()],
            default_branch: "main".to_string(),
            api_limits: ApiLimits::default(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_valid_repo_list_config() {
        assert!(list_config().validate().is_ok());
    }

    #[test]
    fn test_repo_list_source_requires_repos() {
        let config = AppConfig {
            repo_list: Vec::new(),
            ..list_config()
        };
        assert!(matches!(config.validate(), Err(AmpereError::Config(_))));
    }

    #[test]
    fn test_owner_source_requires_owner() {
        let config = AppConfig {
            repo_source: RepoSource::Owner,
            owner: String::new(),
            ..list_config()
        };
        assert!(matches!(config.validate(), Err(AmpereError::Config(_))));

        let config = AppConfig {
            repo_source: RepoSource::Owner,
            owner: "octo".to_string(),
            ..list_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_api_limit_rejected() {
        let config = AppConfig {
            api_limits: ApiLimits {
                workflows: 0,
                ..ApiLimits::default()
            },
            ..list_config()
        };
        assert!(matches!(config.validate(), Err(AmpereError::Config(_))));
    }

    #[test]
    fn test_repo_source_parsing() {
        assert_eq!(RepoSource::parse("repoList").unwrap(), RepoSource::RepoList);
        assert_eq!(RepoSource::parse("owner").unwrap(), RepoSource::Owner);
        assert!(RepoSource::parse("getFromMars").is_err());
    }
}
