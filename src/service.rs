// Dashboard service.
// Issues upstream GitHub queries through the response cache and reshapes
// the results into the view types the pages consume. Owns its cache
// instance explicitly; there is no process-wide cache singleton.

use std::time::Duration;

use tracing::{error, info};

use crate::cache::{CachePolicy, ResponseCache};
use crate::config::{AppConfig, RepoSource};
use crate::error::{AmpereError, Result};
use crate::github::{
    Environment, GitHubClient, RepoRuns, RepoSummary, Repository, WorkflowSummary,
};
use crate::selection::{self, Selection};

/// TTL for slow-changing repository metadata: 24 hours.
const REPO_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Filters applied to a workflow-run query. Each filter is part of the
/// cache key: differently filtered queries must never share an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFilter {
    /// Branch the runs were triggered on.
    pub branch: Option<String>,
    /// Login of the user who triggered the runs.
    pub actor: Option<String>,
    /// Run status, e.g. "completed" or "in_progress".
    pub status: Option<String>,
}

impl RunFilter {
    pub fn branch(branch: impl Into<String>) -> Self {
        Self {
            branch: Some(branch.into()),
            ..Self::default()
        }
    }
}

/// Cached, reshaping facade over the GitHub API.
pub struct DashboardService {
    client: GitHubClient,
    cache: ResponseCache,
    config: AppConfig,
}

impl DashboardService {
    pub fn new(client: GitHubClient, config: AppConfig) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
            config,
        }
    }

    /// Build a service from GITHUB_TOKEN and the environment config.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(GitHubClient::from_env()?, AppConfig::from_env()?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Replace the configuration at runtime. Every cached value may have
    /// been computed under the old configuration, so the cache is busted.
    pub fn update_config(&mut self, config: AppConfig) {
        self.config = config;
        self.invalidate();
    }

    /// Drop all cached upstream responses.
    pub fn invalidate(&mut self) {
        self.cache.bust_all();
        info!("upstream response cache invalidated");
    }

    /// The repositories configured for the dashboard, with their
    /// environments. Repository metadata changes rarely, so entries live
    /// for 24 hours.
    pub async fn repositories(&mut self) -> Result<Vec<RepoSummary>> {
        match self.config.repo_source {
            RepoSource::RepoList => {
                let repos = self.config.repo_list.clone();
                let mut summaries = Vec::with_capacity(repos.len());
                for repo_with_owner in &repos {
                    let (owner, repo) = split_repo(repo_with_owner)?;
                    summaries.push(self.repository(owner, repo).await?);
                }
                Ok(summaries)
            }
            RepoSource::Owner => self.owner_repositories().await,
        }
    }

    async fn repository(&mut self, owner: &str, repo: &str) -> Result<RepoSummary> {
        let key = format!("{}/{}/repository", owner, repo);
        let policy = self.policy(CachePolicy::with_override(REPO_TTL));
        let cache = &mut self.cache;
        let client = &mut self.client;

        let (summary, _) = cache
            .resolve_with(
                &key,
                || async move {
                    let repository = client.get_repo(owner, repo).await?;
                    let environments = client.get_environments(owner, repo).await?;
                    Ok(summarize(repository, environments))
                },
                policy,
            )
            .await?;
        Ok(summary)
    }

    async fn owner_repositories(&mut self) -> Result<Vec<RepoSummary>> {
        let owner = self.config.owner.clone();
        let per_page = self.config.api_limits.repos;
        let key = format!("{}/repositories", owner);
        let policy = self.policy(CachePolicy::with_override(REPO_TTL));
        let cache = &mut self.cache;
        let client = &mut self.client;

        let (summaries, _) = cache
            .resolve_with(
                &key,
                || async move {
                    let repos = client.get_owner_repos(&owner, per_page).await?;
                    Ok(repos
                        .into_iter()
                        .map(|repo| summarize(repo, Vec::new()))
                        .collect::<Vec<_>>())
                },
                policy,
            )
            .await?;
        Ok(summaries)
    }

    /// Workflows for the given repositories, flattened into one list. A
    /// repo whose workflow fetch fails is logged and contributes nothing
    /// rather than failing the whole page.
    pub async fn workflows(&mut self, repos: &[String]) -> Result<Vec<WorkflowSummary>> {
        let per_page = self.config.api_limits.workflows;
        let mut summaries = Vec::new();

        for repo_with_owner in repos {
            let (owner, repo) = split_repo(repo_with_owner)?;
            let key = format!("{}/{}/workflows", owner, repo);
            let policy = self.policy(CachePolicy::default());
            let cache = &mut self.cache;
            let client = &mut self.client;

            let result = cache
                .resolve_with(
                    &key,
                    || async move {
                        let (workflows, _) = client.get_workflows(owner, repo, per_page).await?;
                        Ok(workflows
                            .into_iter()
                            .map(|w| WorkflowSummary {
                                id: w.id,
                                name: w.name,
                                path: w.path,
                                state: w.state,
                                html_url: w.html_url,
                                badge_url: w.badge_url,
                                repo_with_owner: format!("{}/{}", owner, repo),
                            })
                            .collect::<Vec<_>>())
                    },
                    policy,
                )
                .await;

            match result {
                Ok((mut workflows, _)) => summaries.append(&mut workflows),
                Err(err) => error!(repo = repo_with_owner.as_str(), %err, "error loading workflows"),
            }
        }

        Ok(summaries)
    }

    /// Run history for every workflow in the selection, filtered to the
    /// configured default branch.
    pub async fn runs(&mut self, selection: &Selection) -> Result<Vec<RepoRuns>> {
        let filter = RunFilter::branch(self.config.default_branch.clone());
        self.runs_filtered(selection, &filter).await
    }

    /// Run history for every workflow in the selection, grouped per
    /// repository. A failing workflow fetch is logged and yields no runs
    /// for that workflow, and a failing repository-metadata fetch leaves
    /// the group without its card; the rest of the dashboard still
    /// renders.
    pub async fn runs_filtered(
        &mut self,
        selection: &Selection,
        filter: &RunFilter,
    ) -> Result<Vec<RepoRuns>> {
        let per_page = self.config.api_limits.workflow_runs;
        let mut grouped = Vec::with_capacity(selection.len());

        for repo_selection in selection {
            let (owner, repo) = split_repo(&repo_selection.repo)?;

            let repository = match self.repository(owner, repo).await {
                Ok(summary) => Some(summary),
                Err(err) => {
                    error!(
                        repo = repo_selection.repo.as_str(),
                        %err,
                        "error loading repository metadata"
                    );
                    None
                }
            };

            let mut runs = Vec::new();
            for &workflow_id in &repo_selection.workflow_ids {
                let key = run_cache_key(owner, repo, workflow_id, filter);
                let policy = self.policy(CachePolicy::default());
                let branch = filter.branch.as_deref();
                let actor = filter.actor.as_deref();
                let status = filter.status.as_deref();
                let cache = &mut self.cache;
                let client = &mut self.client;

                let result = cache
                    .resolve_with(
                        &key,
                        || async move {
                            let (runs, _) = client
                                .get_workflow_runs(
                                    owner, repo, workflow_id, branch, actor, status, per_page,
                                )
                                .await?;
                            Ok(runs)
                        },
                        policy,
                    )
                    .await;

                match result {
                    Ok((mut fetched, _)) => runs.append(&mut fetched),
                    Err(err) => error!(
                        repo = repo_selection.repo.as_str(),
                        workflow_id,
                        %err,
                        "error loading workflow runs"
                    ),
                }
            }

            grouped.push(RepoRuns {
                repo_with_owner: repo_selection.repo.clone(),
                repository,
                runs,
            });
        }

        Ok(grouped)
    }

    /// Run history for an encoded selection, as carried in a shared URL.
    pub async fn runs_from_query(&mut self, query: &str) -> Result<Vec<RepoRuns>> {
        let selection = selection::decode(query)?;
        self.runs(&selection).await
    }

    fn policy(&self, base: CachePolicy) -> CachePolicy {
        CachePolicy {
            bypass: base.bypass || self.config.cache_disabled,
            ..base
        }
    }

    #[cfg(test)]
    pub(crate) fn cache_mut(&mut self) -> &mut ResponseCache {
        &mut self.cache
    }
}

fn summarize(repository: Repository, environments: Vec<Environment>) -> RepoSummary {
    RepoSummary {
        id: repository.id,
        name: repository.name,
        name_with_owner: repository.full_name,
        html_url: repository.html_url,
        owner: repository.owner,
        is_archived: repository.archived,
        environments,
    }
}

/// Cache key for a workflow-run query. Every filter slot is present (a
/// `-` placeholder when unset) so differently filtered queries never
/// collide and identical queries always hit the same key.
fn run_cache_key(owner: &str, repo: &str, workflow_id: u64, filter: &RunFilter) -> String {
    format!(
        "{}/{}/runs/{}/{}/{}/{}",
        owner,
        repo,
        workflow_id,
        filter.branch.as_deref().unwrap_or("-"),
        filter.actor.as_deref().unwrap_or("-"),
        filter.status.as_deref().unwrap_or("-"),
    )
}

/// Split an `owner/repo` name at the first slash.
fn split_repo(repo_with_owner: &str) -> Result<(&str, &str)> {
    repo_with_owner
        .split_once('/')
        .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty())
        .ok_or_else(|| AmpereError::Other(format!("not an owner/repo name: {repo_with_owner}")))
}
