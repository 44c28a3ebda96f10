// GitHub API endpoint functions.
// Typed methods for the REST endpoints the dashboard reads. GitHub's
// GraphQL API doesn't cover Actions, so everything goes through REST.

use serde::Deserialize;

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{Environment, Repository, Workflow, WorkflowRun};

/// Response wrapper for workflows list.
#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    total_count: u64,
    workflows: Vec<Workflow>,
}

/// Response wrapper for workflow runs list.
#[derive(Debug, Deserialize)]
struct WorkflowRunsResponse {
    total_count: u64,
    workflow_runs: Vec<WorkflowRun>,
}

/// Response wrapper for environments list.
#[derive(Debug, Deserialize)]
struct EnvironmentsResponse {
    #[allow(dead_code)]
    total_count: u64,
    #[serde(default)]
    environments: Vec<Environment>,
}

impl GitHubClient {
    /// Get a specific repository.
    pub async fn get_repo(&mut self, owner: &str, repo: &str) -> Result<Repository> {
        let response = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        let repository: Repository = response.json().await?;
        Ok(repository)
    }

    /// Get deployment environments for a repository.
    pub async fn get_environments(&mut self, owner: &str, repo: &str) -> Result<Vec<Environment>> {
        let response = self
            .get(&format!("/repos/{}/{}/environments", owner, repo))
            .await?;
        let wrapper: EnvironmentsResponse = response.json().await?;
        Ok(wrapper.environments)
    }

    /// Get repositories belonging to an owner, most recently pushed
    /// first.
    pub async fn get_owner_repos(&mut self, owner: &str, per_page: u32) -> Result<Vec<Repository>> {
        let params = [
            ("sort", "pushed"),
            ("direction", "desc"),
            ("per_page", &per_page.to_string()),
        ];
        let response = self
            .get_with_params(&format!("/users/{}/repos", owner), &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    /// Get workflows for a repository.
    pub async fn get_workflows(
        &mut self,
        owner: &str,
        repo: &str,
        per_page: u32,
    ) -> Result<(Vec<Workflow>, u64)> {
        let params = [("per_page", &per_page.to_string())];
        let response = self
            .get_with_params(
                &format!("/repos/{}/{}/actions/workflows", owner, repo),
                &params,
            )
            .await?;
        let wrapper: WorkflowsResponse = response.json().await?;
        Ok((wrapper.workflows, wrapper.total_count))
    }

    /// Get runs for a specific workflow, optionally filtered by branch,
    /// triggering actor, and run status.
    pub async fn get_workflow_runs(
        &mut self,
        owner: &str,
        repo: &str,
        workflow_id: u64,
        branch: Option<&str>,
        actor: Option<&str>,
        status: Option<&str>,
        per_page: u32,
    ) -> Result<(Vec<WorkflowRun>, u64)> {
        let per_page = per_page.to_string();
        let mut params = vec![("per_page", per_page.as_str())];
        if let Some(branch) = branch {
            params.push(("branch", branch));
        }
        if let Some(actor) = actor {
            params.push(("actor", actor));
        }
        if let Some(status) = status {
            params.push(("status", status));
        }
        let response = self
            .get_with_params(
                &format!(
                    "/repos/{}/{}/actions/workflows/{}/runs",
                    owner, repo, workflow_id
                ),
                &params,
            )
            .await?;
        let wrapper: WorkflowRunsResponse = response.json().await?;
        Ok((wrapper.workflow_runs, wrapper.total_count))
    }
}
