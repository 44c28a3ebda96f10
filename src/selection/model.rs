// Selection model.
// In-memory representation of which repositories and which workflow ids
// the user has chosen. Produced and consumed by the codec and by the
// saved-dashboard store; the encoded text form is the durable
// representation across page loads and shared URLs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One repository's chosen workflow ids.
///
/// The id set has set semantics (no duplicates); `BTreeSet` also gives
/// the ascending iteration order the codec relies on for deterministic
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSelection {
    /// Repository name including owner, e.g. "octo/app".
    pub repo: String,
    /// Chosen workflow ids. May be empty: the repo stays selectable with
    /// zero workflows chosen.
    pub workflow_ids: BTreeSet<u64>,
}

impl RepoSelection {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            workflow_ids: BTreeSet::new(),
        }
    }

    pub fn with_ids(repo: impl Into<String>, ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            repo: repo.into(),
            workflow_ids: ids.into_iter().collect(),
        }
    }
}

/// An ordered sequence of per-repository selections.
///
/// Repo names are unique within a selection: mutators that target an
/// existing repo update its entry rather than appending a second one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    repos: Vec<RepoSelection>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn repos(&self) -> &[RepoSelection] {
        &self.repos
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepoSelection> {
        self.repos.iter()
    }

    /// The chosen workflow ids for `repo`, if the repo is selected.
    pub fn workflow_ids(&self, repo: &str) -> Option<&BTreeSet<u64>> {
        self.repos.iter().find(|r| r.repo == repo).map(|r| &r.workflow_ids)
    }

    /// The entry for `repo`, appending a fresh empty one if absent.
    fn entry(&mut self, repo: &str) -> &mut RepoSelection {
        let index = match self.repos.iter().position(|r| r.repo == repo) {
            Some(index) => index,
            None => {
                self.repos.push(RepoSelection::new(repo));
                self.repos.len() - 1
            }
        };
        &mut self.repos[index]
    }

    /// Select `repo` with no workflows chosen yet. No-op if already
    /// present.
    pub fn add_repo(&mut self, repo: &str) {
        self.entry(repo);
    }

    /// Add a workflow id to `repo`, appending the repo entry if absent.
    /// Adding an id that is already present is a no-op.
    pub fn add_workflow(&mut self, repo: &str, id: u64) {
        self.entry(repo).workflow_ids.insert(id);
    }

    /// Remove a workflow id from `repo` if present. An emptied id set
    /// stays in place: the repo remains listed with zero chosen.
    pub fn remove_workflow(&mut self, repo: &str, id: u64) {
        if let Some(entry) = self.repos.iter_mut().find(|r| r.repo == repo) {
            entry.workflow_ids.remove(&id);
        }
    }

    /// Repo-wise union with `other`. Used when reconciling an in-progress
    /// selection with freshly fetched workflow lists. Repos only present
    /// in `other` are appended in their original order.
    pub fn merge(&mut self, other: &Selection) {
        for repo in &other.repos {
            let entry = self.entry(&repo.repo);
            entry.workflow_ids.extend(repo.workflow_ids.iter().copied());
        }
    }
}

impl FromIterator<RepoSelection> for Selection {
    fn from_iter<I: IntoIterator<Item = RepoSelection>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for repo in iter {
            let entry = selection.entry(&repo.repo);
            entry.workflow_ids.extend(repo.workflow_ids);
        }
        selection
    }
}

impl<'a> IntoIterator for &'a Selection {
    type Item = &'a RepoSelection;
    type IntoIter = std::slice::Iter<'a, RepoSelection>;

    fn into_iter(self) -> Self::IntoIter {
        self.repos.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_workflow_appends_and_is_idempotent() {
        let mut selection = Selection::new();
        selection.add_workflow("octo/app", 1);
        selection.add_workflow("octo/app", 2);
        selection.add_workflow("octo/app", 2);
        selection.add_workflow("octo/lib", 9);

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.repos()[0].repo, "octo/app");
        assert_eq!(
            selection.workflow_ids("octo/app").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(selection.repos()[1].repo, "octo/lib");
    }

    #[test]
    fn test_remove_workflow_keeps_empty_entry() {
        let mut selection = Selection::new();
        selection.add_workflow("octo/app", 1);
        selection.remove_workflow("octo/app", 1);

        // The repo stays listed so the UI can show it as selectable.
        assert_eq!(selection.len(), 1);
        assert!(selection.workflow_ids("octo/app").unwrap().is_empty());

        // Removing from an unknown repo is a no-op.
        selection.remove_workflow("octo/missing", 1);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_merge_unions_per_repo() {
        let mut a = Selection::new();
        a.add_workflow("octo/app", 1);
        a.add_workflow("octo/app", 2);

        let mut b = Selection::new();
        b.add_workflow("octo/app", 2);
        b.add_workflow("octo/app", 3);
        b.add_workflow("octo/lib", 7);

        a.merge(&b);

        assert_eq!(a.len(), 2);
        assert_eq!(
            a.workflow_ids("octo/app").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            a.workflow_ids("octo/lib").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![7]
        );
    }

    #[test]
    fn test_from_iterator_unions_duplicate_repos() {
        let selection: Selection = [
            RepoSelection::with_ids("octo/app", [1]),
            RepoSelection::with_ids("octo/app", [2]),
        ]
        .into_iter()
        .collect();

        assert_eq!(selection.len(), 1);
        assert_eq!(
            selection.workflow_ids("octo/app").unwrap().iter().copied().collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
