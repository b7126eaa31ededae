pub mod filter;
pub mod github;
pub mod repo;

use anyhow::Result;
use async_trait::async_trait;

pub use filter::{Direction, FilterMode, Match, RepoFilter, SortField};
pub use github::GitHubClient;
pub use repo::Repo;

/// Enumerates the repositories of the authenticated user.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn list_repos(&self, sort: SortField, direction: Direction) -> Result<Vec<Repo>>;
}

/// Pull-request style review requests plus repository settings.
#[async_trait]
pub trait ChangeRequestService: Send + Sync {
    /// `head` uses the `owner:branch` form.
    async fn has_open_request(&self, full_name: &str, head: &str, base: &str) -> Result<bool>;

    /// Returns the web URL of the created request.
    async fn create_request(
        &self,
        full_name: &str,
        head: &str,
        base: &str,
        title: &str,
        body: &str,
    ) -> Result<String>;

    async fn update_description(&self, full_name: &str, description: &str) -> Result<()>;
}

/// Fetches the repositories and applies `filter`, keeping the service's order.
pub async fn filtered_repos(
    source: &dyn RepoSource,
    filter: &RepoFilter,
    sort: SortField,
    direction: Direction,
) -> Result<Vec<Repo>> {
    let repos = source.list_repos(sort, direction).await?;
    Ok(filter.apply(repos))
}


#[cfg(test)]
mod tests {
    use super::testing::FakeRepoSource;
    use super::*;
    use crate::remote::repo::sample_repo;

    #[tokio::test]
    async fn test_filtered_repos_keeps_order() {
        let mut archived = sample_repo("b");
        archived.archived = true;
        let source = FakeRepoSource(vec![sample_repo("c"), archived, sample_repo("a")]);
        let repos = filtered_repos(
            &source,
            &RepoFilter::default(),
            SortField::FullName,
            Direction::Asc,
        )
        .await
        .unwrap();
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }
}
