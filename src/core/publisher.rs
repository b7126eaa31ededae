use anyhow::{Context, Result};
use tracing::info;

use crate::core::git::VersionControl;
use crate::core::reconcile::PublishDecision;
use crate::fixers::ChangeDescription;
use crate::remote::{ChangeRequestService, Repo};

pub const REQUEST_TITLE: &str = "fleetfix automatic PR";

/// Renders the review request body: one bullet per change, detail lines indented.
pub fn format_body(changes: &[ChangeDescription]) -> String {
    let mut body = String::from("The following fixes have been applied:\n");
    for change in changes {
        let lines = change.lines().map(str::trim).filter(|line| !line.is_empty());
        for (i, line) in lines.enumerate() {
            body.push_str(if i == 0 { "- " } else { "  " });
            body.push_str(line);
            body.push('\n');
        }
    }
    body
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    NothingToPublish,
    DryRun,
    AlreadyOpen,
    Created(String),
}

pub struct Publisher<'a> {
    github: &'a dyn ChangeRequestService,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    pub fn new(github: &'a dyn ChangeRequestService, dry_run: bool) -> Self {
        Self { github, dry_run }
    }

    pub async fn publish(
        &self,
        git: &dyn VersionControl,
        repo: &Repo,
        branch: &str,
        decision: &PublishDecision,
    ) -> Result<PublishOutcome> {
        if !decision.has_changes {
            return Ok(PublishOutcome::NothingToPublish);
        }
        if self.dry_run {
            info!(
                repo = %repo.full_name,
                branch,
                changes = decision.changes.len(),
                "dry run, not pushing"
            );
            return Ok(PublishOutcome::DryRun);
        }
        git.push()
            .await
            .with_context(|| format!("failed to push {} for {}", branch, repo.full_name))?;
        let head = format!("{}:{}", repo.owner(), branch);
        if self
            .github
            .has_open_request(&repo.full_name, &head, &repo.default_branch)
            .await?
        {
            info!(repo = %repo.full_name, branch, "pull request already open");
            return Ok(PublishOutcome::AlreadyOpen);
        }
        let url = self
            .github
            .create_request(
                &repo.full_name,
                &head,
                &repo.default_branch,
                REQUEST_TITLE,
                &format_body(&decision.changes),
            )
            .await?;
        info!(repo = %repo.full_name, %url, "created pull request");
        Ok(PublishOutcome::Created(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::testing::RecordingGit;
    use crate::remote::repo::sample_repo;
    use crate::remote::testing::FakeChangeRequests;
    use tempfile::TempDir;

    fn decision(changes: &[&str]) -> PublishDecision {
        PublishDecision {
            has_changes: true,
            changes: changes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_format_body_simple_change() {
        assert_eq!(
            format_body(&["Simple change".to_string()]),
            "The following fixes have been applied:\n- Simple change\n"
        );
    }

    #[test]
    fn test_format_body_two_changes() {
        assert_eq!(
            format_body(&["Simple change".to_string(), "Second change".to_string()]),
            "The following fixes have been applied:\n- Simple change\n- Second change\n"
        );
    }

    #[test]
    fn test_format_body_multiline_change() {
        assert_eq!(
            format_body(&["Complex change\nUpdated parent to 1.0\n".to_string()]),
            "The following fixes have been applied:\n- Complex change\n  Updated parent to 1.0\n"
        );
    }

    #[test]
    fn test_format_body_drops_blank_lines() {
        assert_eq!(
            format_body(&["Updated parent pom\n\nUpdating parent from 1 to 2\n".to_string()]),
            "The following fixes have been applied:\n- Updated parent pom\n  Updating parent from 1 to 2\n"
        );
    }

    #[tokio::test]
    async fn test_creates_request_after_push() {
        let tmp = TempDir::new().unwrap();
        let git = RecordingGit::new(tmp.path());
        let github = FakeChangeRequests::default();
        let publisher = Publisher::new(&github, false);

        let outcome = publisher
            .publish(&git, &sample_repo("tool"), "fleetfix_branch", &decision(&["Adding LICENSE"]))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PublishOutcome::Created("https://github.com/octo/tool/pull/1".to_string())
        );
        assert_eq!(git.calls(), vec!["push"]);
        let calls = github.calls();
        assert_eq!(calls[0], "has_open_request octo/tool octo:fleetfix_branch main");
        assert!(calls[1].starts_with("create_request octo/tool octo:fleetfix_branch main fleetfix automatic PR"));
        assert!(calls[1].ends_with("- Adding LICENSE\n"));
    }

    #[tokio::test]
    async fn test_existing_request_is_not_duplicated() {
        let tmp = TempDir::new().unwrap();
        let git = RecordingGit::new(tmp.path());
        let github = FakeChangeRequests::with_existing_request();
        let publisher = Publisher::new(&github, false);

        let outcome = publisher
            .publish(&git, &sample_repo("tool"), "fleetfix_branch", &decision(&["Adding LICENSE"]))
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::AlreadyOpen);
        assert_eq!(git.calls(), vec!["push"]);
        assert!(github.calls().iter().all(|c| !c.starts_with("create_request")));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_push() {
        let tmp = TempDir::new().unwrap();
        let git = RecordingGit::new(tmp.path());
        let github = FakeChangeRequests::default();
        let publisher = Publisher::new(&github, true);

        let outcome = publisher
            .publish(&git, &sample_repo("tool"), "fleetfix_branch", &decision(&["Adding LICENSE"]))
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::DryRun);
        assert!(git.calls().is_empty());
        assert!(github.calls().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_to_publish() {
        let tmp = TempDir::new().unwrap();
        let git = RecordingGit::new(tmp.path());
        let github = FakeChangeRequests::default();
        let no_changes = PublishDecision {
            has_changes: false,
            changes: vec![],
        };

        let outcome = Publisher::new(&github, false)
            .publish(&git, &sample_repo("tool"), "fleetfix_branch", &no_changes)
            .await
            .unwrap();

        assert_eq!(outcome, PublishOutcome::NothingToPublish);
        assert!(git.calls().is_empty());
    }
}
