//! Cross-checks what the fixers reported against what git recorded.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::core::git::VersionControl;
use crate::fixers::ChangeDescription;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anomaly {
    /// The branch moved but no fixer said so.
    UnreportedCommits,
    /// A fixer reported a change that left no commit.
    PhantomChanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishDecision {
    pub has_changes: bool,
    pub changes: Vec<ChangeDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub sha_changed: bool,
    pub reported: bool,
}

impl Reconciliation {
    pub fn new(sha_changed: bool, changes: &[ChangeDescription]) -> Self {
        Self {
            sha_changed,
            reported: !changes.is_empty(),
        }
    }

    /// Publishing follows git, never the fixers' own account.
    pub fn should_publish(&self) -> bool {
        self.sha_changed
    }

    pub fn anomaly(&self) -> Option<Anomaly> {
        match (self.sha_changed, self.reported) {
            (true, false) => Some(Anomaly::UnreportedCommits),
            (false, true) => Some(Anomaly::PhantomChanges),
            _ => None,
        }
    }
}

/// Compares the mutation branch with the default branch and decides whether to publish.
pub async fn reconcile(
    git: &dyn VersionControl,
    branch: &str,
    default_branch: &str,
    changes: Vec<ChangeDescription>,
) -> Result<PublishDecision> {
    let head = git
        .rev_parse(branch)
        .await
        .with_context(|| format!("failed to resolve {}", branch))?;
    let base = git
        .rev_parse(default_branch)
        .await
        .with_context(|| format!("failed to resolve {}", default_branch))?;
    Ok(decide(head != base, changes))
}

pub fn decide(sha_changed: bool, changes: Vec<ChangeDescription>) -> PublishDecision {
    let reconciliation = Reconciliation::new(sha_changed, &changes);
    match reconciliation.anomaly() {
        Some(Anomaly::UnreportedCommits) => {
            warn!("git reports changes but rules did not report any, likely a rule bug");
        }
        Some(Anomaly::PhantomChanges) => {
            warn!("rules reported changes but git shows no diff, likely a rule bug");
            for change in &changes {
                warn!(change = %change, "unrecorded change");
            }
        }
        None if !sha_changed => debug!("no changes"),
        None => {}
    }
    PublishDecision {
        has_changes: reconciliation.should_publish(),
        changes,
    }
}
