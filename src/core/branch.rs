use anyhow::Result;
use tracing::{debug, info};

use crate::core::git::VersionControl;

/// Branch every fix is committed to.
pub const MUTATION_BRANCH: &str = "fleetfix_branch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    Absent,
    LocalOnly,
    TrackingRemote,
}

pub fn remote_ref(name: &str) -> String {
    format!("remotes/origin/{}", name)
}

/// `TrackingRemote` when origin has the branch, `Absent` otherwise.
pub async fn remote_state(git: &dyn VersionControl, name: &str) -> BranchState {
    match git.rev_parse(&remote_ref(name)).await {
        Ok(_) => BranchState::TrackingRemote,
        Err(_) => BranchState::Absent,
    }
}

/// Reuses the branch of a previous run when origin has it, otherwise creates
/// it from the current default-branch head.
pub async fn prepare(git: &dyn VersionControl, name: &str) -> Result<BranchState> {
    match remote_state(git, name).await {
        BranchState::TrackingRemote => {
            info!(branch = name, "reusing existing remote branch");
            git.checkout_branch(name).await?;
            Ok(BranchState::TrackingRemote)
        }
        BranchState::Absent | BranchState::LocalOnly => {
            debug!(branch = name, "creating branch");
            git.create_branch(name).await?;
            Ok(BranchState::LocalOnly)
        }
    }
}
