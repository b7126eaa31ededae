use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::debug;

use crate::core::git::{self, GitWorkingDir};

/// A temporary checkout of one repository.
///
/// The checkout lives in a [`TempDir`] that is removed when the working copy
/// is dropped, on success and on error alike.
pub struct WorkingCopy {
    git: Arc<GitWorkingDir>,
    dir: TempDir,
}

impl WorkingCopy {
    pub async fn clone_from(url: &str, quiet: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("fleetfix-")
            .tempdir()
            .context("failed to create temporary directory")?;
        debug!(dir = %dir.path().display(), "cloning repository");
        let git = git::clone(url, dir.path(), quiet)
            .await
            .with_context(|| format!("failed to clone {url}"))?;
        Ok(Self {
            git: Arc::new(git),
            dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git(&self) -> Arc<GitWorkingDir> {
        Arc::clone(&self.git)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::testing::seeded_origin;

    #[tokio::test]
    async fn test_working_copy_removed_on_drop() {
        let tmp = TempDir::new().unwrap();
        let origin = seeded_origin(tmp.path());
        let copy = WorkingCopy::clone_from(origin.to_str().unwrap(), true)
            .await
            .unwrap();
        let path = copy.path().to_path_buf();
        assert!(path.join("README.md").exists());
        drop(copy);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_clone_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist.git");
        let result = WorkingCopy::clone_from(missing.to_str().unwrap(), true).await;
        assert!(result.is_err());
    }
}
