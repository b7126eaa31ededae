//! Version-control gateway.
//!
//! Fixers, the branch lifecycle and the publisher only talk to git through the
//! [`VersionControl`] trait. [`GitWorkingDir`] implements it by shelling out to
//! the `git` CLI inside a working directory.

use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::core::error::GitError;

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Root of the working copy.
    fn dir(&self) -> &Path;

    /// Create and check out a new branch at the current HEAD.
    async fn create_branch(&self, name: &str) -> Result<()>;

    async fn checkout_branch(&self, name: &str) -> Result<()>;

    async fn add(&self, path: &str) -> Result<()>;

    async fn rm(&self, path: &str) -> Result<()>;

    async fn commit(&self, message: &str) -> Result<()>;

    /// Push the current branch to `origin`, setting upstream.
    async fn push(&self) -> Result<()>;

    /// Resolve a ref to its commit SHA. Fails when the ref does not resolve.
    async fn rev_parse(&self, reference: &str) -> Result<String>;

    /// The configured `user.name`.
    async fn user_name(&self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct GitWorkingDir {
    dir: PathBuf,
    quiet: bool,
}

impl GitWorkingDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quiet: true,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Number of commits reachable from HEAD authored since `date` (YYYY-MM-DD).
    pub async fn count_commits_since(&self, date: &str) -> Result<usize> {
        let since = format!("--since={date}");
        let out = self.run_capture(&["rev-list", "--count", &since, "HEAD"]).await?;
        out.trim()
            .parse()
            .with_context(|| format!("unexpected rev-list output '{}'", out.trim()))
    }

    /// Distinct paths touched by commits since `date` (YYYY-MM-DD).
    pub async fn files_changed_since(&self, date: &str) -> Result<Vec<String>> {
        let since = format!("--since={date}");
        let out = self
            .run_capture(&["log", &since, "--name-only", "--pretty=format:"])
            .await?;
        let mut files: Vec<String> = out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }

    async fn run_capture(&self, args: &[&str]) -> Result<String> {
        let output = self.run_checked(args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn run_checked(&self, args: &[&str]) -> Result<Output> {
        let output = run_git(Some(&self.dir), args).await?;
        if !output.status.success() {
            return Err(GitError {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(output)
    }
}

#[async_trait]
impl VersionControl for GitWorkingDir {
    fn dir(&self) -> &Path {
        &self.dir
    }

    #[instrument(skip(self))]
    async fn create_branch(&self, name: &str) -> Result<()> {
        debug!("creating branch");
        self.run_checked(&["checkout", "-b", name]).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn checkout_branch(&self, name: &str) -> Result<()> {
        debug!("checking out branch");
        self.run_checked(&["checkout", name]).await?;
        Ok(())
    }

    async fn add(&self, path: &str) -> Result<()> {
        self.run_checked(&["add", path]).await?;
        Ok(())
    }

    async fn rm(&self, path: &str) -> Result<()> {
        self.run_checked(&["rm", path]).await?;
        Ok(())
    }

    async fn commit(&self, message: &str) -> Result<()> {
        let mut args = vec!["commit", "-m", message];
        if self.quiet {
            args.push("-q");
        }
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn push(&self) -> Result<()> {
        let mut args = vec!["push", "-u", "origin", "HEAD"];
        if self.quiet {
            args.push("-q");
        }
        self.run_checked(&args).await?;
        Ok(())
    }

    async fn rev_parse(&self, reference: &str) -> Result<String> {
        let out = self.run_capture(&["rev-parse", "--verify", "-q", reference]).await?;
        Ok(out.trim().to_string())
    }

    async fn user_name(&self) -> Result<String> {
        let out = self.run_capture(&["config", "user.name"]).await?;
        Ok(out.trim().to_string())
    }
}

/// Clone `url` into `dir` and return a gateway for the new working copy.
#[instrument(skip(dir))]
pub async fn clone(url: &str, dir: &Path, quiet: bool) -> Result<GitWorkingDir> {
    let target = dir.to_string_lossy().to_string();
    let mut args = vec!["clone", url, target.as_str()];
    if quiet {
        args.push("-q");
    }
    let output = run_git(None, &args).await?;
    if !output.status.success() {
        return Err(GitError {
            command: format!("clone {url}"),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(GitWorkingDir::new(dir).with_quiet(quiet))
}

async fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<Output> {
    let mut command = Command::new("git");
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }
    command
        .output()
        .await
        .with_context(|| format!("spawn git {}", args.join(" ")))
}


#[cfg(test)]
mod tests {
    use super::testing::{configure_identity, seeded_origin};
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_clone_and_rev_parse() {
        let tmp = TempDir::new().unwrap();
        let origin = seeded_origin(tmp.path());
        let target = tmp.path().join("work");
        let git = clone(origin.to_str().unwrap(), &target, true).await.unwrap();
        let head = git.rev_parse("HEAD").await.unwrap();
        let main = git.rev_parse("main").await.unwrap();
        assert_eq!(head.len(), 40);
        assert_eq!(head, main);
    }

    #[tokio::test]
    async fn test_rev_parse_fails_for_unknown_ref() {
        let tmp = TempDir::new().unwrap();
        let origin = seeded_origin(tmp.path());
        let target = tmp.path().join("work");
        let git = clone(origin.to_str().unwrap(), &target, true).await.unwrap();
        let err = git.rev_parse("remotes/origin/missing").await.unwrap_err();
        assert!(err.downcast_ref::<GitError>().is_some());
    }

    #[tokio::test]
    async fn test_add_commit_and_count() {
        let tmp = TempDir::new().unwrap();
        let origin = seeded_origin(tmp.path());
        let target = tmp.path().join("work");
        let git = clone(origin.to_str().unwrap(), &target, true).await.unwrap();
        configure_identity(&target);
        std::fs::write(target.join("a.txt"), "a").unwrap();
        git.add("a.txt").await.unwrap();
        git.commit("Adding a.txt").await.unwrap();
        assert_eq!(git.count_commits_since("2000-01-01").await.unwrap(), 2);
        let files = git.files_changed_since("2000-01-01").await.unwrap();
        assert_eq!(files, vec!["README.md".to_string(), "a.txt".to_string()]);
        assert_eq!(git.user_name().await.unwrap(), "Fleet Tester");
    }
}
