use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs;

use crate::frameworks::{ProjectDetector, ProjectKind};

use super::traits::{ChangeDescription, Fixer, FixerContext};

const WORKFLOW_PATH: &str = ".github/workflows/build.yml";
const APPVEYOR: &str = "appveyor.yml";
const DOTNET_WORKFLOW: &str = include_str!("../../templates/dotnet-workflow.yml");

pub fn workflow_contents(default_branch: &str) -> String {
    DOTNET_WORKFLOW.replace("[branch]", default_branch)
}

/// Keeps a GitHub Actions build for C# solutions and retires AppVeyor.
pub struct MustHaveGitHubAction {
    ctx: FixerContext,
}

pub fn must_have_git_hub_action(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(MustHaveGitHubAction { ctx }))
}

impl MustHaveGitHubAction {
    async fn remove_appveyor(&self) -> Result<bool> {
        if !self.ctx.is_file(APPVEYOR) {
            return Ok(false);
        }
        self.ctx.git.rm(APPVEYOR).await?;
        Ok(true)
    }
}

#[async_trait]
impl Fixer for MustHaveGitHubAction {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        if !ProjectDetector::matches(self.ctx.dir(), ProjectKind::DotNet) {
            return Ok(vec![]);
        }
        let expected = workflow_contents(self.ctx.default_branch());
        let path = self.ctx.dir().join(WORKFLOW_PATH);
        let current = if path.is_file() {
            Some(fs::read_to_string(&path).context("failed to read .NET workflow")?)
        } else {
            None
        };

        if current.as_deref() != Some(expected.as_str()) {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("failed to create workflow directory")?;
            }
            fs::write(&path, &expected).context("failed to write .NET workflow")?;
            self.ctx.git.add(WORKFLOW_PATH).await?;
            let message = if current.is_some() {
                "Updated GitHub Actions workflow for .NET project"
            } else {
                "Added GitHub Actions workflow for .NET project"
            };
            self.remove_appveyor().await?;
            self.ctx.git.commit(message).await?;
            return Ok(vec![message.to_string()]);
        }

        if self.remove_appveyor().await? {
            let message = "Removed appveyor.yml from .NET project";
            self.ctx.git.commit(message).await?;
            return Ok(vec![message.to_string()]);
        }
        Ok(vec![])
    }
}
