//! Reusable fixer shapes.
//!
//! Most fixers are one of two things: rewrite a single file when a transform
//! changes it ([`SingleFileRewrite`]), or create a file that is missing
//! ([`MissingFile`]). Fixers that drive external build tools detect edits by
//! comparing the target's modification time around the tool run
//! ([`mtime_guarded`]).

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tokio::process::Command;
use tracing::debug;

use crate::core::error::ToolError;

use super::traits::{ChangeDescription, Fixer, FixerContext};

pub type Transform = Box<dyn Fn(&FixerContext, &str) -> String + Send + Sync>;
pub type Predicate = Box<dyn Fn(&FixerContext) -> bool + Send + Sync>;

/// Rewrites one file with a transform, committing only when the bytes change.
pub struct SingleFileRewrite {
    ctx: FixerContext,
    path: String,
    message: String,
    transform: Transform,
}

impl SingleFileRewrite {
    pub fn new(
        ctx: FixerContext,
        path: &str,
        message: &str,
        transform: impl Fn(&FixerContext, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            ctx,
            path: path.to_string(),
            message: message.to_string(),
            transform: Box::new(transform),
        }
    }
}

#[async_trait]
impl Fixer for SingleFileRewrite {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        let full_path = self.ctx.dir().join(&self.path);
        if !full_path.is_file() {
            return Ok(vec![]);
        }
        let bytes = fs::read(&full_path).with_context(|| format!("failed to read {}", self.path))?;
        let Ok(contents) = String::from_utf8(bytes) else {
            debug!(path = %self.path, "skipping file that is not valid UTF-8");
            return Ok(vec![]);
        };
        let converted = (self.transform)(&self.ctx, &contents);
        if converted == contents {
            return Ok(vec![]);
        }
        fs::write(&full_path, converted).with_context(|| format!("failed to write {}", self.path))?;
        self.ctx.git.add(&self.path).await?;
        self.ctx.git.commit(&self.message).await?;
        Ok(vec![self.message.clone()])
    }
}

/// Produces the contents of a file that is about to be created.
///
/// `Ok(None)` means there is nothing to write and the fixer does nothing.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn contents(&self, ctx: &FixerContext) -> Result<Option<String>>;
}

/// Fixed contents, typically an embedded template.
pub struct StaticContents(pub &'static str);

#[async_trait]
impl ContentSource for StaticContents {
    async fn contents(&self, _ctx: &FixerContext) -> Result<Option<String>> {
        Ok(Some(self.0.to_string()))
    }
}

/// Contents derived synchronously from the context.
pub struct Computed<F>(pub F);

#[async_trait]
impl<F> ContentSource for Computed<F>
where
    F: Fn(&FixerContext) -> Option<String> + Send + Sync,
{
    async fn contents(&self, ctx: &FixerContext) -> Result<Option<String>> {
        Ok((self.0)(ctx))
    }
}

/// Contents downloaded from a URL.
pub struct RemoteContents(pub &'static str);

#[async_trait]
impl ContentSource for RemoteContents {
    async fn contents(&self, ctx: &FixerContext) -> Result<Option<String>> {
        let response = ctx
            .http
            .get(self.0)
            .send()
            .await
            .with_context(|| format!("failed to download {}", self.0))?
            .error_for_status()
            .with_context(|| format!("failed to download {}", self.0))?;
        let text = response.text().await?;
        Ok(Some(text))
    }
}

/// Creates a file when it is absent and the repository qualifies.
///
/// An existing file is never touched and the applicability predicate is not
/// consulted for it, so user edits survive.
pub struct MissingFile {
    ctx: FixerContext,
    path: String,
    applies: Predicate,
    contents: Box<dyn ContentSource>,
}

impl MissingFile {
    pub fn new(
        ctx: FixerContext,
        path: &str,
        contents: impl ContentSource + 'static,
    ) -> Result<Self> {
        Ok(Self {
            ctx,
            path: normalize_relative_path(path)?,
            applies: Box::new(|_| true),
            contents: Box::new(contents),
        })
    }

    pub fn applies_when(
        mut self,
        predicate: impl Fn(&FixerContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.applies = Box::new(predicate);
        self
    }

    pub fn commit_message(&self) -> String {
        format!("Adding {}", self.path)
    }
}

#[async_trait]
impl Fixer for MissingFile {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        let full_path = self.ctx.dir().join(&self.path);
        if full_path.is_file() {
            return Ok(vec![]);
        }
        if !(self.applies)(&self.ctx) {
            return Ok(vec![]);
        }
        let Some(contents) = self.contents.contents(&self.ctx).await? else {
            return Ok(vec![]);
        };
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directories for {}", self.path))?;
        }
        fs::write(&full_path, contents).with_context(|| format!("failed to write {}", self.path))?;
        self.ctx.git.add(&self.path).await?;
        let message = self.commit_message();
        self.ctx.git.commit(&message).await?;
        Ok(vec![message])
    }
}

/// Validates a relative path and normalizes separators to `/`.
pub fn normalize_relative_path(path: &str) -> Result<String> {
    if path.is_empty() {
        bail!("file name cannot be empty");
    }
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(str::is_empty) {
        return Err(anyhow!("found empty path segment in {path}"));
    }
    Ok(normalized)
}

/// An external program invoked inside the working copy.
#[derive(Debug, Clone)]
pub struct ExternalTool {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalTool {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Runs the tool and returns its combined output. A non-zero exit is an error.
    pub async fn run(&self, dir: &Path) -> Result<String> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(dir)
            .output()
            .await
            .with_context(|| format!("failed to spawn {}", self.program))?;
        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim().to_string();
        if !output.status.success() {
            return Err(ToolError {
                program: self.program.clone(),
                output: combined,
            }
            .into());
        }
        Ok(combined)
    }
}

fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to read modification time of {}", path.display()))
}

/// Runs `tool` and reports whether it touched `file`.
///
/// Returns the tool output when the modification time of `file` changed and
/// `None` otherwise. A tool that rewrites identical bytes still counts as a
/// change, and one that edits without updating the timestamp does not.
pub async fn mtime_guarded(dir: &Path, file: &str, tool: &ExternalTool) -> Result<Option<String>> {
    let full_path = dir.join(file);
    let before = modified_time(&full_path)?;
    let output = tool.run(dir).await?;
    let after = modified_time(&full_path)?;
    if before == after {
        debug!(program = %tool.program, file, "tool left file untouched");
        return Ok(None);
    }
    Ok(Some(output))
}
