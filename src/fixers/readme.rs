//! README upkeep: broken image links and the hosted repository description.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::info;

use super::patterns::SingleFileRewrite;
use super::traits::{ChangeDescription, Fixer, FixerContext};

const README: &str = "README.md";

static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]]*\]\((?P<filename>/[\w/\.]+)\?raw=true "[^"]*"\)"#).unwrap()
});
static DESCRIPTION_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[>A-Za-z]").unwrap());

/// Points `?raw=true` image links at the file when it moved up one or more folders.
pub fn fix_image_links(root: &Path, contents: &str) -> String {
    IMAGE_RE
        .replace_all(contents, |caps: &Captures| {
            let whole = caps.get(0).map_or("", |m| m.as_str());
            let Some(filename) = caps.name("filename") else {
                return whole.to_string();
            };
            let start = caps.get(0).map_or(0, |m| m.start());
            let relative_start = filename.start() - start;
            let relative_end = filename.end() - start;
            format!(
                "{}{}{}",
                &whole[..relative_start],
                find_new_filename(root, filename.as_str()),
                &whole[relative_end..]
            )
        })
        .to_string()
}

/// Drops leading folders from `filename` until it names an existing file.
pub fn find_new_filename(root: &Path, filename: &str) -> String {
    let normalized = filename.replace('\\', "/");
    let mut parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
    while !parts.is_empty() {
        let candidate = parts.iter().fold(root.to_path_buf(), |path, part| path.join(part));
        if candidate.is_file() {
            return format!("/{}", parts.join("/"));
        }
        parts.remove(0);
    }
    filename.to_string()
}

pub fn readme_image(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(SingleFileRewrite::new(
        ctx,
        README,
        "Fixed broken images in README",
        |ctx, contents| fix_image_links(ctx.dir(), contents),
    )))
}

/// First line that reads like prose, without a leading quote marker.
pub fn readme_description(contents: &str) -> Option<String> {
    let line = contents
        .lines()
        .map(str::trim)
        .find(|line| DESCRIPTION_LINE_RE.is_match(line))?;
    let line = line.strip_prefix('>').map(str::trim).unwrap_or(line);
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// Syncs the hosted repository description with the README. Never commits.
pub struct RepoDescription {
    ctx: FixerContext,
}

pub fn repo_description(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(RepoDescription { ctx }))
}

#[async_trait]
impl Fixer for RepoDescription {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        let (Some(repo), Some(github)) = (&self.ctx.repo, &self.ctx.github) else {
            return Ok(vec![]);
        };
        if !self.ctx.is_file(README) {
            return Ok(vec![]);
        }
        let contents = fs::read_to_string(self.ctx.dir().join(README))
            .context("failed to read README.md")?;
        let Some(description) = readme_description(&contents) else {
            return Ok(vec![]);
        };
        if repo.description.as_deref() != Some(description.as_str()) {
            info!(
                repo = %repo.full_name,
                current = repo.description.as_deref().unwrap_or_default(),
                readme = %description,
                "updating repository description"
            );
            github
                .update_description(&repo.full_name, &description)
                .await?;
        }
        Ok(vec![])
    }
}
