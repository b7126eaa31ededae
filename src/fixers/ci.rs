//! Retires Travis CI.

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

use super::patterns::SingleFileRewrite;
use super::traits::{ChangeDescription, Fixer, FixerContext};

const TRAVIS_FILE: &str = ".travis.yml";

static TRAVIS_BADGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[!\[Build Status\]\(https://travis-ci[^)]+\)\]\(https://travis-ci[^)]+\)").unwrap()
});

pub struct NoTravis {
    ctx: FixerContext,
}

pub fn no_travis(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(NoTravis { ctx }))
}

#[async_trait]
impl Fixer for NoTravis {
    async fn run(&self) -> Result<Vec<ChangeDescription>> {
        if !self.ctx.is_file(TRAVIS_FILE) {
            return Ok(vec![]);
        }
        self.ctx.git.rm(TRAVIS_FILE).await?;
        let message = format!("Removed {}", TRAVIS_FILE);
        self.ctx.git.commit(&message).await?;
        Ok(vec![message])
    }
}

pub fn remove_travis_badge(contents: &str) -> String {
    TRAVIS_BADGE_RE.replace_all(contents, "").to_string()
}

pub fn no_travis_badge(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(SingleFileRewrite::new(
        ctx,
        "README.md",
        "Removed Travis badge from README",
        |_, contents| remove_travis_badge(contents),
    )))
}
