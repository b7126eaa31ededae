use anyhow::Result;

use crate::frameworks::{ProjectDetector, ProjectKind};

use super::patterns::{MissingFile, StaticContents};
use super::traits::{Fixer, FixerContext};

const LAZARUS_GITIGNORE: &str = include_str!("../../templates/lazarus.gitignore");

/// Ignores Free Pascal build output in Lazarus projects.
pub fn must_have_lazarus_git_ignore(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let fixer = MissingFile::new(ctx, ".gitignore", StaticContents(LAZARUS_GITIGNORE))?
        .applies_when(|ctx| ProjectDetector::matches(ctx.dir(), ProjectKind::Lazarus));
    Ok(Box::new(fixer))
}
