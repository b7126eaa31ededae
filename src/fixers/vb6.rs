use anyhow::Result;

use crate::frameworks::{ProjectDetector, ProjectKind};

use super::patterns::{MissingFile, StaticContents};
use super::traits::{Fixer, FixerContext};

const VB6_GITIGNORE: &str = include_str!("../../templates/vb6.gitignore");

pub fn must_have_git_ignore(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let fixer = MissingFile::new(ctx, ".gitignore", StaticContents(VB6_GITIGNORE))?
        .applies_when(|ctx| ProjectDetector::matches(ctx.dir(), ProjectKind::Vb6));
    Ok(Box::new(fixer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::testing::RecordingGit;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_gitignore_for_vb6_project() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Game.vbp"), "Type=Exe").unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));

        let changes = must_have_git_ignore(FixerContext::new(git.clone()))
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(changes, vec!["Adding .gitignore".to_string()]);
        let written = fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert!(written.contains("*.vbw"));
    }

    #[tokio::test]
    async fn test_no_gitignore_for_other_projects() {
        let tmp = TempDir::new().unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let fixer = must_have_git_ignore(FixerContext::new(git.clone())).unwrap();
        assert!(fixer.run().await.unwrap().is_empty());
    }
}
