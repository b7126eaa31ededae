//! Files every repository should carry.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Datelike, Utc};

use super::patterns::{Computed, ContentSource, MissingFile, StaticContents};
use super::traits::{Fixer, FixerContext};

const EDITORCONFIG: &str = include_str!("../../templates/editorconfig");
const FUNDING: &str = include_str!("../../templates/FUNDING.yml");
const MIT_LICENSE: &str = include_str!("../../templates/LICENSE-MIT.txt");

pub fn must_have_editor_config(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    Ok(Box::new(MissingFile::new(
        ctx,
        ".editorconfig",
        StaticContents(EDITORCONFIG),
    )?))
}

/// Adds `.github/FUNDING.yml` pointing at the `funding_url` setting.
pub fn must_have_git_hub_funding(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let contents = Computed(|ctx: &FixerContext| -> Option<String> {
        ctx.setting("funding_url")
            .map(|url| FUNDING.replace("[funding_url]", url))
    });
    Ok(Box::new(MissingFile::new(ctx, ".github/FUNDING.yml", contents)?))
}

/// MIT license for public repositories that are not forks.
pub fn must_have_license(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let fixer = MissingFile::new(ctx, "LICENSE", LicenseText)?.applies_when(|ctx| {
        ctx.repo
            .as_ref()
            .is_some_and(|repo| !repo.private && !repo.fork)
    });
    Ok(Box::new(fixer))
}

pub fn must_have_readme(ctx: FixerContext) -> Result<Box<dyn Fixer>> {
    let contents = Computed(|ctx: &FixerContext| -> Option<String> {
        ctx.repo.as_ref().map(|repo| readme_text(&repo.name, repo.description.as_deref()))
    });
    Ok(Box::new(MissingFile::new(ctx, "README.md", contents)?))
}

struct LicenseText;

#[async_trait]
impl ContentSource for LicenseText {
    async fn contents(&self, ctx: &FixerContext) -> Result<Option<String>> {
        let holder = match ctx.setting("license_holder") {
            Some(holder) => holder.to_string(),
            None => ctx.git.user_name().await?,
        };
        Ok(Some(license_text(Utc::now().year(), &holder)))
    }
}

fn license_text(year: i32, holder: &str) -> String {
    MIT_LICENSE
        .replace("[year]", &year.to_string())
        .replace("[fullname]", holder)
}

fn readme_text(name: &str, description: Option<&str>) -> String {
    let mut text = format!("# {}\n\n", name);
    if let Some(description) = description.filter(|d| !d.trim().is_empty()) {
        text.push_str(description.trim());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Settings;
    use crate::core::git::testing::RecordingGit;
    use crate::remote::repo::sample_repo;
    use std::collections::BTreeMap;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(tmp: &TempDir) -> (Arc<RecordingGit>, FixerContext) {
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let ctx = FixerContext::new(git.clone()).with_repo(sample_repo("tool"));
        (git, ctx)
    }

    fn settings(pairs: &[(&str, &str)]) -> Arc<Settings> {
        let defaults: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(Settings {
            defaults,
            repos: BTreeMap::new(),
        })
    }

    #[tokio::test]
    async fn test_editorconfig_added() {
        let tmp = TempDir::new().unwrap();
        let (git, ctx) = context(&tmp);
        let changes = must_have_editor_config(ctx).unwrap().run().await.unwrap();
        assert_eq!(changes, vec!["Adding .editorconfig".to_string()]);
        let written = fs::read_to_string(tmp.path().join(".editorconfig")).unwrap();
        assert!(written.contains("root = true"));
        assert_eq!(git.commits().len(), 1);
    }

    #[tokio::test]
    async fn test_funding_requires_setting() {
        let tmp = TempDir::new().unwrap();
        let (git, ctx) = context(&tmp);
        assert!(must_have_git_hub_funding(ctx).unwrap().run().await.unwrap().is_empty());
        assert!(git.calls().is_empty());

        let tmp = TempDir::new().unwrap();
        let (_, ctx) = context(&tmp);
        let ctx = ctx.with_settings(settings(&[("funding_url", "https://example.com/tip")]));
        let changes = must_have_git_hub_funding(ctx).unwrap().run().await.unwrap();
        assert_eq!(changes, vec!["Adding .github/FUNDING.yml".to_string()]);
        let written = fs::read_to_string(tmp.path().join(".github/FUNDING.yml")).unwrap();
        assert!(written.contains("https://example.com/tip"));
    }

    #[tokio::test]
    async fn test_license_uses_git_user_name() {
        let tmp = TempDir::new().unwrap();
        let (_, ctx) = context(&tmp);
        let changes = must_have_license(ctx).unwrap().run().await.unwrap();
        assert_eq!(changes, vec!["Adding LICENSE".to_string()]);
        let written = fs::read_to_string(tmp.path().join("LICENSE")).unwrap();
        let expected = format!("Copyright (c) {} Fleet Tester", Utc::now().year());
        assert!(written.contains(&expected));
    }

    #[tokio::test]
    async fn test_license_holder_setting_wins() {
        let tmp = TempDir::new().unwrap();
        let (_, ctx) = context(&tmp);
        let ctx = ctx.with_settings(settings(&[("license_holder", "Acme Ltd")]));
        must_have_license(ctx).unwrap().run().await.unwrap();
        let written = fs::read_to_string(tmp.path().join("LICENSE")).unwrap();
        assert!(written.contains("Acme Ltd"));
        assert!(!written.contains("[fullname]"));
    }

    #[tokio::test]
    async fn test_license_skipped_for_private_and_forks() {
        for (private, fork) in [(true, false), (false, true)] {
            let tmp = TempDir::new().unwrap();
            let git = Arc::new(RecordingGit::new(tmp.path()));
            let mut repo = sample_repo("tool");
            repo.private = private;
            repo.fork = fork;
            let ctx = FixerContext::new(git.clone()).with_repo(repo);
            assert!(must_have_license(ctx).unwrap().run().await.unwrap().is_empty());
            assert!(!tmp.path().join("LICENSE").exists());
        }
    }

    #[tokio::test]
    async fn test_readme_from_repo_metadata() {
        let tmp = TempDir::new().unwrap();
        let git = Arc::new(RecordingGit::new(tmp.path()));
        let mut repo = sample_repo("tool");
        repo.description = Some("Sharpens things".to_string());
        let ctx = FixerContext::new(git.clone()).with_repo(repo);
        let changes = must_have_readme(ctx).unwrap().run().await.unwrap();
        assert_eq!(changes, vec!["Adding README.md".to_string()]);
        let written = fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert_eq!(written, "# tool\n\nSharpens things\n");
    }

    #[test]
    fn test_readme_text_without_description() {
        assert_eq!(readme_text("tool", None), "# tool\n\n");
        assert_eq!(readme_text("tool", Some("  ")), "# tool\n\n");
    }
}
