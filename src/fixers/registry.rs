use anyhow::{Context, Result};

use crate::core::error::ConfigError;

use super::composite::CompositeFixer;
use super::traits::{Fixer, FixerContext};
use super::{ci, dotnet, maven, missing_files, pascal, readme, vb6};

pub type FixerBuilder = fn(FixerContext) -> Result<Box<dyn Fixer>>;

/// One fixer known to the tool.
#[derive(Clone, Copy)]
pub struct FixerEntry {
    pub group: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub build: FixerBuilder,
}

impl FixerEntry {
    pub fn key(&self) -> String {
        fixer_key(self.group, self.name)
    }
}

/// All fixers, in execution order.
pub static CATALOG: &[FixerEntry] = &[
    FixerEntry {
        group: "maven",
        name: "MavenFix",
        description: "Corrects the parent pom and updates dependency versions",
        build: maven::maven_fix,
    },
    FixerEntry {
        group: "maven",
        name: "MustHaveMavenGitHubWorkflow",
        description: "Adds a GitHub Actions Maven build workflow",
        build: maven::must_have_maven_git_hub_workflow,
    },
    FixerEntry {
        group: "maven",
        name: "MustHaveMavenGitIgnore",
        description: "Adds a .gitignore for Maven projects",
        build: maven::must_have_maven_git_ignore,
    },
    FixerEntry {
        group: "dotnet",
        name: "MustHaveGitHubAction",
        description: "Adds a GitHub Actions workflow for C# solutions and removes appveyor.yml",
        build: dotnet::must_have_git_hub_action,
    },
    FixerEntry {
        group: "vb6",
        name: "MustHaveGitIgnore",
        description: "Adds a .gitignore for VB6 projects",
        build: vb6::must_have_git_ignore,
    },
    FixerEntry {
        group: "pascal",
        name: "MustHaveLazarusGitIgnore",
        description: "Adds a .gitignore for Lazarus projects",
        build: pascal::must_have_lazarus_git_ignore,
    },
    FixerEntry {
        group: "missing_files",
        name: "MustHaveEditorConfig",
        description: "Adds an .editorconfig",
        build: missing_files::must_have_editor_config,
    },
    FixerEntry {
        group: "missing_files",
        name: "MustHaveGitHubFunding",
        description: "Adds .github/FUNDING.yml from the funding_url setting",
        build: missing_files::must_have_git_hub_funding,
    },
    FixerEntry {
        group: "missing_files",
        name: "MustHaveLicense",
        description: "Adds an MIT LICENSE to public repositories that are not forks",
        build: missing_files::must_have_license,
    },
    FixerEntry {
        group: "missing_files",
        name: "MustHaveReadme",
        description: "Adds a README.md with the repository name and description",
        build: missing_files::must_have_readme,
    },
    FixerEntry {
        group: "ci",
        name: "NoTravis",
        description: "Removes .travis.yml",
        build: ci::no_travis,
    },
    FixerEntry {
        group: "ci",
        name: "NoTravisBadge",
        description: "Removes the Travis badge from README.md",
        build: ci::no_travis_badge,
    },
    FixerEntry {
        group: "readme",
        name: "ReadmeImage",
        description: "Repairs README image links whose file moved up a folder",
        build: readme::readme_image,
    },
    FixerEntry {
        group: "readme",
        name: "RepoDescription",
        description: "Syncs the repository description from README.md",
        build: readme::repo_description,
    },
];

/// `MustHaveCSharpAppVeyor` becomes `must_have_c_sharp_app_veyor`.
pub fn snake_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 8);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

pub fn fixer_key(group: &str, name: &str) -> String {
    format!("{}.{}", group, snake_case(name))
}

/// Which fixers to run, by key prefix.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FixerSelection {
    #[default]
    All,
    Only(Vec<String>),
    Except(Vec<String>),
}

impl FixerSelection {
    pub fn from_lists(only: Vec<String>, except: Vec<String>) -> Result<Self, ConfigError> {
        match (only.is_empty(), except.is_empty()) {
            (true, true) => Ok(FixerSelection::All),
            (false, true) => Ok(FixerSelection::Only(only)),
            (true, false) => Ok(FixerSelection::Except(except)),
            (false, false) => Err(ConfigError::ConflictingSelection),
        }
    }

    pub fn includes(&self, key: &str) -> bool {
        match self {
            FixerSelection::All => true,
            FixerSelection::Only(prefixes) => prefixes.iter().any(|p| key.starts_with(p.as_str())),
            FixerSelection::Except(prefixes) => !prefixes.iter().any(|p| key.starts_with(p.as_str())),
        }
    }
}

pub struct FixerRegistry {
    entries: Vec<FixerEntry>,
}

impl FixerRegistry {
    pub fn new(entries: Vec<FixerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FixerEntry] {
        &self.entries
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(FixerEntry::key).collect()
    }

    /// Keeps the selected entries, preserving order.
    pub fn select(&self, selection: &FixerSelection) -> FixerRegistry {
        let entries = self
            .entries
            .iter()
            .filter(|entry| selection.includes(&entry.key()))
            .copied()
            .collect();
        FixerRegistry::new(entries)
    }

    /// Builds a fresh instance of every entry for one repository.
    pub fn instantiate(&self, ctx: &FixerContext) -> Result<CompositeFixer> {
        let mut fixers = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let key = entry.key();
            let fixer = (entry.build)(ctx.clone()).with_context(|| format!("failed to build fixer {}", key))?;
            fixers.push((key, fixer));
        }
        Ok(CompositeFixer::new(fixers))
    }
}

pub fn default_registry() -> FixerRegistry {
    FixerRegistry::new(CATALOG.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::git::testing::RecordingGit;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_fixer_key() {
        assert_eq!(
            fixer_key("dotnet", "MustHaveCSharpAppVeyor"),
            "dotnet.must_have_c_sharp_app_veyor"
        );
        assert_eq!(fixer_key("ci", "NoTravis"), "ci.no_travis");
        assert_eq!(snake_case("already"), "already");
    }

    #[test]
    fn test_catalog_keys_are_unique() {
        let keys = default_registry().keys();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert_eq!(keys.first().map(String::as_str), Some("maven.maven_fix"));
        assert_eq!(keys.last().map(String::as_str), Some("readme.repo_description"));
    }

    #[test]
    fn test_select_only_prefix_keeps_order() {
        let selection = FixerSelection::from_lists(vec!["missing_files".to_string()], vec![]).unwrap();
        let keys = default_registry().select(&selection).keys();
        assert_eq!(
            keys,
            vec![
                "missing_files.must_have_editor_config",
                "missing_files.must_have_git_hub_funding",
                "missing_files.must_have_license",
                "missing_files.must_have_readme",
            ]
        );
    }

    #[test]
    fn test_select_except_prefix() {
        let selection =
            FixerSelection::from_lists(vec![], vec!["maven".to_string(), "ci.no_travis".to_string()]).unwrap();
        let keys = default_registry().select(&selection).keys();
        assert!(keys.iter().all(|k| !k.starts_with("maven") && !k.starts_with("ci.")));
        assert_eq!(keys.len(), CATALOG.len() - 5);
    }

    #[test]
    fn test_both_lists_is_config_error() {
        let err = FixerSelection::from_lists(vec!["a".to_string()], vec!["b".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::ConflictingSelection));
    }

    #[test]
    fn test_instantiate_builds_every_selected_fixer() {
        let tmp = TempDir::new().unwrap();
        let ctx = FixerContext::new(Arc::new(RecordingGit::new(tmp.path())));
        let composite = default_registry().instantiate(&ctx).unwrap();
        assert_eq!(composite.len(), CATALOG.len());
    }
}
