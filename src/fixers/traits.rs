use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::core::config::Settings;
use crate::core::git::VersionControl;
use crate::remote::{ChangeRequestService, Repo};

/// Human-readable record of one commit made by a fixer. The first line is the
/// summary, further lines are detail.
pub type ChangeDescription = String;

/// Everything a fixer may need, handed uniformly to every fixer constructor.
#[derive(Clone)]
pub struct FixerContext {
    pub git: Arc<dyn VersionControl>,
    pub repo: Option<Repo>,
    pub github: Option<Arc<dyn ChangeRequestService>>,
    pub http: reqwest::Client,
    pub settings: Arc<Settings>,
    pub verbose: bool,
}

impl FixerContext {
    pub fn new(git: Arc<dyn VersionControl>) -> Self {
        Self {
            git,
            repo: None,
            github: None,
            http: reqwest::Client::new(),
            settings: Arc::new(Settings::default()),
            verbose: false,
        }
    }

    pub fn with_repo(mut self, repo: Repo) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_github(mut self, github: Arc<dyn ChangeRequestService>) -> Self {
        self.github = Some(github);
        self
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn dir(&self) -> &Path {
        self.git.dir()
    }

    pub fn is_file(&self, relative: &str) -> bool {
        self.dir().join(relative).is_file()
    }

    pub fn default_branch(&self) -> &str {
        self.repo
            .as_ref()
            .map(|repo| repo.default_branch.as_str())
            .unwrap_or("main")
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        let full_name = self.repo.as_ref().map(|repo| repo.full_name.as_str())?;
        self.settings.get(full_name, key)
    }
}

/// One idempotent mutation applied to a working copy.
///
/// `run` commits every change it makes before returning and returns one
/// [`ChangeDescription`] per commit. On a working copy that already satisfies
/// the fixer it returns an empty list.
#[async_trait]
pub trait Fixer: Send + Sync {
    async fn run(&self) -> Result<Vec<ChangeDescription>>;
}
