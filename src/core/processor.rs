//! Per-repository pipeline and the batch loop around it.

use anyhow::{Context, Result};
use clap::ValueEnum;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

use crate::core::branch::{self, MUTATION_BRANCH};
use crate::core::config::Settings;
use crate::core::publisher::{PublishOutcome, Publisher};
use crate::core::reconcile::reconcile;
use crate::core::working_copy::WorkingCopy;
use crate::fixers::{ChangeDescription, Fixer, FixerContext, FixerRegistry};
use crate::remote::{ChangeRequestService, Repo};

/// What a failed repository does to the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OnError {
    #[default]
    Abort,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOutcome {
    pub changes: Vec<ChangeDescription>,
    pub publish: PublishOutcome,
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub published: usize,
    pub failures: Vec<(String, String)>,
}

pub struct RepoProcessor {
    registry: FixerRegistry,
    github: Arc<dyn ChangeRequestService>,
    http: reqwest::Client,
    settings: Arc<Settings>,
    dry_run: bool,
    verbose: bool,
}

impl RepoProcessor {
    pub fn new(registry: FixerRegistry, github: Arc<dyn ChangeRequestService>) -> Self {
        Self {
            registry,
            github,
            http: reqwest::Client::new(),
            settings: Arc::new(Settings::default()),
            dry_run: false,
            verbose: false,
        }
    }

    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_settings(mut self, settings: Arc<Settings>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Clone, fix, reconcile and publish one repository. The working copy is
    /// removed before this returns.
    pub async fn process(&self, repo: &Repo) -> Result<RepoOutcome> {
        let copy = WorkingCopy::clone_from(&repo.ssh_url, !self.verbose).await?;
        let git = copy.git();
        branch::prepare(&*git, MUTATION_BRANCH)
            .await
            .context("failed to prepare branch")?;

        let ctx = FixerContext::new(git.clone())
            .with_repo(repo.clone())
            .with_github(Arc::clone(&self.github))
            .with_http(self.http.clone())
            .with_settings(Arc::clone(&self.settings))
            .with_verbose(self.verbose);
        let composite = self.registry.instantiate(&ctx)?;
        let changes = composite.run().await?;

        let decision = reconcile(&*git, MUTATION_BRANCH, &repo.default_branch, changes).await?;
        let publish = Publisher::new(&*self.github, self.dry_run)
            .publish(&*git, repo, MUTATION_BRANCH, &decision)
            .await?;
        Ok(RepoOutcome {
            changes: decision.changes,
            publish,
        })
    }

    /// Processes repositories one at a time, applying `on_error` to failures.
    pub async fn process_all(&self, repos: &[Repo], on_error: OnError) -> Result<BatchSummary> {
        let mut summary = BatchSummary::default();
        for repo in repos {
            let span = info_span!("repo", name = %repo.full_name);
            match self.process(repo).instrument(span).await {
                Ok(outcome) => {
                    summary.processed += 1;
                    if matches!(outcome.publish, PublishOutcome::Created(_)) {
                        summary.published += 1;
                    }
                    info!(
                        repo = %repo.full_name,
                        changes = outcome.changes.len(),
                        "processed repository"
                    );
                }
                Err(err) if on_error == OnError::Continue => {
                    error!(repo = %repo.full_name, error = %format!("{:#}", err), "failed to process repository");
                    summary.failures.push((repo.full_name.clone(), format!("{:#}", err)));
                }
                Err(err) => {
                    return Err(err.context(format!("failed to process {}", repo.full_name)));
                }
            }
        }
        Ok(summary)
    }
}
