use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::cli::GlobalArgs;
use crate::core::processor::{OnError, RepoProcessor};
use crate::fixers::{default_registry, FixerSelection};
use crate::remote::filtered_repos;

#[derive(Args, Debug)]
pub struct FixArgs {
    /// Run the fixers but do not push or open pull requests
    #[arg(long)]
    pub dry_run: bool,

    /// Only run fixers whose key starts with one of these prefixes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub only_fixers: Vec<String>,

    /// Skip fixers whose key starts with one of these prefixes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub except_fixers: Vec<String>,

    /// Stop at the first failing repository, or log it and continue
    #[arg(long, value_enum, default_value_t = OnError::Abort)]
    pub on_error: OnError,
}

pub async fn execute(global: &GlobalArgs, args: &FixArgs) -> Result<()> {
    let selection = FixerSelection::from_lists(args.only_fixers.clone(), args.except_fixers.clone())?;
    let registry = default_registry().select(&selection);
    if registry.entries().is_empty() {
        println!("{}", "No fixers selected.".yellow());
        return Ok(());
    }
    let settings = Arc::new(global.settings()?);
    let github = Arc::new(global.github(args.dry_run)?);

    let repos = filtered_repos(
        &*github,
        &global.repo_filter(),
        global.sort,
        global.direction,
    )
    .await?;
    info!(
        repos = repos.len(),
        fixers = registry.entries().len(),
        dry_run = args.dry_run,
        "starting batch"
    );

    let processor = RepoProcessor::new(registry, github.clone())
        .with_http(github.http().clone())
        .with_settings(settings)
        .with_dry_run(args.dry_run)
        .with_verbose(global.verbose);
    let summary = processor.process_all(&repos, args.on_error).await?;

    OutputFormatter::new(OutputFormat::Table).display_summary(&summary);
    if !summary.failures.is_empty() {
        bail!("{} repositories failed", summary.failures.len());
    }
    Ok(())
}
