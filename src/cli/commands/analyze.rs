use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use tracing::info;

use crate::cli::output::{AnalysisRow, OutputFormat, OutputFormatter};
use crate::cli::progress::Spinner;
use crate::cli::GlobalArgs;
use crate::core::error::ConfigError;
use crate::core::working_copy::WorkingCopy;
use crate::frameworks::ProjectDetector;
use crate::remote::filtered_repos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    Commits,
    Files,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Commits => "commits",
            Metric::Files => "files",
        }
    }
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Start date, YYYY-MM-DD
    #[arg(long)]
    pub since: String,

    #[arg(long, value_enum, default_value_t = Metric::Commits)]
    pub metric: Metric,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

pub fn parse_since(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

pub async fn execute(global: &GlobalArgs, args: &AnalyzeArgs) -> Result<()> {
    let since = parse_since(&args.since)?.format("%Y-%m-%d").to_string();
    let github = global.github(true)?;
    let repos = filtered_repos(&github, &global.repo_filter(), global.sort, global.direction).await?;

    let spinner = Spinner::new("Analyzing repositories...");
    let mut rows = Vec::with_capacity(repos.len());
    for repo in &repos {
        spinner.set_message(&format!("Analyzing {}...", repo.full_name));
        let copy = WorkingCopy::clone_from(&repo.ssh_url, !global.verbose)
            .await
            .with_context(|| format!("failed to analyze {}", repo.full_name))?;
        let git = copy.git();
        let count = match args.metric {
            Metric::Commits => git.count_commits_since(&since).await?,
            Metric::Files => git.files_changed_since(&since).await?.len(),
        };
        let kind = ProjectDetector::detect(copy.path()).kind.to_string();
        info!(repo = %repo.full_name, count, "analyzed repository");
        rows.push(AnalysisRow {
            repo: repo.full_name.clone(),
            kind,
            count,
        });
    }
    spinner.finish();

    OutputFormatter::new(args.format).display_analysis(args.metric.as_str(), &rows)
}
