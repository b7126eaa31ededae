use anyhow::Result;
use clap::ValueEnum;
use colored::*;
use serde::Serialize;

use crate::core::processor::BatchSummary;
use crate::fixers::registry::FixerEntry;
use crate::remote::Repo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// One row of the `analyze` report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRow {
    pub repo: String,
    pub kind: String,
    pub count: usize,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn display_repos(&self, repos: &[Repo]) -> Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(repos)?);
            return Ok(());
        }
        if repos.is_empty() {
            println!("{}", "No repositories matched.".yellow());
            return Ok(());
        }
        let width = repos.iter().map(|r| r.full_name.len()).max().unwrap_or(0);
        for repo in repos {
            let language = repo.language.as_deref().unwrap_or("-");
            println!(
                "  {:<width$}  {:<12}  {}",
                repo.full_name.cyan(),
                language,
                repo.updated_at.format("%Y-%m-%d").to_string().dimmed(),
                width = width
            );
        }
        println!();
        println!("  {} repositories", repos.len().to_string().bold());
        Ok(())
    }

    pub fn display_fixers(&self, entries: &[FixerEntry]) -> Result<()> {
        if self.format == OutputFormat::Json {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| serde_json::json!({ "key": e.key(), "description": e.description }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }
        let width = entries.iter().map(|e| e.key().len()).max().unwrap_or(0);
        for entry in entries {
            println!(
                "  {:<width$}  {}",
                entry.key().green(),
                entry.description,
                width = width
            );
        }
        Ok(())
    }

    pub fn display_analysis(&self, metric: &str, rows: &[AnalysisRow]) -> Result<()> {
        let total: usize = rows.iter().map(|r| r.count).sum();
        if self.format == OutputFormat::Json {
            let output = serde_json::json!({
                "metric": metric,
                "repositories": rows,
                "total": total,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        let width = rows.iter().map(|r| r.repo.len()).max().unwrap_or(0);
        for row in rows {
            println!(
                "  {:<width$}  {:<8}  {:>6}",
                row.repo.cyan(),
                row.kind,
                row.count,
                width = width
            );
        }
        println!("{}", "─".repeat(width + 20));
        println!("  Total {}: {}", metric, total.to_string().bold());
        Ok(())
    }

    pub fn display_summary(&self, summary: &BatchSummary) {
        println!();
        println!(
            "  {} processed, {} pull request(s) created",
            summary.processed.to_string().green(),
            summary.published.to_string().bold()
        );
        for (repo, error) in &summary.failures {
            println!("  {} {} {}", "FAILED".red(), repo, error);
        }
    }
}
