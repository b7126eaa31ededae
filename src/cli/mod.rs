pub mod commands;
pub mod output;
pub mod progress;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::Settings;
use crate::core::error::ConfigError;
use crate::remote::{Direction, FilterMode, GitHubClient, Match, RepoFilter, SortField};

#[derive(Parser, Debug)]
#[command(
    name = "fleetfix",
    version,
    about = "Apply hygiene fixes across your GitHub repositories"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the fixers and open one pull request per repository
    Fix(commands::fix::FixArgs),
    /// List repositories, or the available fixers
    List(commands::list::ListArgs),
    /// Count recent commits or touched files per repository
    Analyze(commands::analyze::AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// GitHub user name
    #[arg(short = 'u', long, global = true)]
    pub user: Option<String>,

    /// GitHub personal access token
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// Debug logging and git output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to ~/.fleetfix.yml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How to treat archived repositories
    #[arg(long, global = true, value_enum, default_value_t = FilterMode::Deny)]
    pub archived: FilterMode,

    /// How to treat forks
    #[arg(long, global = true, value_enum, default_value_t = FilterMode::Deny)]
    pub forks: FilterMode,

    /// Only repositories whose name starts with this prefix
    #[arg(long, global = true, conflicts_with = "except_name_prefix")]
    pub only_name_prefix: Option<String>,

    /// Skip repositories whose name starts with this prefix
    #[arg(long, global = true)]
    pub except_name_prefix: Option<String>,

    /// Only repositories in this language
    #[arg(long, global = true, conflicts_with = "except_language")]
    pub only_language: Option<String>,

    /// Skip repositories in this language
    #[arg(long, global = true)]
    pub except_language: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = SortField::FullName)]
    pub sort: SortField,

    #[arg(long, global = true, value_enum, default_value_t = Direction::Asc)]
    pub direction: Direction,
}

impl GlobalArgs {
    pub fn repo_filter(&self) -> RepoFilter {
        RepoFilter {
            archived: self.archived,
            forks: self.forks,
            name_prefix: Match::from_pair(
                self.only_name_prefix.clone(),
                self.except_name_prefix.clone(),
            ),
            language: Match::from_pair(self.only_language.clone(), self.except_language.clone()),
        }
    }

    pub fn settings(&self) -> Result<Settings, ConfigError> {
        match self.config.clone().or_else(Settings::default_path) {
            Some(path) => Settings::load(&path),
            None => Ok(Settings::default()),
        }
    }

    pub fn github(&self, read_only: bool) -> Result<GitHubClient> {
        let (Some(user), Some(token)) = (&self.user, &self.token) else {
            return Err(ConfigError::MissingCredentials.into());
        };
        GitHubClient::new(user.as_str(), token.as_str(), read_only)
    }
}
