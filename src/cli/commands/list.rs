use anyhow::Result;
use clap::Args;

use crate::cli::output::{OutputFormat, OutputFormatter};
use crate::cli::progress::Spinner;
use crate::cli::GlobalArgs;
use crate::fixers::default_registry;
use crate::remote::filtered_repos;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// List the available fixers instead of repositories
    #[arg(long)]
    pub list_fixers: bool,
}

pub async fn execute(global: &GlobalArgs, args: &ListArgs) -> Result<()> {
    let formatter = OutputFormatter::new(args.format);
    if args.list_fixers {
        return formatter.display_fixers(default_registry().entries());
    }

    let github = global.github(true)?;
    let spinner = Spinner::new("Fetching repositories...");
    let repos = filtered_repos(&github, &global.repo_filter(), global.sort, global.direction).await;
    spinner.finish();

    formatter.display_repos(&repos?)
}
