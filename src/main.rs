mod cli;
mod core;
mod fixers;
mod frameworks;
mod logging;
mod remote;
mod utils;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let result = match &cli.command {
        Commands::Fix(args) => cli::commands::fix::execute(&cli.global, args).await,
        Commands::List(args) => cli::commands::list::execute(&cli.global, args).await,
        Commands::Analyze(args) => cli::commands::analyze::execute(&cli.global, args).await,
    };

    if let Err(err) = result {
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(1);
    }
}
