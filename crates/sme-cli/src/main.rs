//! sme - command line front end for the semantic manifest editor

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{check_db, export, ls, validate, versions};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Validate(args) => validate::execute(args, &cli.global).await,
        Commands::CheckDb(args) => check_db::execute(args, &cli.global).await,
        Commands::Export(args) => export::execute(args, &cli.global).await,
        Commands::Versions(args) => versions::execute(args, &cli.global).await,
        Commands::Ls(args) => ls::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => std::process::ExitCode::from(*code),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::from(2)
            }
        },
    }
}
