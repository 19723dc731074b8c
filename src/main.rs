//! mcsite - static site builder for Microsoft 365 Message Center archives.

mod build;
mod cli;
mod config;
mod generator;
mod logger;
mod message;
mod related;
mod serve;
mod utils;

use anyhow::Result;
use build::build_site;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use generator::build_info::Release;
use serve::serve_site;
use std::process::ExitCode;
use utils::slug::slugify;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log!("error"; "{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Slug { title } => {
            println!("{}", slugify(title));
            Ok(())
        }
        Commands::Build { build_args } => {
            let config = SiteConfig::load(cli)?;
            build_site(&config, &Release::from(build_args), Utc::now()).map(|_| ())
        }
        Commands::Serve { build_args, .. } => {
            let config = SiteConfig::load(cli)?;
            build_site(&config, &Release::from(build_args), Utc::now())?;
            serve_site(&config)
        }
    }
}
