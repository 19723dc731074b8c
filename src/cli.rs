//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Message Center static site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: mcsite.toml)
    #[arg(short = 'C', long, default_value = "mcsite.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Clean output directory completely before building
    #[arg(long)]
    pub clean: bool,

    /// Minify generated html and xml
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// enable sitemap generation
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub sitemap: Option<bool>,

    /// enable static message page generation
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub pages: Option<bool>,

    /// Override base URL for the site.
    ///
    /// Useful for CI/CD deployments where the production URL differs from local development.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Version string recorded in build-info.json
    #[arg(long = "build-version", env = "MCSITE_VERSION", default_value = "0.0.0-dev")]
    pub build_version: String,

    /// Commit identifier recorded in build-info.json
    #[arg(long, env = "MCSITE_COMMIT", default_value = "unknown")]
    pub commit: String,

    /// Environment name recorded in build-info.json
    #[arg(long, env = "MCSITE_ENV", default_value = "development")]
    pub environment: String,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site into the output directory
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then serve the output with client-side routing fallback
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the URL slug for a message title
    Slug {
        /// message title
        title: String,
    },
}

impl Cli {
    pub fn build_args(&self) -> Option<&BuildArgs> {
        match &self.command {
            Commands::Build { build_args } | Commands::Serve { build_args, .. } => Some(build_args),
            Commands::Slug { .. } => None,
        }
    }
}
