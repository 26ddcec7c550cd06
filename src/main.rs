//! CLI entry point for mdxprep

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mdxprep")]
#[command(version)]
#[command(about = "Prepare loosely formatted blog content for strict MDX renderers", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all posts, newest first
    #[command(alias = "ls")]
    List,

    /// Show a single post rendered to HTML
    Show {
        /// Slug of the post
        slug: String,

        /// Print the sanitized body instead of rendered HTML
        #[arg(short, long)]
        raw: bool,
    },

    /// Search posts by title, description, or category
    Search {
        /// Term to search for
        term: String,
    },

    /// Sanitize markup from a file or stdin
    Sanitize {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdxprep=debug,info"
    } else {
        "mdxprep=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List => {
            let site = mdxprep::Site::new(&base_dir)?;
            mdxprep::commands::list::run(&site)?;
        }

        Commands::Show { slug, raw } => {
            let site = mdxprep::Site::new(&base_dir)?;
            tracing::debug!("Showing post: {}", slug);
            mdxprep::commands::show::run(&site, &slug, raw)?;
        }

        Commands::Search { term } => {
            let site = mdxprep::Site::new(&base_dir)?;
            mdxprep::commands::search::run(&site, &term)?;
        }

        Commands::Sanitize { file } => {
            mdxprep::commands::sanitize::run(file.as_deref())?;
        }

        Commands::Version => {
            println!("mdxprep version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
