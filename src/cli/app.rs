//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::document_cmd;
use super::output::{Output, OutputFormat};
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "taskmage")]
#[command(author, version, about = "Outline task lists with a mergeable JSON store")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new taskmage project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Print an Mtask file as TaskList
    Open {
        /// Mtask file
        file: PathBuf,
    },

    /// Save TaskList text into an Mtask file
    Save {
        /// Mtask file (created if missing)
        file: PathBuf,

        /// Read the TaskList from this file instead of stdin
        #[arg(long, short)]
        input: Option<PathBuf>,
    },

    /// Edit an Mtask file as TaskList in your editor
    Edit {
        /// Mtask file (created if missing)
        file: PathBuf,
    },

    /// Move complete task chains into the project archive
    Archive {
        /// Mtask file inside a project
        file: PathBuf,
    },

    /// Validate an Mtask or TaskList file
    Check {
        /// File to check (`.mtask`/`.json` are read as Mtask)
        file: PathBuf,
    },
}

/// Installs the tracing subscriber; `RUST_LOG` overrides `--verbose`
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "taskmage=debug,warn" } else { "warn" })
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()?.global.default_format.into(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("TaskMage starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(&path)?;
            output.verbose_ctx(
                "init",
                &format!("Created .taskmage directory at: {}", project.project_dir().display()),
            );
            output.success(&format!("Initialized taskmage project at {}", project.root().display()));
        }

        Commands::Open { file } => document_cmd::open(&output, &file)?,
        Commands::Save { file, input } => document_cmd::save(&output, &file, input.as_deref())?,
        Commands::Edit { file } => document_cmd::edit(&output, &file)?,
        Commands::Archive { file } => document_cmd::archive(&output, &file)?,
        Commands::Check { file } => document_cmd::check(&output, &file)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
