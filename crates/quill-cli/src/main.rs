//! Quill CLI
//!
//! Command-line interface for Quill - a minimal personal blog.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use quill_core::{open_record_store, Config, PostService};

mod commands;
mod editor;
mod logging;
mod output;

use commands::post::{ContentSource, Service};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - a minimal personal blog")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - ids only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More diagnostic output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage posts
    Post {
        #[command(subcommand)]
        command: PostCommands,
    },
    /// Render markdown from a file or stdin to HTML
    Render {
        /// Markdown file (reads stdin if omitted)
        file: Option<PathBuf>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum PostCommands {
    /// List all posts, most recently updated first
    #[command(alias = "ls")]
    List,
    /// Show a post
    Show {
        /// Post ID (full or prefix)
        id: String,
    },
    /// Create a new post
    #[command(alias = "add")]
    Create {
        /// Post title
        #[arg(short, long)]
        title: String,
        /// Post content (opens editor if neither --content nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// Content format: markdown or html
        #[arg(long)]
        format: Option<String>,
    },
    /// Edit a post (opens editor if no flags are given)
    Edit {
        /// Post ID (full or prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content
        #[arg(short, long, conflicts_with = "file")]
        content: Option<String>,
        /// Read new content from a file
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
        /// New content format: markdown or html
        #[arg(long)]
        format: Option<String>,
    },
    /// Delete a post
    #[command(alias = "rm")]
    Delete {
        /// Post ID (full or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Render a post to HTML
    Render {
        /// Post ID (full or prefix)
        id: String,
        /// Wrap the post in a full HTML document
        #[arg(long)]
        page: bool,
        /// Open the rendered page in the default browser
        #[arg(long)]
        open: bool,
    },
    /// List the posts this post references
    Refs {
        /// Post ID (full or prefix)
        id: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output.error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    logging::init(&config, cli.verbose);
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        storage = %config.storage,
        "loaded configuration"
    );

    match cli.command {
        Commands::Config { command } => {
            handle_config_command(command, cli.config.as_ref(), output)
        }
        Commands::Render { file } => commands::render::markdown(file, output),
        Commands::Post { command } => {
            let records = open_record_store(&config).context("Failed to open post storage")?;
            let service = PostService::new(records);
            handle_post_command(command, &service, output)
        }
    }
}

fn handle_post_command(command: PostCommands, service: &Service, output: &Output) -> Result<()> {
    match command {
        PostCommands::List => commands::post::list(service, output),
        PostCommands::Show { id } => commands::post::show(service, id, output),
        PostCommands::Create {
            title,
            content,
            file,
            format,
        } => commands::post::create(
            service,
            title,
            ContentSource { content, file },
            format,
            output,
        ),
        PostCommands::Edit {
            id,
            title,
            content,
            file,
            format,
        } => commands::post::edit(
            service,
            id,
            title,
            ContentSource { content, file },
            format,
            output,
        ),
        PostCommands::Delete { id, yes } => commands::post::delete(service, id, yes, output),
        PostCommands::Render { id, page, open } => {
            commands::post::render(service, id, page, open, output)
        }
        PostCommands::Refs { id } => commands::post::refs(service, id, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}
