use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod build;
mod commands;
mod config;
mod server;
mod util;

#[derive(Parser)]
#[command(name = "docpress", version, about)]
struct Args {
    /// Log progress at info level (otherwise RUST_LOG, or warnings only)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: DocpressCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "docpress.yaml")]
    config_file: Option<PathBuf>,

    /// Version string substituted into templates, overriding the config
    #[arg(long = "doc-version", value_name = "VERSION")]
    doc_version: Option<String>,

    /// Date string substituted into templates, overriding the config
    #[arg(long)]
    date: Option<String>,

    /// Skip writing the archive
    #[arg(long, default_value = "false")]
    no_package: bool,

    /// Write a JSON build report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "docpress.yaml")]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting it
    #[arg(short, long, default_value = "false")]
    dry_run: bool,
}

#[derive(Parser)]
struct ServeArgs {
    /// The address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// The port to bind to
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Open the HTML output in the default browser
    #[arg(short, long, default_value = "false")]
    open: bool,

    /// The path to the configuration file
    #[arg(short, long, default_value = "docpress.yaml")]
    config_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum DocpressCommand {
    /// Initialize a new docpress project
    Init(InitArgs),

    /// Build HTML, e-book and PDF output and package it
    Build(BuildArgs),

    /// Delete the staging directory, the output directory and the archive
    Clean(CleanArgs),

    /// Serve the generated HTML output on a local port
    Serve(ServeArgs),
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        DocpressCommand::Init(args) => {
            commands::init::run(&args)?;
        }
        DocpressCommand::Build(args) => {
            commands::build::run(&args)?;
        }
        DocpressCommand::Clean(args) => {
            commands::clean::run(&args)?;
        }
        DocpressCommand::Serve(args) => {
            commands::serve::run(&args)?;
        }
    }

    Ok(())
}
