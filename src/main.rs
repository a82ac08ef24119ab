use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "blogen", version, about)]
struct Args {
    /// Log progress of every page and asset
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The command to execute
    #[command(subcommand)]
    command: BlogenCommand,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the blog in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "blogen.yaml")]
    config_file: Option<PathBuf>,

    /// Rebuild every page and copy every file, even if up to date
    #[arg(short, long, default_value = "false")]
    force: bool,
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "blogen.yaml")]
    config_file: Option<PathBuf>,

    /// Only print what would be deleted
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum BlogenCommand {
    /// Initialize a new blog
    Init(InitArgs),

    /// Build the blog
    Build(BuildArgs),

    /// Delete the generated output
    Clean(CleanArgs),
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match args.command {
        BlogenCommand::Init(args) => commands::init::run(&args)?,
        BlogenCommand::Build(args) => commands::build::run(&args)?,
        BlogenCommand::Clean(args) => commands::clean::run(&args)?,
    }

    Ok(())
}
