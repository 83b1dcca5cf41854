use clap::{Parser, Subcommand};
use std::path::PathBuf;

use claude_hookkit::cli::alias::AliasArgs;
use claude_hookkit::cli::chain::ChainArgs;
use claude_hookkit::cli::settings::SettingsCommand;

/// Content-check hooks and JSON config tooling for Claude Code.
#[derive(Debug, Parser)]
#[command(name = "claude-hookkit", version, about)]
struct Cli {
    /// Append diagnostic logs here instead of stderr (filter via HOOKKIT_LOG)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run as a Claude Code hook (reads stdin; exit 0 allow, 1 warn, 2 block)
    Hook {
        /// Path to the KDL config file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Audit, patch and merge settings.json
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Manage aliases.json
    Alias(AliasArgs),
    /// Inspect and plan chains.json
    Chain(ChainArgs),
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = claude_hookkit::logging::init(cli.log_file.as_deref()) {
        eprintln!("claude-hookkit: cannot open log file: {e}");
    }

    match cli.command {
        Commands::Hook { config } => {
            std::process::exit(claude_hookkit::run_hook(config.as_deref()))
        }
        Commands::Settings(command) => claude_hookkit::cli::settings::run(command)?,
        Commands::Alias(args) => claude_hookkit::cli::alias::run(args)?,
        Commands::Chain(args) => claude_hookkit::cli::chain::run(args)?,
    }
    Ok(())
}
