use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::CliError;
use crate::aliases::AliasTable;
use crate::chains::{ChainBook, ChainError, Step};

#[derive(Debug, Args)]
pub struct ChainArgs {
    /// Chains file
    #[arg(long, global = true, default_value = ".claude/chains.json")]
    pub file: PathBuf,
    #[command(subcommand)]
    pub command: ChainCommand,
}

#[derive(Debug, Subcommand)]
pub enum ChainCommand {
    /// List chain names with their descriptions
    List,
    /// Show a chain's steps as declared
    Show { name: String },
    /// Print the execution stages of a chain
    Plan {
        name: String,
        /// Resolve commands through this aliases file
        #[arg(long)]
        aliases: Option<PathBuf>,
    },
    /// Check every chain for problems (exit 1 on issues)
    Validate,
}

pub fn run(args: ChainArgs) -> Result<(), CliError> {
    let book = ChainBook::load(&args.file)?;

    match args.command {
        ChainCommand::List => {
            for name in book.names() {
                match book.get(name).and_then(|c| c.description.as_deref()) {
                    Some(description) => println!("{name}: {description}"),
                    None => println!("{name}"),
                }
            }
        }
        ChainCommand::Show { name } => {
            let chain = book
                .get(&name)
                .ok_or_else(|| ChainError::Unknown(name.clone()))?;
            if let Some(description) = &chain.description {
                println!("# {description}");
            }
            for (idx, step) in chain.steps.iter().enumerate() {
                println!("{}. {}", idx + 1, describe(step));
            }
        }
        ChainCommand::Plan { name, aliases } => {
            let table = aliases
                .as_deref()
                .map(AliasTable::load)
                .transpose()?;
            for (idx, stage) in book.plan(&name, table.as_ref())?.iter().enumerate() {
                println!("{}. {stage}", idx + 1);
            }
        }
        ChainCommand::Validate => {
            let issues = book.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if !issues.is_empty() {
                return Err(CliError::ChainIssues(issues.len()));
            }
            println!("{}: ok", args.file.display());
        }
    }
    Ok(())
}

fn describe(step: &Step) -> String {
    match step {
        Step::Command(command) => command.clone(),
        Step::Chain { chain } => format!("-> chain {chain}"),
        Step::Task {
            command,
            parallel,
            agent,
        } => {
            let mut text = command.clone();
            if let Some(label) = parallel {
                text.push_str(&format!(" [parallel: {label}]"));
            }
            if let Some(agent) = agent {
                text.push_str(&format!(" [agent: {agent}]"));
            }
            text
        }
    }
}
