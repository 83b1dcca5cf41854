use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::CliError;
use crate::aliases::{AliasError, AliasTable};

#[derive(Debug, Args)]
pub struct AliasArgs {
    /// Aliases file
    #[arg(long, global = true, default_value = ".claude/aliases.json")]
    pub file: PathBuf,
    #[command(subcommand)]
    pub command: AliasCommand,
}

#[derive(Debug, Subcommand)]
pub enum AliasCommand {
    /// List all aliases
    List,
    /// Print the command an alias maps to
    Get { name: String },
    /// Fully expand an alias, appending extra arguments
    Resolve {
        name: String,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Add an alias
    Add {
        name: String,
        command: String,
        /// Overwrite an existing alias
        #[arg(long)]
        force: bool,
    },
    /// Remove an alias
    Remove { name: String },
}

pub fn run(args: AliasArgs) -> Result<(), CliError> {
    let AliasArgs { file, command } = args;
    let mut table = AliasTable::load(&file)?;

    match command {
        AliasCommand::List => {
            if table.is_empty() {
                eprintln!("no aliases in {}", file.display());
            }
            for (name, command) in table.iter() {
                println!("{name} = {command}");
            }
        }
        AliasCommand::Get { name } => {
            let command = table
                .get(&name)
                .ok_or_else(|| AliasError::Unknown(name.clone()))?;
            println!("{command}");
        }
        AliasCommand::Resolve { name, args } => {
            println!("{}", table.resolve(&name, &args)?);
        }
        AliasCommand::Add {
            name,
            command,
            force,
        } => {
            table.insert(&name, &command, force)?;
            table.save(&file)?;
            println!("added alias {name}");
        }
        AliasCommand::Remove { name } => {
            table.remove(&name)?;
            table.save(&file)?;
            println!("removed alias {name}");
        }
    }
    Ok(())
}
