use std::path::PathBuf;

use clap::Subcommand;

use super::CliError;
use crate::jsonfile;
use crate::settings::{self, AuditSeverity, KNOWN_EVENTS};

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Check a settings.json for structural problems (exit 1 on errors)
    Audit {
        /// Settings file to audit
        file: PathBuf,
    },
    /// Register a command hook (no-op if already present)
    AddHook {
        /// Settings file to patch (created if missing)
        file: PathBuf,
        /// Hook event, e.g. PreToolUse
        #[arg(long)]
        event: String,
        /// Tool-name regex for PreToolUse/PostToolUse
        #[arg(long)]
        matcher: Option<String>,
        /// Command to run
        #[arg(long)]
        command: String,
        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Remove every hook running the given command
    RemoveHook {
        /// Settings file to patch
        file: PathBuf,
        /// Command to remove
        #[arg(long)]
        command: String,
    },
    /// Merge an overlay settings file onto a base file
    Merge {
        /// Base settings file
        base: PathBuf,
        /// Settings layered on top of the base
        overlay: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(command: SettingsCommand) -> Result<(), CliError> {
    match command {
        SettingsCommand::Audit { file } => audit(file),
        SettingsCommand::AddHook {
            file,
            event,
            matcher,
            command,
            timeout,
        } => {
            if !KNOWN_EVENTS.contains(&event.as_str()) {
                return Err(CliError::UnknownEvent(event));
            }
            let mut doc = jsonfile::read_or_empty_object(&file)?;
            if settings::add_hook(&mut doc, &event, matcher.as_deref(), &command, timeout) {
                jsonfile::write_atomic(&file, &doc)?;
                println!("added {event} hook: {command}");
            } else {
                println!("{event} hook already present: {command}");
            }
            Ok(())
        }
        SettingsCommand::RemoveHook { file, command } => {
            let mut doc = jsonfile::read(&file)?;
            let removed = settings::remove_hook(&mut doc, &command);
            if removed > 0 {
                jsonfile::write_atomic(&file, &doc)?;
            }
            println!("removed {removed} hook(s)");
            Ok(())
        }
        SettingsCommand::Merge {
            base,
            overlay,
            output,
        } => {
            let merged = settings::merge(
                &jsonfile::read_or_empty_object(&base)?,
                &jsonfile::read(&overlay)?,
            );
            match output {
                Some(path) => {
                    jsonfile::write_atomic(&path, &merged)?;
                    println!("wrote {}", path.display());
                }
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&merged).unwrap_or_default()
                ),
            }
            Ok(())
        }
    }
}

fn audit(file: PathBuf) -> Result<(), CliError> {
    let doc = jsonfile::read(&file)?;
    let findings = settings::audit(&doc);
    for finding in &findings {
        println!("{finding}");
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == AuditSeverity::Error)
        .count();
    let warnings = findings.len() - errors;
    if findings.is_empty() {
        println!("{}: ok", file.display());
    } else {
        println!("{}: {errors} error(s), {warnings} warning(s)", file.display());
    }

    if errors > 0 {
        return Err(CliError::AuditFailed {
            count: errors,
            path: file,
        });
    }
    Ok(())
}
