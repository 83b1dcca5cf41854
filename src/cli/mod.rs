//! Subcommand implementations behind the `claude-hookkit` binary.

pub mod alias;
pub mod chain;
pub mod hook;
pub mod settings;

use std::path::PathBuf;

use crate::aliases::AliasError;
use crate::chains::ChainError;
use crate::jsonfile::JsonFileError;

/// Errors surfaced by the file-editing subcommands, rendered through miette.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(hookkit::json_file),
        help("check that the file exists and contains valid JSON")
    )]
    JsonFile(#[from] JsonFileError),

    #[error(transparent)]
    #[diagnostic(code(hookkit::alias))]
    Alias(#[from] AliasError),

    #[error(transparent)]
    #[diagnostic(code(hookkit::chain))]
    Chain(#[from] ChainError),

    #[error("unknown hook event '{0}'")]
    #[diagnostic(
        code(hookkit::settings::event),
        help("expected one of: PreToolUse, PostToolUse, Notification, UserPromptSubmit, Stop, SubagentStop, PreCompact, SessionStart")
    )]
    UnknownEvent(String),

    #[error("{count} error(s) in {}", path.display())]
    #[diagnostic(code(hookkit::settings::audit))]
    AuditFailed { count: usize, path: PathBuf },

    #[error("{0} chain issue(s) found")]
    #[diagnostic(code(hookkit::chain::validate))]
    ChainIssues(usize),
}
