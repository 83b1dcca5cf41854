//! Diagnostic logging setup.
//!
//! stderr carries hook messages to Claude Code, so logging is off unless
//! `HOOKKIT_LOG` sets a filter (`debug`, `claude_hookkit=trace`, ...).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "HOOKKIT_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("off"))
}

/// Install the global subscriber, writing to `log_file` when given and to
/// stderr otherwise. An unopenable log file falls back to stderr and the
/// error is returned so the caller can report it.
pub fn init(log_file: Option<&Path>) -> Result<(), std::io::Error> {
    let file = log_file
        .map(|path| OpenOptions::new().create(true).append(true).open(path))
        .transpose();

    match file {
        Ok(Some(file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init();
            Ok(())
        }
        Ok(None) => {
            init_stderr();
            Ok(())
        }
        Err(e) => {
            init_stderr();
            Err(e)
        }
    }
}

fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
