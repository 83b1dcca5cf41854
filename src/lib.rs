pub mod aliases;
pub mod chains;
pub mod check;
pub mod cli;
pub mod command;
pub mod config;
pub mod events;
pub mod jsonfile;
pub mod logging;
pub mod path;
pub mod protocol;
pub mod settings;

/// Run the hook subcommand and return its exit code.
///
/// This bridges the binary crate (`main.rs`) to the library. Library callers
/// should use [`check::evaluate`] and [`config::Config`] directly.
pub fn run_hook(config_path: Option<&std::path::Path>) -> i32 {
    cli::hook::run(config_path)
}
