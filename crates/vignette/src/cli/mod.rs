//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the vignette binary.

mod commands;
mod generate;
mod history;
mod logging;
mod parse;

pub use commands::{Cli, Commands};
pub use generate::{GenerateOptions, generate_scenes};
pub use history::handle_history_command;
pub use logging::init_tracing;
pub use parse::parse_reply;
