//! Command-line interface components
//!
//! CLI-specific code: argument parsing and command handlers.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, GlobalArgs, RunArgs, StateAction, StateArgs};
pub use commands::{handle_run, handle_state};
