//! Command-line interface components
//!
//! CLI-specific code: argument parsing and the command handlers that wire
//! arguments, configuration, sources and the resolver together.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, FetchArgs, GlobalArgs, SourceKind};
pub use commands::{handle_fetch, handle_list};
