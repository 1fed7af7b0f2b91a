//! CLI module - argument parsing, interactive prompts, and subcommands

mod args;
pub mod clean;
pub mod describe;
pub mod fit;
mod prompts;

pub use args::{derive_output_path, CleaningArgs, Cli, Commands};
pub use prompts::*;
