//! Command dispatch logic extracted from binary to reduce main function size.

use super::{
    args::Commands,
    handlers::{handle_baseline, handle_check, handle_generate, handle_init},
};
use crate::exit::BrainExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands) -> Result<BrainExit> {
    match command {
        Commands::Init { root } => handle_init(&root),
        Commands::Generate { root } => handle_generate(&root),
        Commands::Check { root, json } => handle_check(&root, json),
        Commands::Baseline { root } => handle_baseline(&root),
    }
}
