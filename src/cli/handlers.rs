// src/cli/handlers.rs
use crate::config::io::write_default_files;
use crate::exit::BrainExit;
use crate::pipeline::{self, ScanContext};
use crate::reporting;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

fn open(root: &Path) -> Result<ScanContext> {
    ScanContext::open(root).with_context(|| format!("Cannot scan {}", root.display()))
}

/// Handles the init command.
///
/// # Errors
/// Returns error if a default file cannot be written.
pub fn handle_init(root: &Path) -> Result<BrainExit> {
    let created = write_default_files(root)?;
    if created.is_empty() {
        println!("{}", "Config files already present, nothing written.".dimmed());
    }
    for path in created {
        println!("{} {}", "Created".green(), path.display());
    }
    Ok(BrainExit::Clean)
}

/// Handles the generate command.
///
/// # Errors
/// Returns error if the root is unreadable or the brain cannot be written.
pub fn handle_generate(root: &Path) -> Result<BrainExit> {
    let ctx = open(root)?;
    let brain = pipeline::generate(&ctx)?;
    reporting::print_generated(&brain, &ctx.brain_dir());
    Ok(BrainExit::Clean)
}

/// Handles the baseline command.
///
/// # Errors
/// Returns error if the root is unreadable or an artifact cannot be written.
pub fn handle_baseline(root: &Path) -> Result<BrainExit> {
    let ctx = open(root)?;
    let brain = pipeline::baseline(&ctx)?;
    reporting::print_generated(&brain, &ctx.brain_dir());
    println!("{}", "Baseline saved.".dimmed());
    Ok(BrainExit::Clean)
}

/// Handles the check command. The exit code carries the verdict.
///
/// # Errors
/// Returns error if the root is unreadable or a stored artifact is corrupt.
pub fn handle_check(root: &Path, json: bool) -> Result<BrainExit> {
    let ctx = open(root)?;
    let outcome = pipeline::check(&ctx)?;

    if json {
        reporting::print_json(&outcome)?;
    } else {
        reporting::print_check(&outcome);
    }
    Ok(BrainExit::from_report(&outcome.report))
}
