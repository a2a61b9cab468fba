use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "repobrain",
    version,
    about = "Repository model generator and import boundary checker"
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .repobrain.toml and .repobrainignore
    Init {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Scan the repository and write the brain
    Generate {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Check imports against the stored (or synthesized) rules
    Check {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Print the check report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate the brain and store it as the comparison baseline
    Baseline {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
}
