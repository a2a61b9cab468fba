// src/config/mod.rs
pub mod io;
pub mod types;

pub use self::types::{Config, EvidenceConfig, RulesConfig};
use crate::error::{BrainError, Result};
use std::path::{Path, PathBuf};

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `.repobrain.toml` from `root` and validates it.
    ///
    /// # Errors
    /// Returns error if the file is unreadable, malformed, or invalid.
    pub fn load(root: &Path) -> Result<Self> {
        let config = io::load_toml_config(root)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates configuration.
    ///
    /// # Errors
    /// Returns a `Config` error describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.brain_dir.trim().is_empty() {
            return Err(BrainError::Config("brain_dir must not be empty".into()));
        }
        if self.max_file_kb == 0 {
            return Err(BrainError::Config("max_file_kb must be positive".into()));
        }
        if self.max_files == 0 {
            return Err(BrainError::Config("max_files must be positive".into()));
        }
        Ok(())
    }

    /// Output directory resolved against the scanned root.
    #[must_use]
    pub fn brain_path(&self, root: &Path) -> PathBuf {
        root.join(&self.brain_dir)
    }

    #[must_use]
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_kb.saturating_mul(1024)
    }
}
