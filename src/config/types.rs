use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Keep the raw excerpt text next to its fingerprint.
    #[serde(default)]
    pub store_snippets: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub fail_on_warnings: bool,
}

/// Options record loaded from `.repobrain.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output directory for brain artifacts, relative to the scanned root.
    pub brain_dir: String,
    pub max_file_kb: u64,
    pub max_files: usize,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub evidence: EvidenceConfig,
    pub rules: RulesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brain_dir: default_brain_dir(),
            max_file_kb: default_max_file_kb(),
            max_files: default_max_files(),
            include: default_include(),
            exclude: Vec::new(),
            evidence: EvidenceConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

fn default_brain_dir() -> String { "AI_BRAIN".to_string() }
const fn default_max_file_kb() -> u64 { 512 }
const fn default_max_files() -> usize { 20_000 }
fn default_include() -> Vec<String> { vec!["**/*".to_string()] }
