// src/brain.rs
//! The Brain: the complete generated model of a repository.

use serde::{Deserialize, Serialize};

use crate::conventions::Conventions;
use crate::evidence::EvidenceIndex;
use crate::graph::ImportGraph;
use crate::profile::Profile;
use crate::rules::Rules;
use crate::structure::ProjectStructure;
use crate::workflows::Workflows;

pub const SCHEMA_VERSION: &str = "1.0.0";
pub const BRAIN_VERSION: &str = "0.1.0";
pub const TOOL_NAME: &str = "repobrain";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedWith {
    pub tool: String,
    pub version: String,
}

impl Default for GeneratedWith {
    fn default() -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit: Option<String>,
    #[serde(default)]
    pub generated_with: GeneratedWith,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub files_scanned: usize,
    pub files_ignored: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub coverage: Coverage,
    pub conflicts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    pub schema_version: String,
    pub brain_version: String,
    pub repo: RepoInfo,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub structure: ProjectStructure,
    #[serde(default)]
    pub graphs: ImportGraph,
    #[serde(default)]
    pub conventions: Conventions,
    #[serde(default)]
    pub rules: Rules,
    #[serde(default)]
    pub workflows: Workflows,
    #[serde(default)]
    pub evidence: EvidenceIndex,
    #[serde(default)]
    pub status: Status,
}
