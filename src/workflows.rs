// src/workflows.rs
//! Workflow commands declared in `package.json` scripts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conventions::Confidence;
use crate::evidence::{EvidenceId, EvidenceIndexer, EvidenceKind, Observation};
use crate::snapshot::{parent_dir, RepoSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCommand {
    pub name: String,
    pub command: String,
    pub cwd: String,
    pub source: String,
    pub confidence: Confidence,
    #[serde(default)]
    pub evidence: Vec<EvidenceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflows {
    pub commands: Vec<WorkflowCommand>,
}

impl Workflows {
    /// Root-level command with the given script name.
    #[must_use]
    pub fn root_command(&self, name: &str) -> Option<&WorkflowCommand> {
        self.commands.iter().find(|c| c.cwd == "." && c.name == name)
    }
}

/// Extracts script entries from every `package.json`. Unreadable or
/// malformed manifests are skipped.
pub fn extract(snapshot: &RepoSnapshot, evidence: &mut EvidenceIndexer) -> Workflows {
    let mut commands = Vec::new();

    for file in snapshot.files_named("package.json") {
        let content = match snapshot.read_text(&file.path) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Skipping unreadable {}: {e}", file.path);
                continue;
            }
        };
        let manifest: Value = match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("Skipping malformed {}: {e}", file.path);
                continue;
            }
        };
        let Some(scripts) = manifest.get("scripts").and_then(Value::as_object) else {
            continue;
        };

        let id = evidence.submit(Observation::new(file.path.clone(), EvidenceKind::Config));
        for (name, cmd) in scripts {
            let Some(cmd) = cmd.as_str() else { continue };
            commands.push(WorkflowCommand {
                name: name.clone(),
                command: cmd.to_string(),
                cwd: parent_dir(&file.path).to_string(),
                source: "package.json".to_string(),
                confidence: Confidence::High,
                evidence: vec![id.clone()],
            });
        }
    }

    Workflows { commands }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_extracted_with_cwd_and_evidence() {
        let snap = RepoSnapshot::in_memory([
            ("package.json", r#"{"scripts":{"test":"vitest","build":"tsc -b"}}"#),
            ("apps/web/package.json", r#"{"scripts":{"dev":"next dev"}}"#),
            ("apps/api/package.json", "{ not json"),
        ]);
        let mut ix = EvidenceIndexer::new(false);
        let wf = extract(&snap, &mut ix);

        let names: Vec<_> = wf.commands.iter().map(|c| (c.cwd.as_str(), c.name.as_str())).collect();
        assert_eq!(names, vec![("apps/web", "dev"), (".", "build"), (".", "test")]);
        assert_eq!(wf.root_command("test").unwrap().command, "vitest");
        assert!(wf.root_command("dev").is_none());
        assert_eq!(ix.len(), 2);
        assert_eq!(ix.get(&wf.commands[1].evidence[0]).unwrap().path, "package.json");
    }
}
