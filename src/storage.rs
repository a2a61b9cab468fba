// src/storage.rs
//! Brain persistence: stable JSON, atomic writes, baseline comparison.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::brain::Brain;
use crate::evidence::EvidenceIndex;
use crate::graph::ImportGraph;
use crate::rules::{Policy, Rule, Rules};

pub const BRAIN_FILE: &str = "brain.json";
pub const BASELINE_FILE: &str = "baseline.json";

/// Serializes with sorted object keys and two-space indentation.
///
/// # Errors
/// Returns error if the value cannot be represented as JSON.
pub fn to_stable_json<T: Serialize>(value: &T) -> Result<String> {
    let value = sort_keys(serde_json::to_value(value).context("Failed to serialize")?);
    let mut text = serde_json::to_string_pretty(&value)?;
    text.push('\n');
    Ok(text)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Writes `content` to `path` via a sibling temp file and rename, so readers
/// never observe a half-written artifact.
///
/// # Errors
/// Returns error if the directory, temp file, or rename fails.
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let temp_path = path.with_extension("tmp");

    fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp to {}", path.display()))?;

    Ok(())
}

/// Saves `brain.json` into `brain_dir`.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn save_brain(brain_dir: &Path, brain: &Brain) -> Result<PathBuf> {
    save_as(brain_dir, BRAIN_FILE, brain)
}

/// Saves `baseline.json` into `brain_dir`.
///
/// # Errors
/// Returns error if serialization or the write fails.
pub fn save_baseline(brain_dir: &Path, brain: &Brain) -> Result<PathBuf> {
    save_as(brain_dir, BASELINE_FILE, brain)
}

fn save_as(brain_dir: &Path, name: &str, brain: &Brain) -> Result<PathBuf> {
    let path = brain_dir.join(name);
    atomic_write(&path, &to_stable_json(brain)?)?;
    Ok(path)
}

/// Loads `baseline.json`, `None` when absent.
///
/// # Errors
/// Returns error if the file exists but is unreadable or invalid.
pub fn load_baseline(brain_dir: &Path) -> Result<Option<Brain>> {
    let path = brain_dir.join(BASELINE_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let brain = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(Some(brain))
}

/// Rules loaded from a stored brain, with the entries that failed to parse.
#[derive(Debug, Clone, Default)]
pub struct StoredRules {
    pub rules: Rules,
    pub rejected: Vec<String>,
}

/// Loads the rule set from `brain.json`, `None` when absent.
///
/// Each rule is parsed on its own; one that does not fit the rule shape is
/// rejected by ID (or position) and the rest still load.
///
/// # Errors
/// Returns error if the file exists but is unreadable or not JSON.
pub fn load_rules(brain_dir: &Path) -> Result<Option<StoredRules>> {
    let path = brain_dir.join(BRAIN_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;
    Ok(Some(parse_rules(doc.get("rules"))))
}

fn parse_rules(section: Option<&Value>) -> StoredRules {
    let policy = section
        .and_then(|s| s.get("policy"))
        .and_then(|p| serde_json::from_value::<Policy>(p.clone()).ok())
        .unwrap_or_default();

    let mut stored = StoredRules {
        rules: Rules {
            policy,
            items: Vec::new(),
        },
        rejected: Vec::new(),
    };

    let items = section
        .and_then(|s| s.get("items"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (idx, raw) in items.iter().enumerate() {
        match serde_json::from_value::<Rule>(raw.clone()) {
            Ok(rule) => stored.rules.items.push(rule),
            Err(e) => {
                let label = raw
                    .get("rule_id")
                    .and_then(Value::as_str)
                    .map_or_else(|| format!("#{idx}"), String::from);
                log::warn!("Skipping stored rule {label}: {e}");
                stored.rejected.push(label);
            }
        }
    }
    stored
}

/// Differences between a baseline and the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Drift {
    pub added_rules: Vec<String>,
    pub removed_rules: Vec<String>,
    pub added_evidence: Vec<String>,
    pub removed_evidence: Vec<String>,
    pub added_files: Vec<String>,
    pub removed_files: Vec<String>,
}

impl Drift {
    #[must_use]
    pub fn between(
        baseline: &Brain,
        rules: &Rules,
        evidence: &EvidenceIndex,
        graph: &ImportGraph,
    ) -> Self {
        let (added_rules, removed_rules) = diff(
            baseline.rules.items.iter().map(|r| r.id.as_str()),
            rules.items.iter().map(|r| r.id.as_str()),
        );
        let (added_evidence, removed_evidence) = diff(
            baseline.evidence.keys().map(String::as_str),
            evidence.keys().map(String::as_str),
        );
        let (added_files, removed_files) = diff(
            baseline.graphs.nodes().map(|(_, n)| n.path.as_str()),
            graph.nodes().map(|(_, n)| n.path.as_str()),
        );
        Self {
            added_rules,
            removed_rules,
            added_evidence,
            removed_evidence,
            added_files,
            removed_files,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added_rules.is_empty()
            && self.removed_rules.is_empty()
            && self.added_evidence.is_empty()
            && self.removed_evidence.is_empty()
            && self.added_files.is_empty()
            && self.removed_files.is_empty()
    }
}

fn diff<'a>(
    before: impl Iterator<Item = &'a str>,
    after: impl Iterator<Item = &'a str>,
) -> (Vec<String>, Vec<String>) {
    let before: BTreeSet<&str> = before.collect();
    let after: BTreeSet<&str> = after.collect();
    let added = after.difference(&before).map(|s| (*s).to_string()).collect();
    let removed = before.difference(&after).map(|s| (*s).to_string()).collect();
    (added, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stable_json_sorts_nested_keys() {
        let v = json!({"b": 1, "a": {"z": [{"y": 1, "x": 2}], "c": null}});
        let text = to_stable_json(&v).unwrap();
        let a = text.find("\"a\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        let c = text.find("\"c\"").unwrap();
        let z = text.find("\"z\"").unwrap();
        let x = text.find("\"x\"").unwrap();
        let y = text.find("\"y\"").unwrap();
        assert!(a < c && c < z && z < b);
        assert!(x < y);
        assert!(text.ends_with("}\n"));
        assert!(text.contains("\n  \"a\""));
    }

    #[test]
    fn test_atomic_write_creates_dirs_and_leaves_no_temp() {
        let d = tempfile::tempdir().unwrap();
        let path = d.path().join("AI_BRAIN/brain.json");
        atomic_write(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_parse_rules_rejects_bad_entries_individually() {
        let section = json!({
            "policy": {"fail_on_warnings": true},
            "items": [
                {"rule_id": "rule:ok", "type": "no_import", "severity": "SOFT", "params": {"forbidden": ["x"]}},
                {"rule_id": "rule:bad", "type": "no_import", "severity": "LOUD"},
                {"type": "no_import"}
            ]
        });
        let stored = parse_rules(Some(&section));
        assert!(stored.rules.policy.fail_on_warnings);
        assert_eq!(stored.rules.items.len(), 1);
        assert_eq!(stored.rejected, vec!["rule:bad", "#2"]);
    }

    #[test]
    fn test_missing_files_are_none() {
        let d = tempfile::tempdir().unwrap();
        assert!(load_rules(d.path()).unwrap().is_none());
        assert!(load_baseline(d.path()).unwrap().is_none());
    }

    #[test]
    fn test_diff_sets() {
        let (added, removed) = diff(["a", "b"].into_iter(), ["b", "c"].into_iter());
        assert_eq!(added, vec!["c"]);
        assert_eq!(removed, vec!["a"]);
    }
}
