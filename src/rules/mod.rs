// src/rules/mod.rs
//! Architectural rules: the rule record, severity policy, synthesis and
//! checking.

pub mod checker;
pub mod synth;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conventions::Confidence;
use crate::evidence::EvidenceId;
use crate::utils::short_id;

pub use checker::{check, CheckReport, Violation};
pub use synth::{synthesize, SynthesisInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    NoCrossProjectImport,
    NoImport,
    AllowedImports,
    LayerOrder,
    MustUseCommand,
    NamingConvention,
    /// Any type this build does not know. Never checked.
    #[serde(other)]
    Unknown,
}

impl RuleType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoCrossProjectImport => "no_cross_project_import",
            Self::NoImport => "no_import",
            Self::AllowedImports => "allowed_imports",
            Self::LayerOrder => "layer_order",
            Self::MustUseCommand => "must_use_command",
            Self::NamingConvention => "naming_convention",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Hard,
    Soft,
    Unknown,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "HARD",
            Self::Soft => "SOFT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "rule_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RuleType,
    pub severity: Severity,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default)]
    pub evidence: Vec<EvidenceId>,
}

impl Rule {
    /// Deterministic ID over the rule type and its (order-insensitive) scope.
    #[must_use]
    pub fn make_id(kind: RuleType, scope: &[String]) -> String {
        let mut scope = scope.to_vec();
        scope.sort();
        scope.dedup();
        short_id("rule", &format!("{}:{}", kind.as_str(), scope.join(",")))
    }

    /// String-array parameter, `None` if missing or not all strings.
    #[must_use]
    pub fn string_list(&self, key: &str) -> Option<Vec<String>> {
        self.params
            .get(key)?
            .as_array()?
            .iter()
            .map(|v| v.as_str().map(String::from))
            .collect()
    }

    #[must_use]
    pub fn string_param(&self, key: &str) -> Option<&str> {
        self.params.get(key)?.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub fail_on_warnings: bool,
    #[serde(default = "default_confidence_map")]
    pub confidence_to_severity: BTreeMap<Confidence, Severity>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            fail_on_warnings: false,
            confidence_to_severity: default_confidence_map(),
        }
    }
}

impl Policy {
    #[must_use]
    pub fn severity_for(&self, confidence: Confidence) -> Severity {
        self.confidence_to_severity
            .get(&confidence)
            .copied()
            .unwrap_or(Severity::Unknown)
    }
}

fn default_confidence_map() -> BTreeMap<Confidence, Severity> {
    BTreeMap::from([
        (Confidence::High, Severity::Hard),
        (Confidence::Med, Severity::Soft),
        (Confidence::Low, Severity::Unknown),
        (Confidence::Conflict, Severity::Unknown),
    ])
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub policy: Policy,
    pub items: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_ignores_scope_order() {
        let a = Rule::make_id(RuleType::NoCrossProjectImport, &["apps/web".into(), "apps/api".into()]);
        let b = Rule::make_id(RuleType::NoCrossProjectImport, &["apps/api".into(), "apps/web".into()]);
        assert_eq!(a, b);
        assert!(a.starts_with("rule:"));
        assert_ne!(a, Rule::make_id(RuleType::NoImport, &["apps/api".into(), "apps/web".into()]));
    }

    #[test]
    fn test_default_policy_mapping() {
        let p = Policy::default();
        assert_eq!(p.severity_for(Confidence::High), Severity::Hard);
        assert_eq!(p.severity_for(Confidence::Med), Severity::Soft);
        assert_eq!(p.severity_for(Confidence::Low), Severity::Unknown);
        assert_eq!(p.severity_for(Confidence::Conflict), Severity::Unknown);
        assert!(!p.fail_on_warnings);
    }

    #[test]
    fn test_policy_serializes_labels_as_keys() {
        let json = serde_json::to_value(Policy::default()).unwrap();
        assert_eq!(json["confidence_to_severity"]["MED"], "SOFT");
        let back: Policy = serde_json::from_value(json).unwrap();
        assert_eq!(back, Policy::default());
    }

    #[test]
    fn test_unknown_rule_type_deserializes() {
        let rule: Rule = serde_json::from_str(
            r#"{"rule_id":"rule:x","type":"max_depth","severity":"SOFT","params":{},"evidence":[]}"#,
        )
        .unwrap();
        assert_eq!(rule.kind, RuleType::Unknown);
        assert!(rule.rationale.is_none());
    }

    #[test]
    fn test_string_list_rejects_mixed_arrays() {
        let rule: Rule = serde_json::from_str(
            r#"{"rule_id":"r","type":"no_import","severity":"HARD","params":{"forbidden":["a",1],"from":"src"}}"#,
        )
        .unwrap();
        assert!(rule.string_list("forbidden").is_none());
        assert!(rule.string_list("missing").is_none());
        assert_eq!(rule.string_param("from"), Some("src"));
    }
}
