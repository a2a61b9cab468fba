// src/rules/synth.rs
//! Rule synthesis from inferred topology, conventions and workflows.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::{Policy, Rule, RuleType, Rules, Severity};
use crate::conventions::Conventions;
use crate::evidence::{EvidenceIndexer, EvidenceKind, Observation};
use crate::structure::{ProjectKind, ProjectStructure};
use crate::workflows::Workflows;

const BOUNDARY_RATIONALE: &str =
    "Independently deployable applications must not create source-level coupling.";

/// Scripts that become `must_use_command` rules when declared at the root.
const MANDATED_SCRIPTS: &[&str] = &["build", "lint", "test"];

/// Everything the synthesizer reads. Nothing here is mutated.
pub struct SynthesisInput<'a> {
    pub structure: &'a ProjectStructure,
    pub conventions: &'a Conventions,
    pub workflows: &'a Workflows,
    pub policy: Policy,
}

/// Builds the rule set. Each rule family is derived independently.
pub fn synthesize(input: &SynthesisInput<'_>, evidence: &mut EvidenceIndexer) -> Rules {
    let mut items = Vec::new();
    items.extend(boundary_rule(input.structure, evidence));
    items.extend(naming_rules(input.conventions, &input.policy));
    items.extend(command_rules(input.workflows));

    log::info!("Synthesized {} rules", items.len());
    Rules {
        policy: input.policy.clone(),
        items,
    }
}

/// One `no_cross_project_import` rule over all apps, when there are at
/// least two of them.
pub fn boundary_rule(structure: &ProjectStructure, evidence: &mut EvidenceIndexer) -> Option<Rule> {
    let projects = structure.app_paths();
    if projects.len() < 2 {
        return None;
    }

    let mut markers: Vec<&str> = structure
        .projects
        .iter()
        .filter(|p| p.kind == ProjectKind::App)
        .map(|p| p.marker.as_str())
        .collect();
    markers.sort_unstable();
    let cited = markers
        .into_iter()
        .map(|m| evidence.submit(Observation::new(m, EvidenceKind::Config)))
        .collect();

    Some(Rule {
        id: Rule::make_id(RuleType::NoCrossProjectImport, &projects),
        kind: RuleType::NoCrossProjectImport,
        severity: Severity::Hard,
        params: params([
            ("projects", json!(projects)),
            ("exceptions", json!(Vec::<String>::new())),
        ]),
        rationale: Some(BOUNDARY_RATIONALE.to_string()),
        evidence: cited,
    })
}

fn naming_rules(conventions: &Conventions, policy: &Policy) -> Vec<Rule> {
    conventions
        .items
        .iter()
        .filter_map(|conv| {
            let severity = policy.severity_for(conv.confidence);
            if severity == Severity::Unknown {
                return None;
            }
            Some(Rule {
                id: Rule::make_id(RuleType::NamingConvention, &[conv.conv_id.clone()]),
                kind: RuleType::NamingConvention,
                severity,
                params: params([
                    ("convention", json!(conv.conv_id)),
                    ("description", json!(conv.description)),
                ]),
                rationale: Some(conv.description.clone()),
                evidence: conv.examples.clone(),
            })
        })
        .collect()
}

fn command_rules(workflows: &Workflows) -> Vec<Rule> {
    MANDATED_SCRIPTS
        .iter()
        .filter_map(|name| workflows.root_command(name))
        .map(|cmd| Rule {
            id: Rule::make_id(RuleType::MustUseCommand, &[cmd.name.clone()]),
            kind: RuleType::MustUseCommand,
            severity: Severity::Unknown,
            params: params([("name", json!(cmd.name)), ("command", json!(cmd.command))]),
            rationale: Some(format!("Run `{}` through the declared `{}` script.", cmd.command, cmd.name)),
            evidence: cmd.evidence.clone(),
        })
        .collect()
}

fn params<const N: usize>(pairs: [(&str, Value); N]) -> BTreeMap<String, Value> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::{Confidence, Convention};
    use crate::structure::ProjectDescriptor;
    use crate::workflows::WorkflowCommand;

    fn project(path: &str, kind: ProjectKind) -> ProjectDescriptor {
        ProjectDescriptor {
            path: path.into(),
            kind,
            name: path.rsplit('/').next().unwrap_or(path).into(),
            marker: format!("{path}/package.json"),
        }
    }

    fn structure(projects: Vec<ProjectDescriptor>) -> ProjectStructure {
        ProjectStructure {
            projects,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_app_no_boundary_rule() {
        let s = structure(vec![project("apps/web", ProjectKind::App), project("packages/ui", ProjectKind::Library)]);
        assert!(boundary_rule(&s, &mut EvidenceIndexer::new(false)).is_none());
    }

    #[test]
    fn test_boundary_rule_shape() {
        let s = structure(vec![
            project("apps/web", ProjectKind::App),
            project("apps/api", ProjectKind::App),
            project("packages/ui", ProjectKind::Library),
        ]);
        let mut ix = EvidenceIndexer::new(false);
        let rule = boundary_rule(&s, &mut ix).unwrap();

        assert_eq!(rule.kind, RuleType::NoCrossProjectImport);
        assert_eq!(rule.severity, Severity::Hard);
        assert_eq!(rule.string_list("projects").unwrap(), vec!["apps/api", "apps/web"]);
        assert_eq!(rule.string_list("exceptions").unwrap(), Vec::<String>::new());
        assert_eq!(rule.rationale.as_deref(), Some(BOUNDARY_RATIONALE));
        assert_eq!(rule.evidence.len(), 2);
        assert_eq!(ix.get(&rule.evidence[0]).unwrap().path, "apps/api/package.json");
    }

    #[test]
    fn test_boundary_rule_order_insensitive() {
        let a = structure(vec![project("apps/web", ProjectKind::App), project("apps/api", ProjectKind::App)]);
        let b = structure(vec![project("apps/api", ProjectKind::App), project("apps/web", ProjectKind::App)]);
        let ra = boundary_rule(&a, &mut EvidenceIndexer::new(false));
        let rb = boundary_rule(&b, &mut EvidenceIndexer::new(false));
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_extension_rules_follow_policy() {
        let s = structure(Vec::new());
        let conventions = Conventions {
            items: vec![
                Convention {
                    conv_id: "conv:a".into(),
                    description: "A".into(),
                    confidence: Confidence::Med,
                    score: 0.7,
                    examples: vec!["ev:1".into()],
                },
                Convention {
                    conv_id: "conv:b".into(),
                    description: "B".into(),
                    confidence: Confidence::Low,
                    score: 0.3,
                    examples: Vec::new(),
                },
            ],
        };
        let workflows = Workflows {
            commands: vec![WorkflowCommand {
                name: "test".into(),
                command: "vitest".into(),
                cwd: ".".into(),
                source: "package.json".into(),
                confidence: Confidence::High,
                evidence: vec!["ev:2".into()],
            }],
        };
        let input = SynthesisInput {
            structure: &s,
            conventions: &conventions,
            workflows: &workflows,
            policy: Policy::default(),
        };
        let rules = synthesize(&input, &mut EvidenceIndexer::new(false));

        let kinds: Vec<_> = rules.items.iter().map(|r| (r.kind, r.severity)).collect();
        assert_eq!(
            kinds,
            vec![
                (RuleType::NamingConvention, Severity::Soft),
                (RuleType::MustUseCommand, Severity::Unknown),
            ]
        );
        assert_eq!(rules.items[1].string_param("command"), Some("vitest"));
    }
}
