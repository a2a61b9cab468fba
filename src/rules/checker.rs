// src/rules/checker.rs
//! Evaluates rules against the import graph.
//!
//! Rules are borrowed read-only. A rule that cannot be evaluated (unknown
//! type, missing or ill-typed parameter) is skipped and reported; the other
//! rules still run.

use serde::Serialize;

use super::{Rule, RuleType, Rules, Severity};
use crate::graph::{FileImportNode, ImportGraph, LanguageFamily, ModuleRef};
use crate::structure::{locate_in, owns, ProjectStructure};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub rule_id: String,
    pub from_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_project: Option<String>,
    pub to: ModuleRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_project: Option<String>,
    pub specifier: String,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub violations: Vec<Violation>,
    /// Rules evaluated against the graph.
    pub rules_checked: usize,
    /// Rules with a shape that is not checked against imports.
    pub not_applicable: Vec<String>,
    /// Malformed or unknown rules.
    pub skipped_rules: Vec<String>,
}

impl CheckReport {
    #[must_use]
    pub fn has_hard_violations(&self) -> bool {
        self.count(Severity::Hard) > 0
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.count(Severity::Soft) > 0
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.violations.iter().filter(|v| v.severity == severity).count()
    }
}

/// Checks every rule in order. Violations keep rule order, then graph order.
#[must_use]
pub fn check(rules: &Rules, graph: &ImportGraph, structure: &ProjectStructure) -> CheckReport {
    let mut report = CheckReport::default();

    for rule in &rules.items {
        let outcome = match rule.kind {
            RuleType::NoCrossProjectImport => check_cross_project(rule, graph, structure),
            RuleType::NoImport => check_no_import(rule, graph),
            RuleType::Unknown => Err("unknown rule type".to_string()),
            other => {
                log::debug!("Rule {} ({}) is not checked against imports", rule.id, other.as_str());
                report.not_applicable.push(rule.id.clone());
                continue;
            }
        };

        match outcome {
            Ok(mut found) => {
                report.rules_checked += 1;
                report.violations.append(&mut found);
            }
            Err(reason) => {
                log::warn!("Skipping rule {}: {reason}", rule.id);
                report.skipped_rules.push(rule.id.clone());
            }
        }
    }

    report
}

/// Internal targets of a node with its path form.
fn internal_edges<'a>(
    family: LanguageFamily,
    node: &'a FileImportNode,
) -> impl Iterator<Item = (&'a ModuleRef, String)> + 'a {
    node.imports
        .iter()
        .filter_map(move |target| Some((target, target.internal_path(family)?)))
}

/// First specifier text for `target` that satisfies `pred`. Every occurrence
/// is considered, so the result does not depend on import order.
fn first_text<'a>(
    node: &'a FileImportNode,
    target: &'a ModuleRef,
    mut pred: impl FnMut(&str) -> bool,
) -> Option<&'a str> {
    node.specifiers_for(target)
        .map(|s| s.text.as_str())
        .find(|text| pred(text))
}

fn check_cross_project(
    rule: &Rule,
    graph: &ImportGraph,
    structure: &ProjectStructure,
) -> Result<Vec<Violation>, String> {
    let scoped = rule
        .string_list("projects")
        .ok_or("missing string list `projects`")?;
    let exceptions = match rule.params.get("exceptions") {
        None => Vec::new(),
        Some(_) => rule
            .string_list("exceptions")
            .ok_or("`exceptions` must be a list of strings")?,
    };

    let declared: Vec<&str> = structure
        .projects
        .iter()
        .map(|p| p.path.as_str())
        .chain(scoped.iter().map(String::as_str))
        .collect();
    let is_scoped = |project: &str| scoped.iter().any(|s| s == project);

    let mut violations = Vec::new();
    for (family, node) in graph.nodes() {
        let Some(from) = locate_in(declared.iter().copied(), &node.path) else {
            continue;
        };
        if !is_scoped(from) {
            continue;
        }

        for (target, target_path) in internal_edges(family, node) {
            let Some(to) = locate_in(declared.iter().copied(), &target_path) else {
                continue;
            };
            if to == from || !is_scoped(to) {
                continue;
            }
            let exempt = |text: &str| exceptions.iter().any(|e| text.contains(e.as_str()));
            let Some(text) = first_text(node, target, |text| !exempt(text)) else {
                continue;
            };
            violations.push(Violation {
                rule_id: rule.id.clone(),
                from_path: node.path.clone(),
                from_project: Some(from.to_string()),
                to: target.clone(),
                to_project: Some(to.to_string()),
                specifier: text.to_string(),
                severity: rule.severity,
                message: format!("`{from}` must not import from `{to}` (via \"{text}\")"),
            });
        }
    }
    Ok(violations)
}

fn check_no_import(rule: &Rule, graph: &ImportGraph) -> Result<Vec<Violation>, String> {
    let forbidden = rule
        .string_list("forbidden")
        .filter(|f| !f.is_empty())
        .ok_or("missing non-empty string list `forbidden`")?;
    let scope = match rule.params.get("from") {
        None => ".",
        Some(_) => rule.string_param("from").ok_or("`from` must be a string")?,
    };

    let mut violations = Vec::new();
    for (_, node) in graph.nodes() {
        if !owns(scope, &node.path) {
            continue;
        }
        for target in &node.imports {
            let hits = |text: &str| forbidden.iter().find(|f| text.contains(f.as_str()));
            let Some(text) = first_text(node, target, |text| hits(text).is_some()) else {
                continue;
            };
            let Some(hit) = hits(text) else { continue };
            violations.push(Violation {
                rule_id: rule.id.clone(),
                from_path: node.path.clone(),
                from_project: None,
                to: target.clone(),
                to_project: None,
                specifier: text.to_string(),
                severity: rule.severity,
                message: format!("`{}` imports forbidden `{hit}`", node.path),
            });
        }
    }
    Ok(violations)
}
