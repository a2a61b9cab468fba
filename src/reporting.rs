// src/reporting.rs
//! Console output for check results and generated brains.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::brain::Brain;
use crate::pipeline::{CheckOutcome, RulesSource};
use crate::rules::{Severity, Violation};
use crate::storage::Drift;

/// Prints violations grouped by rule, then the summary and any drift.
pub fn print_check(outcome: &CheckOutcome) {
    let report = &outcome.report;
    let source = match outcome.rules_source {
        RulesSource::Stored => "stored brain",
        RulesSource::Synthesized => "synthesized rules",
    };
    println!("{} {source}", "Checking against".dimmed());

    let mut current_rule: Option<&str> = None;
    for v in &report.violations {
        if current_rule != Some(v.rule_id.as_str()) {
            println!("\n{}", v.rule_id.bold());
            current_rule = Some(v.rule_id.as_str());
        }
        print_violation(v);
    }

    for id in &report.skipped_rules {
        println!("{} rule {id} skipped (malformed or unknown type)", "[WARN]".yellow());
    }

    let hard = report.count(Severity::Hard);
    let soft = report.count(Severity::Soft);
    let info = report.count(Severity::Unknown);
    println!();
    if report.violations.is_empty() {
        println!(
            "{} {} rules checked, no violations.",
            "[OK]".green().bold(),
            report.rules_checked
        );
    } else {
        let line = format!("{hard} hard, {soft} soft, {info} informational violation(s)");
        if hard > 0 {
            println!("{} {line}", "[FAIL]".red().bold());
        } else if soft > 0 {
            println!("{} {line}", "[WARN]".yellow().bold());
        } else {
            println!("{} {line}", "[INFO]".dimmed());
        }
    }

    if let Some(drift) = &outcome.drift {
        print_drift(drift);
    }
}

fn print_violation(v: &Violation) {
    let tag = match v.severity {
        Severity::Hard => "HARD".red().bold(),
        Severity::Soft => "SOFT".yellow(),
        Severity::Unknown => "INFO".dimmed(),
    };
    println!("  {tag} {}", v.message);
    println!("    {} {}", "-->".blue(), v.from_path);
}

fn print_drift(drift: &Drift) {
    if drift.is_empty() {
        println!("{}", "No drift from baseline.".dimmed());
        return;
    }
    println!("\n{}", "Drift from baseline:".cyan().bold());
    let sections = [
        ("rules", &drift.added_rules, &drift.removed_rules),
        ("evidence", &drift.added_evidence, &drift.removed_evidence),
        ("graph files", &drift.added_files, &drift.removed_files),
    ];
    for (label, added, removed) in sections {
        if added.is_empty() && removed.is_empty() {
            continue;
        }
        println!("  {label}: +{} -{}", added.len(), removed.len());
        for item in added {
            println!("    {} {item}", "+".green());
        }
        for item in removed {
            println!("    {} {item}", "-".red());
        }
    }
}

/// One-paragraph summary after `generate` or `baseline`.
pub fn print_generated(brain: &Brain, brain_dir: &Path) {
    println!(
        "{} Brain generated at {}",
        "[OK]".green().bold(),
        brain_dir.display()
    );
    println!(
        "  {} files scanned, {} ignored, {} projects, {} rules, {} evidence records",
        brain.status.coverage.files_scanned,
        brain.status.coverage.files_ignored,
        brain.structure.projects.len(),
        brain.rules.items.len(),
        brain.evidence.len()
    );
    if !brain.status.conflicts.is_empty() {
        println!(
            "  {} conflicting conventions: {}",
            "[WARN]".yellow(),
            brain.status.conflicts.join(", ")
        );
    }
}

/// Prints data as pretty JSON on stdout.
///
/// # Errors
/// Returns error if serialization fails.
pub fn print_json<T: serde::Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}
