// src/render.rs
//! Markdown views of the Brain.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;

use crate::brain::Brain;
use crate::storage::atomic_write;

/// Writes `README.md`, `ARCHITECTURE_MAP.md` and `CONVENTIONS.md`.
///
/// # Errors
/// Returns error if formatting or a write fails.
pub fn write_all(brain_dir: &Path, brain: &Brain) -> Result<()> {
    atomic_write(&brain_dir.join("README.md"), &readme(brain)?)?;
    atomic_write(&brain_dir.join("ARCHITECTURE_MAP.md"), &architecture_map(brain)?)?;
    atomic_write(&brain_dir.join("CONVENTIONS.md"), &conventions(brain)?)?;
    Ok(())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "_none_".to_string()
    } else {
        items.join(", ")
    }
}

/// Overview page.
///
/// # Errors
/// Returns error if formatting fails.
pub fn readme(brain: &Brain) -> Result<String> {
    let mut out = String::new();
    let name = Path::new(&brain.repo.root)
        .file_name()
        .map_or_else(|| brain.repo.root.clone(), |n| n.to_string_lossy().into_owned());

    writeln!(out, "# Repo Brain for {name}\n")?;
    if let Some(commit) = &brain.repo.git_commit {
        writeln!(out, "Commit: `{commit}`\n")?;
    }

    writeln!(out, "## Profile")?;
    writeln!(out, "- Languages: {}", list_or_none(&brain.profile.languages))?;
    writeln!(out, "- Frameworks: {}", list_or_none(&brain.profile.frameworks))?;
    writeln!(out, "- Package managers: {}\n", list_or_none(&brain.profile.package_managers))?;

    writeln!(out, "## Structure")?;
    if brain.structure.projects.is_empty() {
        writeln!(out, "_No projects detected._")?;
    }
    for p in &brain.structure.projects {
        writeln!(out, "- **{}** ({}): `{}`", p.name, p.kind.as_str(), p.path)?;
    }

    writeln!(out, "\n## Rules")?;
    if brain.rules.items.is_empty() {
        writeln!(out, "_No rules generated._")?;
    }
    for r in &brain.rules.items {
        writeln!(out, "- **{}**: {} ({})", r.severity.as_str(), r.kind.as_str(), r.id)?;
    }

    writeln!(out, "\n## Workflows")?;
    if brain.workflows.commands.is_empty() {
        writeln!(out, "_No workflow commands found._")?;
    }
    for c in &brain.workflows.commands {
        writeln!(out, "- `{}` in `{}`: `{}`", c.name, c.cwd, c.command)?;
    }

    let cov = brain.status.coverage;
    writeln!(
        out,
        "\n## Coverage\n- Files scanned: {}\n- Files ignored: {}",
        cov.files_scanned, cov.files_ignored
    )?;
    Ok(out)
}

/// Projects, boundaries and the cross-project edges of the import graph.
///
/// # Errors
/// Returns error if formatting fails.
pub fn architecture_map(brain: &Brain) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "# Architecture Map\n")?;

    writeln!(out, "## Boundaries")?;
    if brain.structure.boundaries.is_empty() {
        writeln!(out, "_No project boundaries detected._")?;
    }
    for b in &brain.structure.boundaries {
        writeln!(out, "- `{b}`")?;
    }

    writeln!(out, "\n## Import graph")?;
    writeln!(
        out,
        "- Script files with imports: {}\n- Python files with imports: {}",
        brain.graphs.imports_ts.len(),
        brain.graphs.imports_py.len()
    )?;

    let mut edges: Vec<(String, String)> = Vec::new();
    for (family, node) in brain.graphs.nodes() {
        let Some(from) = brain.structure.locate(&node.path) else {
            continue;
        };
        for target in &node.imports {
            let Some(path) = target.internal_path(family) else {
                continue;
            };
            let Some(to) = brain.structure.locate(&path) else {
                continue;
            };
            let edge = (from.path.clone(), to.path.clone());
            if from.path != to.path && !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }
    edges.sort();

    writeln!(out, "\n## Project dependencies")?;
    if edges.is_empty() {
        writeln!(out, "_No cross-project imports._")?;
    }
    for (from, to) in &edges {
        writeln!(out, "- `{from}` -> `{to}`")?;
    }
    Ok(out)
}

/// Mined conventions with their confidence.
///
/// # Errors
/// Returns error if formatting fails.
pub fn conventions(brain: &Brain) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "# Conventions\n")?;
    if brain.conventions.items.is_empty() {
        writeln!(out, "_No conventions mined._")?;
    }
    for c in &brain.conventions.items {
        writeln!(
            out,
            "- **{}** [{}, score {:.2}]: {}",
            c.conv_id,
            c.confidence.as_str(),
            c.score,
            c.description
        )?;
        for ex in &c.examples {
            if let Some(rec) = brain.evidence.get(ex) {
                writeln!(out, "  - `{}` ({ex})", rec.path)?;
            }
        }
    }
    Ok(out)
}
