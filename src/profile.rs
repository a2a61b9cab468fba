// src/profile.rs
//! Language, framework and package-manager detection from file names.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::snapshot::{extension, file_name, RepoSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub languages: Vec<String>,
    pub frameworks: Vec<String>,
    pub package_managers: Vec<String>,
}

fn language_for(ext: &str) -> Option<&'static str> {
    match ext {
        "ts" | "tsx" => Some("TypeScript"),
        "js" | "jsx" | "mjs" | "cjs" => Some("JavaScript"),
        "py" => Some("Python"),
        "go" => Some("Go"),
        "rs" => Some("Rust"),
        _ => None,
    }
}

fn package_manager_for(name: &str) -> Option<&'static str> {
    match name {
        "package-lock.json" => Some("npm"),
        "pnpm-lock.yaml" => Some("pnpm"),
        "yarn.lock" => Some("yarn"),
        "poetry.lock" => Some("poetry"),
        "requirements.txt" => Some("pip"),
        _ => None,
    }
}

fn framework_for(name: &str) -> Option<&'static str> {
    match name {
        "next.config.js" | "next.config.mjs" => Some("Next.js"),
        "vite.config.ts" | "vite.config.js" => Some("Vite"),
        _ => None,
    }
}

/// Profiles the snapshot. Every list comes back sorted.
#[must_use]
pub fn detect(snapshot: &RepoSnapshot) -> Profile {
    let mut languages = BTreeSet::new();
    let mut frameworks = BTreeSet::new();
    let mut managers = BTreeSet::new();

    for file in snapshot.files() {
        let name = file_name(&file.path);
        if let Some(lang) = extension(&file.path).and_then(language_for) {
            languages.insert(lang);
        }
        if let Some(pm) = package_manager_for(name) {
            managers.insert(pm);
        }
        if let Some(fw) = framework_for(name) {
            frameworks.insert(fw);
        }
    }

    Profile {
        languages: owned(languages),
        frameworks: owned(frameworks),
        package_managers: owned(managers),
    }
}

fn owned(set: BTreeSet<&'static str>) -> Vec<String> {
    set.into_iter().map(String::from).collect()
}
