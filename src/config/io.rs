// src/config/io.rs
//! Reading `.repobrain.toml`, ignore files, and glob compilation.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::types::Config;
use crate::error::{BrainError, Result};

pub const CONFIG_FILE: &str = ".repobrain.toml";
pub const IGNORE_FILE: &str = ".repobrainignore";

const DEFAULT_IGNORES: &[&str] = &["node_modules", ".git", "dist", ".next", "coverage", ".venv"];

const CONFIG_TEMPLATE: &str = r#"# repobrain configuration
brain_dir = "AI_BRAIN"
max_file_kb = 512
max_files = 20000
include = ["**/*"]
exclude = ["dist/**"]

[evidence]
store_snippets = false

[rules]
fail_on_warnings = false
"#;

const IGNORE_TEMPLATE: &str = "# Add patterns to ignore\n";

/// Loads `.repobrain.toml` from `root`, falling back to defaults when absent.
///
/// # Errors
/// Returns error if the file exists but cannot be read or parsed.
pub fn load_toml_config(root: &Path) -> Result<Config> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = fs::read_to_string(&path).map_err(|e| BrainError::io(e, &path))?;
    parse_toml(&content)
}

/// Parses config text. Missing keys take their defaults.
///
/// # Errors
/// Returns error on malformed TOML or wrongly typed keys.
pub fn parse_toml(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Collects every ignore pattern in effect: config excludes, `.gitignore`,
/// `.repobrainignore`, built-in defaults and the brain output directory.
#[must_use]
pub fn ignore_patterns(root: &Path, config: &Config) -> Vec<String> {
    let mut patterns = config.exclude.clone();
    for name in [".gitignore", IGNORE_FILE] {
        if let Ok(content) = fs::read_to_string(root.join(name)) {
            patterns.extend(parse_ignore_file(&content));
        }
    }

    let brain_dir = format!("{}/**", config.brain_dir.trim_end_matches('/'));
    for d in DEFAULT_IGNORES.iter().copied().chain([brain_dir.as_str()]) {
        if !patterns.iter().any(|p| p == d) {
            patterns.push(d.to_string());
        }
    }
    patterns
}

/// Extracts pattern lines from an ignore file, dropping blanks, comments and
/// negations (which are not supported).
#[must_use]
pub fn parse_ignore_file(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| {
            if line.starts_with('!') {
                log::debug!("Negated ignore pattern not supported: {line}");
                return false;
            }
            true
        })
        .map(ToString::to_string)
        .collect()
}

/// Compiles a gitignore-style glob into an anchored regex over
/// forward-slash relative paths.
///
/// Patterns containing a `/` are anchored at the root; bare patterns match
/// any path component. A match on a directory covers everything below it.
///
/// # Errors
/// Returns error if the produced regex is invalid.
pub fn glob_to_regex(pattern: &str) -> Result<Regex> {
    let trimmed = pattern.trim().trim_end_matches('/');
    let anchored = trimmed.contains('/');
    let trimmed = trimmed.strip_suffix("/**").unwrap_or(trimmed);
    let body = translate_glob(trimmed.trim_start_matches('/'));

    let source = if anchored {
        format!("^{body}(?:/.*)?$")
    } else {
        format!("^(?:.*/)?{body}(?:/.*)?$")
    };
    Ok(Regex::new(&source)?)
}

fn translate_glob(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}

/// Writes the default config and ignore file, never overwriting.
///
/// # Errors
/// Returns error if a file cannot be written.
pub fn write_default_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    for (name, content) in [(CONFIG_FILE, CONFIG_TEMPLATE), (IGNORE_FILE, IGNORE_TEMPLATE)] {
        let path = root.join(name);
        if path.exists() {
            continue;
        }
        fs::write(&path, content).map_err(|e| BrainError::io(e, &path))?;
        created.push(path);
    }
    Ok(created)
}
