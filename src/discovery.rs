// src/discovery.rs
//! Repository collection: walk, ignore, filter, sort, and size-limit.

use crate::config::{io as config_io, Config};
use crate::error::{BrainError, Result};
use crate::snapshot::{extension, file_name, FileEntry, RepoSnapshot};
use crate::utils::normalize_slashes;
use regex::Regex;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions the import extractor understands.
pub const SOURCE_EXTS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "py"];

/// Manifest, lock, and framework files consulted by profiling and structure
/// inference.
pub const MARKER_FILES: &[&str] = &[
    "package.json",
    "pyproject.toml",
    "requirements.txt",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "poetry.lock",
    "next.config.js",
    "next.config.mjs",
    "vite.config.ts",
    "vite.config.js",
];

/// Runs the collection pipeline and returns a sorted snapshot.
///
/// # Errors
/// Returns error if the root cannot be read or a pattern fails to compile.
pub fn collect(root: &Path, config: &Config) -> Result<RepoSnapshot> {
    fs::read_dir(root).map_err(|e| BrainError::io(e, root))?;

    let filters = PathFilters::compile(root, config)?;
    let mut candidates = walk_filesystem(root, &filters);
    candidates.sort_by(|a, b| a.path.cmp(&b.path));

    let (files, ignored) = apply_limits(candidates, config);
    log::info!("Collected {} files ({ignored} ignored) under {}", files.len(), root.display());
    Ok(RepoSnapshot::from_disk(root.to_path_buf(), files, ignored))
}

struct PathFilters {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl PathFilters {
    fn compile(root: &Path, config: &Config) -> Result<Self> {
        let include = config
            .include
            .iter()
            .map(|p| config_io::glob_to_regex(p))
            .collect::<Result<Vec<_>>>()?;
        let exclude = config_io::ignore_patterns(root, config)
            .iter()
            .map(|p| config_io::glob_to_regex(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { include, exclude })
    }

    fn is_excluded(&self, rel: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(rel))
    }

    fn is_included(&self, rel: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|re| re.is_match(rel))
    }
}

fn walk_filesystem(root: &Path, filters: &PathFilters) -> Vec<FileEntry> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !filters.is_excluded(&relative(root, e.path())));

    let mut entries = Vec::new();
    let mut errors = 0;
    for item in walker {
        match item {
            Ok(entry) if entry.file_type().is_file() => {
                let rel = relative(root, entry.path());
                if !is_collectable(&rel) || !filters.is_included(&rel) {
                    continue;
                }
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                entries.push(FileEntry { path: rel, size });
            }
            Ok(_) => {}
            Err(e) => {
                errors += 1;
                log::debug!("Walk error: {e}");
            }
        }
    }
    if errors > 0 {
        log::warn!("Encountered {errors} errors during file walk");
    }
    entries
}

fn relative(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    normalize_slashes(&rel.to_string_lossy())
}

fn is_collectable(rel: &str) -> bool {
    if MARKER_FILES.contains(&file_name(rel)) {
        return true;
    }
    extension(rel).is_some_and(|ext| SOURCE_EXTS.contains(&ext))
}

fn apply_limits(candidates: Vec<FileEntry>, config: &Config) -> (Vec<FileEntry>, usize) {
    let max_bytes = config.max_file_bytes();
    let mut files = Vec::new();
    let mut ignored = 0;

    for entry in candidates {
        if entry.size > max_bytes {
            log::debug!("Skipping {} ({} bytes over limit)", entry.path, entry.size);
            ignored += 1;
            continue;
        }
        if files.len() >= config.max_files {
            ignored += 1;
            continue;
        }
        files.push(entry);
    }
    (files, ignored)
}

/// Reads the checked-out commit hash from `.git`, if any.
#[must_use]
pub fn read_git_commit(root: &Path) -> Option<String> {
    let git_dir = root.join(".git");
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    let head = head.trim();

    let Some(reference) = head.strip_prefix("ref:") else {
        return Some(head.to_string());
    };
    let reference = reference.trim();

    if let Ok(hash) = fs::read_to_string(git_dir.join(reference)) {
        return Some(hash.trim().to_string());
    }
    let packed = fs::read_to_string(git_dir.join("packed-refs")).ok()?;
    packed
        .lines()
        .filter(|l| !l.starts_with('#') && !l.starts_with('^'))
        .find_map(|l| {
            let (hash, name) = l.split_once(' ')?;
            (name.trim() == reference).then(|| hash.to_string())
        })
}
