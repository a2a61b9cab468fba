// src/snapshot.rs
//! The collected view of a repository: sorted file list plus a text reader.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A collected file, addressed by its forward-slash path relative to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
enum Source {
    Disk,
    Memory(BTreeMap<String, String>),
}

/// Ordered, deduplicated file list with a read capability.
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    root: PathBuf,
    files: Vec<FileEntry>,
    ignored: usize,
    source: Source,
}

impl RepoSnapshot {
    /// Snapshot backed by the filesystem under `root`.
    #[must_use]
    pub fn from_disk(root: PathBuf, mut files: Vec<FileEntry>, ignored: usize) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        Self {
            root,
            files,
            ignored,
            source: Source::Disk,
        }
    }

    /// Snapshot backed by in-memory contents, keyed by relative path.
    pub fn in_memory<P, C>(entries: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        let contents: BTreeMap<String, String> = entries
            .into_iter()
            .map(|(p, c)| (p.into(), c.into()))
            .collect();
        let files = contents
            .iter()
            .map(|(path, text)| FileEntry {
                path: path.clone(),
                size: text.len() as u64,
            })
            .collect();
        Self {
            root: PathBuf::from("."),
            files,
            ignored: 0,
            source: Source::Memory(contents),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Number of files dropped by size or count limits during collection.
    #[must_use]
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// Reads a file by relative (or absolute) path.
    ///
    /// # Errors
    /// Returns error if the file is missing or not valid UTF-8.
    pub fn read_text(&self, path: &str) -> io::Result<String> {
        match &self.source {
            Source::Disk => {
                let p = Path::new(path);
                let full = if p.is_absolute() { p.to_path_buf() } else { self.root.join(p) };
                std::fs::read_to_string(full)
            }
            Source::Memory(contents) => contents
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string())),
        }
    }

    /// Every directory that contains at least one collected file, at any depth.
    #[must_use]
    pub fn directories(&self) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        for file in &self.files {
            let mut current = file.path.as_str();
            while let Some(idx) = current.rfind('/') {
                current = &current[..idx];
                if !dirs.insert(current.to_string()) {
                    break;
                }
            }
        }
        dirs
    }

    /// Files whose final path component equals `name`.
    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FileEntry> + 'a {
        self.files.iter().filter(move |f| file_name(&f.path) == name)
    }
}

/// Final component of a forward-slash path.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parent directory of a forward-slash path, `"."` at the root.
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or(".", |idx| &path[..idx])
}

/// Extension (without the dot) of a forward-slash path.
#[must_use]
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    let idx = name.rfind('.')?;
    if idx == 0 {
        return None;
    }
    Some(&name[idx + 1..])
}
