// src/graph/mod.rs
//! Import graph: extraction, resolution, and the per-family partitions.

pub mod builder;
pub mod imports;
pub mod resolver;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::extension;

pub use builder::{build, build_node};
pub use imports::{extract, ImportMatcher, PythonMatcher, ScriptMatcher};
pub use resolver::Resolver;

/// Source language families with distinct import syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageFamily {
    /// JavaScript / TypeScript and their module variants.
    Script,
    Python,
}

impl LanguageFamily {
    #[must_use]
    pub fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::Script),
            "py" => Some(Self::Python),
            _ => None,
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        extension(path).and_then(Self::from_ext)
    }

    /// Separator used in canonical internal module ids.
    #[must_use]
    pub fn separator(self) -> char {
        match self {
            Self::Script => '/',
            Self::Python => '.',
        }
    }
}

/// How a specifier appeared in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierKind {
    /// `import ... from "x"`, `import "x"`, `export ... from "x"`
    Static,
    /// `import("x")`
    Dynamic,
    /// `require("x")`
    Require,
    /// Python `import a.b`
    Import,
    /// Python `from a.b import c`
    From,
}

/// The literal text of an import clause, tagged with its syntactic shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawSpecifier {
    pub kind: SpecifierKind,
    pub text: String,
}

impl RawSpecifier {
    #[must_use]
    pub fn new(kind: SpecifierKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Number of leading dots (Python relative depth).
    #[must_use]
    pub fn leading_dots(&self) -> usize {
        self.text.chars().take_while(|&c| c == '.').count()
    }
}

/// Resolved identity of an import target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleRef {
    /// Opaque third-party specifier.
    External(String),
    /// Canonical root-relative module id.
    Internal(String),
}

impl ModuleRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::External(s) | Self::Internal(s) => s,
        }
    }

    /// Internal id as a forward-slash path, `None` for externals.
    #[must_use]
    pub fn internal_path(&self, family: LanguageFamily) -> Option<String> {
        match self {
            Self::External(_) => None,
            Self::Internal(id) => Some(id.replace(family.separator(), "/")),
        }
    }
}

impl std::fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::External(s) => write!(f, "external:{s}"),
            Self::Internal(s) => write!(f, "{s}"),
        }
    }
}

/// One occurrence of a specifier together with what it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecifierEdge {
    #[serde(flatten)]
    pub specifier: RawSpecifier,
    pub target: ModuleRef,
}

/// Imports of a single source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileImportNode {
    pub path: String,
    /// Deduplicated resolved targets, first occurrence order.
    pub imports: Vec<ModuleRef>,
    /// Every specifier in extraction order, duplicates included.
    pub specifiers: Vec<SpecifierEdge>,
}

impl FileImportNode {
    /// Builds a node from resolved specifier occurrences. Returns `None` when
    /// the file has no imports.
    #[must_use]
    pub fn new(path: impl Into<String>, specifiers: Vec<SpecifierEdge>) -> Option<Self> {
        if specifiers.is_empty() {
            return None;
        }
        let mut imports: Vec<ModuleRef> = Vec::new();
        for edge in &specifiers {
            if !imports.contains(&edge.target) {
                imports.push(edge.target.clone());
            }
        }
        Some(Self {
            path: path.into(),
            imports,
            specifiers,
        })
    }

    /// Every specifier occurrence that produced `target`, in file order.
    pub fn specifiers_for<'a>(
        &'a self,
        target: &'a ModuleRef,
    ) -> impl Iterator<Item = &'a RawSpecifier> + 'a {
        self.specifiers
            .iter()
            .filter(move |e| &e.target == target)
            .map(|e| &e.specifier)
    }
}

/// File-to-module import graph, partitioned by language family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportGraph {
    pub imports_ts: BTreeMap<String, FileImportNode>,
    pub imports_py: BTreeMap<String, FileImportNode>,
}

impl ImportGraph {
    #[must_use]
    pub fn partition(&self, family: LanguageFamily) -> &BTreeMap<String, FileImportNode> {
        match family {
            LanguageFamily::Script => &self.imports_ts,
            LanguageFamily::Python => &self.imports_py,
        }
    }

    pub fn insert(&mut self, family: LanguageFamily, node: FileImportNode) {
        let partition = match family {
            LanguageFamily::Script => &mut self.imports_ts,
            LanguageFamily::Python => &mut self.imports_py,
        };
        partition.insert(node.path.clone(), node);
    }

    /// All nodes with their family, scripts first, each partition path-sorted.
    pub fn nodes(&self) -> impl Iterator<Item = (LanguageFamily, &FileImportNode)> {
        [LanguageFamily::Script, LanguageFamily::Python]
            .into_iter()
            .flat_map(move |family| self.partition(family).values().map(move |n| (family, n)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.imports_ts.len() + self.imports_py.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
