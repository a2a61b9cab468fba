// src/graph/builder.rs
//! Graph construction: read, extract, resolve, partition.

use super::imports::matcher_for;
use super::{FileImportNode, ImportGraph, LanguageFamily, Resolver, SpecifierEdge};
use crate::snapshot::RepoSnapshot;

/// Builds the import graph for every source file in the snapshot.
///
/// Files are read sequentially in snapshot order. A file that cannot be read
/// or looks binary is skipped; extraction never fails the scan.
#[must_use]
pub fn build(snapshot: &RepoSnapshot) -> ImportGraph {
    let resolver = Resolver::for_snapshot(snapshot);
    let mut graph = ImportGraph::default();

    for file in snapshot.files() {
        let Some(family) = LanguageFamily::from_path(&file.path) else {
            continue;
        };
        let content = match snapshot.read_text(&file.path) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("Skipping unreadable {}: {e}", file.path);
                continue;
            }
        };
        if content.contains('\0') {
            log::debug!("Skipping binary-like {}", file.path);
            continue;
        }
        if let Some(node) = build_node(&resolver, family, &file.path, &content) {
            graph.insert(family, node);
        }
    }

    log::info!(
        "Import graph: {} script files, {} python files",
        graph.imports_ts.len(),
        graph.imports_py.len()
    );
    graph
}

/// Extracts and resolves the imports of one file.
#[must_use]
pub fn build_node(
    resolver: &Resolver,
    family: LanguageFamily,
    path: &str,
    content: &str,
) -> Option<FileImportNode> {
    let edges = matcher_for(family)
        .matches(content)
        .into_iter()
        .map(|specifier| {
            let target = resolver.resolve(family, &specifier, path);
            SpecifierEdge { specifier, target }
        })
        .collect();
    FileImportNode::new(path, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ModuleRef, SpecifierKind};

    #[test]
    fn test_partitions_and_skips_importless_files() {
        let snap = RepoSnapshot::in_memory([
            ("apps/web/a.ts", "import x from './b';"),
            ("apps/web/b.ts", "export const b = 1;"),
            ("svc/main.py", "import os\n"),
            ("README.md", "import x from 'y'"),
        ]);
        let graph = build(&snap);
        assert_eq!(graph.imports_ts.len(), 1);
        assert_eq!(graph.imports_py.len(), 1);
        assert!(graph.imports_ts.contains_key("apps/web/a.ts"));
    }

    #[test]
    fn test_dynamic_and_static_share_one_target() {
        let snap = RepoSnapshot::in_memory([(
            "src/a.ts",
            "import b from './b';\nconst lazy = () => import('./b');\n",
        )]);
        let graph = build(&snap);
        let node = &graph.imports_ts["src/a.ts"];
        assert_eq!(node.imports, vec![ModuleRef::Internal("src/b".into())]);
        assert_eq!(node.specifiers.len(), 2);
        assert_eq!(node.specifiers[1].specifier.kind, SpecifierKind::Dynamic);
        assert_eq!(node.specifiers[0].target, node.specifiers[1].target);
    }

    #[test]
    fn test_binary_file_skipped() {
        let snap = RepoSnapshot::in_memory([("src/a.js", "require('x')\0\0")]);
        assert!(build(&snap).is_empty());
    }

    #[test]
    fn test_build_is_deterministic() {
        let snap = RepoSnapshot::in_memory([
            ("pkg/a.py", "from . import b\nfrom .. import c\nimport json\n"),
            ("pkg/b.py", "from .a import thing\n"),
            ("web/x.ts", "import '../pkg/y';\nrequire('lodash');\n"),
        ]);
        let first = serde_json::to_string(&build(&snap)).unwrap();
        let second = serde_json::to_string(&build(&snap)).unwrap();
        assert_eq!(first, second);
    }
}
