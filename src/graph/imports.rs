// src/graph/imports.rs
//! Lexical import extraction.
//!
//! Each language family has a matcher that scans file text for literal
//! specifiers. This is a best-effort scan, not a parser: computed or templated
//! specifiers are never evaluated and unrecognized syntax is skipped.

use std::sync::LazyLock;

use regex::Regex;

use super::{LanguageFamily, RawSpecifier, SpecifierKind};

/// Pulls raw specifiers out of source text for one language family.
pub trait ImportMatcher: Sync {
    /// Specifiers in the order they appear in `content`.
    fn matches(&self, content: &str) -> Vec<RawSpecifier>;
}

/// Extracts raw specifiers from the given file content.
///
/// Returns `None` when the path is not a recognized source file.
#[must_use]
pub fn extract(path: &str, content: &str) -> Option<(LanguageFamily, Vec<RawSpecifier>)> {
    let family = LanguageFamily::from_path(path)?;
    Some((family, matcher_for(family).matches(content)))
}

#[must_use]
pub fn matcher_for(family: LanguageFamily) -> &'static dyn ImportMatcher {
    match family {
        LanguageFamily::Script => &ScriptMatcher,
        LanguageFamily::Python => &PythonMatcher,
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("Invalid import pattern: {e}"))
}

static TS_STATIC: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"\b(?:import|export)\s+(?:type\s+)?(?:[\w$*{}\s,]+?\s+from\s*)?["']([^"'\r\n]+)["']"#)
});
static TS_DYNAMIC: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\bimport\s*\(\s*["']([^"'\r\n]+)["']\s*\)"#));
static TS_REQUIRE: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"\brequire\s*\(\s*["']([^"'\r\n]+)["']\s*\)"#));

static PY_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?m)^[ \t]*import[ \t]+([\w. \t,]+)"));
static PY_FROM: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?m)^[ \t]*from[ \t]+(\.*)([\w.]*)[ \t]+import[ \t]+(\([^)]*\)|[^\r\n#;]+)")
});

/// JavaScript / TypeScript: static, dynamic, and `require` forms.
pub struct ScriptMatcher;

impl ImportMatcher for ScriptMatcher {
    fn matches(&self, content: &str) -> Vec<RawSpecifier> {
        let mut found: Vec<(usize, RawSpecifier)> = Vec::new();
        let shapes = [
            (&*TS_STATIC, SpecifierKind::Static),
            (&*TS_DYNAMIC, SpecifierKind::Dynamic),
            (&*TS_REQUIRE, SpecifierKind::Require),
        ];

        for (re, kind) in shapes {
            for caps in re.captures_iter(content) {
                if let Some(m) = caps.get(1) {
                    found.push((m.start(), RawSpecifier::new(kind, m.as_str())));
                }
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, s)| s).collect()
    }
}

/// Python: `import a, b` and `from X import ...`, relative forms included.
pub struct PythonMatcher;

impl ImportMatcher for PythonMatcher {
    fn matches(&self, content: &str) -> Vec<RawSpecifier> {
        let mut found: Vec<(usize, RawSpecifier)> = Vec::new();

        for caps in PY_IMPORT.captures_iter(content) {
            let Some(list) = caps.get(1) else { continue };
            for name in split_names(list.as_str()) {
                found.push((list.start(), RawSpecifier::new(SpecifierKind::Import, name)));
            }
        }

        for caps in PY_FROM.captures_iter(content) {
            let (Some(dots), Some(module), Some(names)) = (caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };
            let offset = dots.start();
            for text in from_specifiers(dots.as_str(), module.as_str(), names.as_str()) {
                found.push((offset, RawSpecifier::new(SpecifierKind::From, text)));
            }
        }

        found.sort_by_key(|(offset, _)| *offset);
        found.into_iter().map(|(_, s)| s).collect()
    }
}

/// `from . import a, b` names each submodule; `from .m import a` names `.m`.
fn from_specifiers(dots: &str, module: &str, names: &str) -> Vec<String> {
    if module.is_empty() && dots.is_empty() {
        return Vec::new();
    }
    if !module.is_empty() {
        return vec![format!("{dots}{module}")];
    }

    let submodules: Vec<String> = split_names(names.trim_matches(|c| c == '(' || c == ')'))
        .into_iter()
        .filter(|n| !n.contains('.'))
        .map(|n| format!("{dots}{n}"))
        .collect();

    if submodules.is_empty() {
        vec![dots.to_string()]
    } else {
        submodules
    }
}

/// Splits a comma list of names, dropping `as` aliases and anything that is
/// not a dotted identifier.
fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|part| part.split_whitespace().next())
        .filter(|name| is_dotted_identifier(name))
        .map(ToString::to_string)
        .collect()
}

fn is_dotted_identifier(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name.split('.').all(|seg| {
            !seg.is_empty()
                && seg.chars().all(|c| c.is_alphanumeric() || c == '_')
                && !seg.starts_with(|c: char| c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(specs: &[RawSpecifier]) -> Vec<&str> {
        specs.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_ts_three_shapes_in_file_order() {
        let code = r#"
            const fs = require('fs');
            import { Foo } from "./components";
            const lazy = await import("./lazy");
            export * from "./utils";
        "#;
        let (family, specs) = extract("app.ts", code).unwrap();
        assert_eq!(family, LanguageFamily::Script);
        assert_eq!(texts(&specs), vec!["fs", "./components", "./lazy", "./utils"]);
        assert_eq!(specs[0].kind, SpecifierKind::Require);
        assert_eq!(specs[1].kind, SpecifierKind::Static);
        assert_eq!(specs[2].kind, SpecifierKind::Dynamic);
        assert_eq!(specs[3].kind, SpecifierKind::Static);
    }

    #[test]
    fn test_ts_multiline_clause() {
        let code = "import {\n  a,\n  b as c,\n} from '../shared/thing';\nimport type { T } from \"./types\";\n";
        let specs = ScriptMatcher.matches(code);
        assert_eq!(texts(&specs), vec!["../shared/thing", "./types"]);
    }

    #[test]
    fn test_ts_side_effect_and_default() {
        let specs = ScriptMatcher.matches("import './polyfill';\nimport React, { useState } from 'react';");
        assert_eq!(texts(&specs), vec!["./polyfill", "react"]);
    }

    #[test]
    fn test_ts_templates_and_computed_ignored() {
        let code = "const a = import(`./${name}`);\nconst b = require(path);\nconst c = import(base + '/x');";
        assert!(ScriptMatcher.matches(code).is_empty());
    }

    #[test]
    fn test_ts_duplicates_kept_in_list() {
        let specs = ScriptMatcher.matches("import a from './a';\nimport('./a');");
        assert_eq!(texts(&specs), vec!["./a", "./a"]);
        assert_ne!(specs[0].kind, specs[1].kind);
    }

    #[test]
    fn test_python_plain_imports() {
        let code = "import os, sys\nimport numpy as np\nimport a.b.c\n";
        let specs = PythonMatcher.matches(code);
        assert_eq!(texts(&specs), vec!["os", "sys", "numpy", "a.b.c"]);
        assert!(specs.iter().all(|s| s.kind == SpecifierKind::Import));
    }

    #[test]
    fn test_python_from_forms() {
        let code = "from pathlib import Path\nfrom .models import User\nfrom . import utils, helpers\nfrom .. import shared\nfrom ...core.db import session\n";
        let specs = PythonMatcher.matches(code);
        assert_eq!(
            texts(&specs),
            vec!["pathlib", ".models", ".utils", ".helpers", "..shared", "...core.db"]
        );
        assert_eq!(specs[4].leading_dots(), 2);
    }

    #[test]
    fn test_python_parenthesised_names() {
        let code = "from . import (\n    alpha,\n    beta as b,\n)\n";
        let specs = PythonMatcher.matches(code);
        assert_eq!(texts(&specs), vec![".alpha", ".beta"]);
    }

    #[test]
    fn test_python_star_keeps_package() {
        let specs = PythonMatcher.matches("from . import *\n");
        assert_eq!(texts(&specs), vec!["."]);
    }

    #[test]
    fn test_python_malformed_skipped() {
        let specs = PythonMatcher.matches("import\nfrom import x\nimport 3abc\n");
        assert!(specs.is_empty());
    }

    #[test]
    fn test_unknown_extension() {
        assert!(extract("main.rs", "use std::io;").is_none());
    }
}
