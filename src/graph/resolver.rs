// src/graph/resolver.rs
use std::collections::BTreeSet;

use super::{LanguageFamily, ModuleRef, RawSpecifier};
use crate::snapshot::{parent_dir, RepoSnapshot};

const SCRIPT_EXTS: &[&str] = &[".tsx", ".ts", ".jsx", ".mjs", ".cjs", ".js"];

/// Turns raw specifiers into canonical module references.
///
/// Resolution is a pure function of the specifier, the importing file's path,
/// and the directory set captured at construction. It never touches the
/// filesystem and never fails.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    directories: BTreeSet<String>,
}

impl Resolver {
    #[must_use]
    pub fn new(directories: BTreeSet<String>) -> Self {
        Self { directories }
    }

    #[must_use]
    pub fn for_snapshot(snapshot: &RepoSnapshot) -> Self {
        Self::new(snapshot.directories())
    }

    /// Resolves a specifier found in `source_path`.
    #[must_use]
    pub fn resolve(&self, family: LanguageFamily, spec: &RawSpecifier, source_path: &str) -> ModuleRef {
        match family {
            LanguageFamily::Script => self.resolve_script(&spec.text, source_path),
            LanguageFamily::Python => self.resolve_python(&spec.text, spec.leading_dots(), source_path),
        }
    }

    fn resolve_python(&self, text: &str, dots: usize, source_path: &str) -> ModuleRef {
        let remainder = &text[dots..];

        if dots == 0 {
            let first = remainder.split('.').next().unwrap_or(remainder);
            return if self.is_internal_root(first) {
                ModuleRef::Internal(remainder.to_string())
            } else {
                ModuleRef::External(text.to_string())
            };
        }

        let mut segments = dir_segments(source_path);
        let pop = dots - 1;
        if pop > segments.len() {
            return unresolved(remainder, text);
        }
        segments.truncate(segments.len() - pop);
        segments.extend(remainder.split('.').filter(|s| !s.is_empty()));
        ModuleRef::Internal(segments.join("."))
    }

    fn resolve_script(&self, text: &str, source_path: &str) -> ModuleRef {
        let text = text.replace('\\', "/");
        if !is_relative(&text) {
            return self.resolve_bare(&text);
        }

        let mut base = dir_segments(source_path);
        let mut remainder: Vec<&str> = Vec::new();
        let mut exceeded = false;
        let mut climbed = 0;

        for part in text.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if remainder.pop().is_some() {
                        continue;
                    }
                    if base.pop().is_some() {
                        climbed += 1;
                    } else {
                        exceeded = true;
                    }
                }
                other => remainder.push(other),
            }
        }

        let rest = strip_script_ext(&remainder.join("/"));
        if exceeded {
            return unresolved(&rest, &text);
        }

        // `../../apps/api/y` written as if from the root: only climbing specifiers qualify.
        let resolved = join_path(&base, &rest);
        if climbed > 0
            && self.is_missing_dir(parent_dir(&resolved))
            && !self.is_missing_dir(parent_dir(&rest))
        {
            return ModuleRef::Internal(rest);
        }
        ModuleRef::Internal(resolved)
    }

    fn resolve_bare(&self, text: &str) -> ModuleRef {
        let first = text.split('/').next().unwrap_or(text);
        if first.starts_with('@') || !self.is_internal_root(first) {
            return ModuleRef::External(text.to_string());
        }
        let segments: Vec<&str> = text.split('/').filter(|s| !s.is_empty() && *s != ".").collect();
        ModuleRef::Internal(strip_script_ext(&segments.join("/")))
    }

    fn is_internal_root(&self, segment: &str) -> bool {
        !segment.is_empty() && !segment.contains('/') && self.directories.contains(segment)
    }

    /// A directory is missing only when the directory set is known and lacks it.
    fn is_missing_dir(&self, dir: &str) -> bool {
        dir != "." && !self.directories.is_empty() && !self.directories.contains(dir)
    }
}

fn is_relative(text: &str) -> bool {
    text == "." || text == ".." || text.starts_with("./") || text.starts_with("../")
}

fn dir_segments(source_path: &str) -> Vec<&str> {
    let dir = parent_dir(source_path);
    if dir == "." {
        return Vec::new();
    }
    dir.split('/').filter(|s| !s.is_empty() && *s != ".").collect()
}

fn join_path(base: &[&str], rest: &str) -> String {
    base.iter()
        .copied()
        .chain(rest.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn strip_script_ext(path: &str) -> String {
    SCRIPT_EXTS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .filter(|stem| !stem.is_empty() && !stem.ends_with('/'))
        .unwrap_or(path)
        .to_string()
}

/// Best-effort result when relative popping runs past the root.
fn unresolved(remainder: &str, original: &str) -> ModuleRef {
    if remainder.is_empty() {
        ModuleRef::Internal(original.to_string())
    } else {
        ModuleRef::Internal(remainder.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SpecifierKind;

    fn dirs(list: &[&str]) -> Resolver {
        Resolver::new(list.iter().map(ToString::to_string).collect())
    }

    fn py(r: &Resolver, text: &str, source: &str) -> ModuleRef {
        r.resolve(LanguageFamily::Python, &RawSpecifier::new(SpecifierKind::From, text), source)
    }

    fn ts(r: &Resolver, text: &str, source: &str) -> ModuleRef {
        r.resolve(LanguageFamily::Script, &RawSpecifier::new(SpecifierKind::Static, text), source)
    }

    fn internal(s: &str) -> ModuleRef {
        ModuleRef::Internal(s.to_string())
    }

    #[test]
    fn test_python_relative_levels() {
        let r = Resolver::default();
        assert_eq!(py(&r, ".utils", "apps/api/foo.py"), internal("apps.api.utils"));
        assert_eq!(py(&r, "..shared", "apps/api/foo.py"), internal("apps.shared"));
        assert_eq!(py(&r, "...core.db", "apps/api/foo.py"), internal("core.db"));
    }

    #[test]
    fn test_python_too_deep_returns_remainder() {
        let r = Resolver::default();
        assert_eq!(py(&r, "....x.y", "apps/api/foo.py"), internal("x.y"));
        assert_eq!(py(&r, "..x", "foo.py"), internal("x"));
    }

    #[test]
    fn test_python_absolute_internal_vs_external() {
        let r = dirs(&["apps", "apps/api"]);
        assert_eq!(py(&r, "apps.api.models", "apps/web/x.py"), internal("apps.api.models"));
        assert_eq!(py(&r, "requests", "apps/web/x.py"), ModuleRef::External("requests".into()));
    }

    #[test]
    fn test_script_relative_normalized() {
        let r = Resolver::default();
        assert_eq!(ts(&r, "./utils", "apps/web/src/x.ts"), internal("apps/web/src/utils"));
        assert_eq!(ts(&r, "../lib/./a.js", "apps/web/src/x.ts"), internal("apps/web/lib/a"));
        assert_eq!(ts(&r, "./a/../b", "src/x.ts"), internal("src/b"));
        assert_eq!(ts(&r, "./legacy.mjs", "src/x.ts"), internal("src/legacy"));
    }

    #[test]
    fn test_script_equivalent_specifiers_compare_equal() {
        let r = Resolver::default();
        let a = ts(&r, "../shared/util", "pkg/a/x.ts");
        let b = ts(&r, "../../shared/util.ts", "pkg/b/c/y.ts");
        assert_eq!(a, b);
    }

    #[test]
    fn test_script_bare_specifiers() {
        let r = dirs(&["apps", "apps/api"]);
        assert_eq!(ts(&r, "react", "apps/web/x.ts"), ModuleRef::External("react".into()));
        assert_eq!(ts(&r, "@scope/pkg/sub", "apps/web/x.ts"), ModuleRef::External("@scope/pkg/sub".into()));
        assert_eq!(ts(&r, "apps/api/y", "apps/web/x.ts"), internal("apps/api/y"));
    }

    #[test]
    fn test_script_too_deep_returns_remainder() {
        let r = Resolver::default();
        assert_eq!(ts(&r, "../../../x/y", "a/b.ts"), internal("x/y"));
    }

    #[test]
    fn test_script_falls_back_to_root_relative_remainder() {
        let r = dirs(&["apps", "apps/web", "apps/web/src", "apps/api"]);
        assert_eq!(ts(&r, "../../apps/api/y", "apps/web/src/x.ts"), internal("apps/api/y"));
        // A resolvable target is kept as-is.
        assert_eq!(ts(&r, "../../api/y", "apps/web/src/x.ts"), internal("apps/api/y"));
    }

    #[test]
    fn test_script_same_dir_specifier_never_rerooted() {
        let r = dirs(&["assets", "apps", "apps/web", "apps/web/src"]);
        assert_eq!(
            ts(&r, "./assets/logo", "apps/web/src/x.ts"),
            internal("apps/web/src/assets/logo")
        );
        assert_eq!(ts(&r, "assets/logo", "apps/web/src/x.ts"), internal("assets/logo"));
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let r = dirs(&["apps"]);
        let first = ts(&r, "../x", "apps/a/b.ts");
        for _ in 0..3 {
            assert_eq!(ts(&r, "../x", "apps/a/b.ts"), first);
        }
    }
}
