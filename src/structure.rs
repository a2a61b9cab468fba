// src/structure.rs
//! Project topology inferred from manifest files.

use serde::{Deserialize, Serialize};

use crate::evidence::{EvidenceIndexer, EvidenceKind, Observation};
use crate::snapshot::{file_name, parent_dir, RepoSnapshot};

/// Manifests that mark a directory as a project root, in precedence order.
pub const PROJECT_MARKERS: &[&str] = &["package.json", "pyproject.toml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    App,
    Library,
    Service,
    Package,
    Unknown,
}

impl ProjectKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Library => "library",
            Self::Service => "service",
            Self::Package => "package",
            Self::Unknown => "unknown",
        }
    }

    /// Classifies a project directory by the folders it sits under.
    #[must_use]
    pub fn classify(dir: &str) -> Self {
        let segments: Vec<&str> = dir.split('/').collect();
        let parents = &segments[..segments.len().saturating_sub(1)];
        if parents.iter().any(|s| matches!(*s, "apps" | "services")) {
            Self::App
        } else if parents.iter().any(|s| matches!(*s, "packages" | "libs")) {
            Self::Library
        } else {
            Self::Unknown
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    pub name: String,
    /// Manifest that declared the project.
    pub marker: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStructure {
    pub projects: Vec<ProjectDescriptor>,
    pub boundaries: Vec<String>,
    pub domains: Vec<String>,
}

impl ProjectStructure {
    /// The project that owns `path`: longest declared path that is a prefix
    /// ending on a separator.
    #[must_use]
    pub fn locate(&self, path: &str) -> Option<&ProjectDescriptor> {
        self.projects
            .iter()
            .filter(|p| owns(&p.path, path))
            .max_by_key(|p| if p.path == "." { 0 } else { p.path.len() })
    }

    /// Paths of every `app` project, sorted.
    #[must_use]
    pub fn app_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .projects
            .iter()
            .filter(|p| p.kind == ProjectKind::App)
            .map(|p| p.path.clone())
            .collect();
        paths.sort();
        paths
    }
}

/// Path-boundary-aware containment: `apps/web` owns `apps/web/x.ts` but not
/// `apps/webhooks/x.ts`. The root `.` owns everything.
#[must_use]
pub fn owns(project: &str, path: &str) -> bool {
    if project == "." || project.is_empty() {
        return true;
    }
    path == project
        || path
            .strip_prefix(project)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Among `candidates`, the longest project path owning `path`.
#[must_use]
pub fn locate_in<'a>(candidates: impl IntoIterator<Item = &'a str>, path: &str) -> Option<&'a str> {
    candidates
        .into_iter()
        .filter(|p| owns(p, path))
        .max_by_key(|p| if *p == "." { 0 } else { p.len() })
}

/// Infers projects from manifests. Each manifest is cited as evidence.
pub fn infer(snapshot: &RepoSnapshot, evidence: &mut EvidenceIndexer) -> ProjectStructure {
    let mut projects: Vec<ProjectDescriptor> = Vec::new();

    for marker in PROJECT_MARKERS {
        for file in snapshot.files_named(marker) {
            let dir = parent_dir(&file.path);
            if projects.iter().any(|p| p.path == dir) {
                continue;
            }
            evidence.submit(Observation::new(file.path.clone(), EvidenceKind::Config));
            projects.push(ProjectDescriptor {
                path: dir.to_string(),
                kind: ProjectKind::classify(dir),
                name: project_name(dir, snapshot),
                marker: file.path.clone(),
            });
        }
    }

    projects.sort_by(|a, b| a.path.cmp(&b.path));
    let boundaries = projects
        .iter()
        .filter(|p| p.path != ".")
        .map(|p| p.path.clone())
        .collect();

    log::info!("Inferred {} projects", projects.len());
    ProjectStructure {
        projects,
        boundaries,
        domains: Vec::new(),
    }
}

fn project_name(dir: &str, snapshot: &RepoSnapshot) -> String {
    if dir != "." {
        return file_name(dir).to_string();
    }
    snapshot
        .root()
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(path: &str, kind: ProjectKind) -> ProjectDescriptor {
        ProjectDescriptor {
            path: path.into(),
            kind,
            name: file_name(path).into(),
            marker: format!("{path}/package.json"),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(ProjectKind::classify("apps/web"), ProjectKind::App);
        assert_eq!(ProjectKind::classify("services/billing"), ProjectKind::App);
        assert_eq!(ProjectKind::classify("packages/ui"), ProjectKind::Library);
        assert_eq!(ProjectKind::classify("libs/core"), ProjectKind::Library);
        assert_eq!(ProjectKind::classify("apps"), ProjectKind::Unknown);
        assert_eq!(ProjectKind::classify("myapps/x"), ProjectKind::Unknown);
        assert_eq!(ProjectKind::classify("."), ProjectKind::Unknown);
    }

    #[test]
    fn test_owns_respects_separator() {
        assert!(owns("apps/web", "apps/web/src/x.ts"));
        assert!(owns("apps/web", "apps/web"));
        assert!(!owns("apps/web", "apps/webhooks/x.ts"));
        assert!(owns(".", "anything.ts"));
    }

    #[test]
    fn test_locate_prefers_longest() {
        let s = ProjectStructure {
            projects: vec![
                descriptor(".", ProjectKind::Unknown),
                descriptor("apps/web", ProjectKind::App),
                descriptor("apps/web/plugins/x", ProjectKind::App),
            ],
            ..Default::default()
        };
        assert_eq!(s.locate("apps/web/src/a.ts").unwrap().path, "apps/web");
        assert_eq!(s.locate("apps/web/plugins/x/a.ts").unwrap().path, "apps/web/plugins/x");
        assert_eq!(s.locate("apps/webhooks/a.ts").unwrap().path, ".");
    }

    #[test]
    fn test_infer_from_manifests() {
        let snap = RepoSnapshot::in_memory([
            ("package.json", "{}"),
            ("apps/web/package.json", "{}"),
            ("apps/api/pyproject.toml", ""),
            ("packages/ui/package.json", "{}"),
            ("packages/ui/pyproject.toml", ""),
        ]);
        let mut ix = EvidenceIndexer::new(false);
        let s = infer(&snap, &mut ix);

        let paths: Vec<_> = s.projects.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths, vec![".", "apps/api", "apps/web", "packages/ui"]);
        assert_eq!(s.boundaries, vec!["apps/api", "apps/web", "packages/ui"]);
        assert_eq!(s.app_paths(), vec!["apps/api", "apps/web"]);
        assert_eq!(s.projects[3].marker, "packages/ui/package.json");
        assert_eq!(s.projects[3].kind, ProjectKind::Library);
        assert_eq!(ix.len(), 4);
    }

    #[test]
    fn test_descriptor_serializes_type_key() {
        let json = serde_json::to_value(descriptor("apps/web", ProjectKind::App)).unwrap();
        assert_eq!(json["type"], "app");
        assert_eq!(json["name"], "web");
    }
}
