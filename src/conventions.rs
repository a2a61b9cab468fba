// src/conventions.rs
//! Convention mining and confidence scoring.
//!
//! A convention is a choice between two competing styles (for example
//! `.test.ts` versus `.spec.ts`). Its confidence comes from how consistently
//! the dominant style is used across the candidate sites.

use serde::{Deserialize, Serialize};

use crate::evidence::{EvidenceId, EvidenceIndexer, EvidenceKind, Observation};
use crate::graph::LanguageFamily;
use crate::snapshot::{file_name, RepoSnapshot};

/// Example files cited per convention.
const MAX_EXAMPLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Med,
    Low,
    Conflict,
}

impl Confidence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Med => "MED",
            Self::Low => "LOW",
            Self::Conflict => "CONFLICT",
        }
    }
}

/// Scores `hits` out of `total` candidate sites.
///
/// `ratio > 0.8` with more than two hits is `High`, `ratio > 0.5` is `Med`,
/// anything else (including no candidates) is `Low`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(hits: usize, total: usize) -> (f64, Confidence) {
    if total == 0 {
        return (0.0, Confidence::Low);
    }
    let ratio = hits as f64 / total as f64;
    let label = if ratio > 0.8 && hits > 2 {
        Confidence::High
    } else if ratio > 0.5 {
        Confidence::Med
    } else {
        Confidence::Low
    };
    (ratio, label)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Convention {
    pub conv_id: String,
    pub description: String,
    pub confidence: Confidence,
    pub score: f64,
    #[serde(default)]
    pub examples: Vec<EvidenceId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conventions {
    pub items: Vec<Convention>,
}

impl Conventions {
    /// IDs of conventions whose competing styles are tied.
    #[must_use]
    pub fn conflicts(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|c| c.confidence == Confidence::Conflict)
            .map(|c| c.conv_id.clone())
            .collect()
    }
}

/// One side of a two-way style choice.
struct Style<'a> {
    label: &'static str,
    files: Vec<&'a str>,
}

impl<'a> Style<'a> {
    fn new(label: &'static str) -> Self {
        Self {
            label,
            files: Vec::new(),
        }
    }
}

/// Mines test naming and placement conventions from file paths.
pub fn mine(snapshot: &RepoSnapshot, evidence: &mut EvidenceIndexer) -> Conventions {
    let mut dot_test = Style::new("`.test.` infix");
    let mut dot_spec = Style::new("`.spec.` infix");
    let mut py_prefix = Style::new("`test_` prefix");
    let mut py_suffix = Style::new("`_test` suffix");
    let mut dedicated = Style::new("dedicated test directories");
    let mut colocated = Style::new("files next to the code under test");

    for file in snapshot.files() {
        let path = file.path.as_str();
        let name = file_name(path);
        let is_test = match LanguageFamily::from_path(path) {
            Some(LanguageFamily::Script) if name.contains(".test.") => {
                dot_test.files.push(path);
                true
            }
            Some(LanguageFamily::Script) if name.contains(".spec.") => {
                dot_spec.files.push(path);
                true
            }
            Some(LanguageFamily::Python) if name.starts_with("test_") => {
                py_prefix.files.push(path);
                true
            }
            Some(LanguageFamily::Python) if name.ends_with("_test.py") => {
                py_suffix.files.push(path);
                true
            }
            _ => false,
        };
        if !is_test {
            continue;
        }
        if in_test_dir(path) {
            dedicated.files.push(path);
        } else {
            colocated.files.push(path);
        }
    }

    let items = [
        ("conv:test-naming-js", "Script test files use the", dot_test, dot_spec),
        ("conv:test-naming-py", "Python test files use the", py_prefix, py_suffix),
        ("conv:test-placement", "Tests live in", dedicated, colocated),
    ]
    .into_iter()
    .filter_map(|(id, lead, a, b)| choose(id, lead, &a, &b, evidence))
    .collect();

    Conventions { items }
}

fn in_test_dir(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments
        .iter()
        .any(|s| matches!(*s, "__tests__" | "tests" | "test"))
}

fn choose(
    conv_id: &str,
    lead: &str,
    a: &Style<'_>,
    b: &Style<'_>,
    evidence: &mut EvidenceIndexer,
) -> Option<Convention> {
    let total = a.files.len() + b.files.len();
    if total == 0 {
        return None;
    }

    let (description, confidence, score, cited) = if a.files.len() == b.files.len() {
        (
            format!("{lead} {} or the {} equally", a.label, b.label),
            Confidence::Conflict,
            0.5,
            [a.files.as_slice(), b.files.as_slice()].concat(),
        )
    } else {
        let winner = if a.files.len() > b.files.len() { a } else { b };
        let (score, confidence) = score(winner.files.len(), total);
        (
            format!("{lead} {}", winner.label),
            confidence,
            score,
            winner.files.clone(),
        )
    };

    let mut cited = cited;
    cited.sort_unstable();
    let examples = cited
        .into_iter()
        .take(MAX_EXAMPLES)
        .map(|path| evidence.submit(Observation::new(path, EvidenceKind::Code)))
        .collect();

    Some(Convention {
        conv_id: conv_id.to_string(),
        description,
        confidence,
        score,
        examples,
    })
}
