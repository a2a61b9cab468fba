// src/evidence.rs
//! Content-addressed evidence records.
//!
//! Every observation a stage wants to cite (a manifest, a test file, a script
//! entry) is submitted here and receives its [`EvidenceId`] on the spot. The
//! ID is a pure function of `(path, start, end, kind)`, so the same location
//! keeps its identity across runs even when its content drifts.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BrainError, Result};
use crate::utils::{compute_sha256, short_id};

pub type EvidenceId = String;

/// Sorted map from ID to record, serialized as the brain's `evidence` object.
pub type EvidenceIndex = BTreeMap<EvidenceId, EvidenceRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Code,
    Config,
    Doc,
}

impl EvidenceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Config => "config",
            Self::Doc => "doc",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw observation as produced by a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub path: String,
    pub kind: EvidenceKind,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub excerpt: Option<String>,
    pub content_hash: Option<String>,
}

impl Observation {
    pub fn new(path: impl Into<String>, kind: EvidenceKind) -> Self {
        Self {
            path: path.into(),
            kind,
            start_line: None,
            end_line: None,
            excerpt: None,
            content_hash: None,
        }
    }

    #[must_use]
    pub fn lines(mut self, start: u32, end: u32) -> Self {
        self.start_line = Some(start);
        self.end_line = Some(end);
        self
    }

    #[must_use]
    pub fn excerpt(mut self, text: impl Into<String>) -> Self {
        self.excerpt = Some(text.into());
        self
    }

    #[must_use]
    pub fn content_hash(mut self, hash: impl Into<String>) -> Self {
        self.content_hash = Some(hash.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> EvidenceId {
        evidence_id(&self.path, self.start_line, self.end_line, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceRecord {
    pub path: String,
    pub kind: EvidenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl EvidenceRecord {
    fn from_observation(obs: Observation, store_snippets: bool) -> Self {
        let excerpt_hash = obs
            .content_hash
            .or_else(|| obs.excerpt.as_deref().map(compute_sha256));
        Self {
            path: obs.path,
            kind: obs.kind,
            start_line: obs.start_line,
            end_line: obs.end_line,
            excerpt_hash,
            excerpt: obs.excerpt.filter(|_| store_snippets),
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}:{}:{}:{} ({})",
            self.path,
            self.start_line.unwrap_or(0),
            self.end_line.unwrap_or(0),
            self.kind,
            self.excerpt_hash.as_deref().unwrap_or("-")
        )
    }
}

/// Deterministic identifier for an observation tuple.
#[must_use]
pub fn evidence_id(path: &str, start: Option<u32>, end: Option<u32>, kind: EvidenceKind) -> EvidenceId {
    let key = format!("{path}:{}:{}:{kind}", start.unwrap_or(0), end.unwrap_or(0));
    short_id("ev", &key)
}

/// Accumulates evidence for one pipeline run.
///
/// One indexer is threaded through every stage; producers keep the returned
/// ID inline, and [`EvidenceIndexer::finish`] freezes the result.
#[derive(Debug, Default)]
pub struct EvidenceIndexer {
    store_snippets: bool,
    records: EvidenceIndex,
}

impl EvidenceIndexer {
    #[must_use]
    pub fn new(store_snippets: bool) -> Self {
        Self {
            store_snippets,
            records: BTreeMap::new(),
        }
    }

    /// Submits an observation and returns its ID.
    ///
    /// A conflicting record under the same ID is refused and logged; the
    /// caller still receives the ID, which keeps pointing at the original.
    pub fn submit(&mut self, obs: Observation) -> EvidenceId {
        let id = obs.id();
        if let Err(e) = self.try_submit(obs) {
            log::warn!("{e}");
        }
        id
    }

    /// Submits an observation, surfacing collisions as errors.
    ///
    /// # Errors
    /// Returns `EvidenceCollision` if a different record already owns the ID.
    pub fn try_submit(&mut self, obs: Observation) -> Result<EvidenceId> {
        let id = obs.id();
        let record = EvidenceRecord::from_observation(obs, self.store_snippets);
        self.admit(id.clone(), record)?;
        Ok(id)
    }

    /// Inserts `record` under `id` unless a differing record is already there.
    pub(crate) fn admit(&mut self, id: EvidenceId, record: EvidenceRecord) -> Result<()> {
        match self.records.get(&id) {
            Some(existing) if *existing == record => Ok(()),
            Some(existing) => Err(BrainError::EvidenceCollision {
                id,
                existing: existing.describe(),
                incoming: record.describe(),
            }),
            None => {
                self.records.insert(id, record);
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&EvidenceRecord> {
        self.records.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> EvidenceIndex {
        self.records
    }
}

/// Indexes a complete batch of observations at once.
///
/// # Errors
/// Returns the first collision encountered.
pub fn index_all(
    observations: impl IntoIterator<Item = Observation>,
    store_snippets: bool,
) -> Result<EvidenceIndex> {
    let mut indexer = EvidenceIndexer::new(store_snippets);
    for obs in observations {
        indexer.try_submit(obs)?;
    }
    Ok(indexer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_stable_and_positional() {
        let a = Observation::new("apps/web/package.json", EvidenceKind::Config).id();
        let b = evidence_id("apps/web/package.json", None, None, EvidenceKind::Config);
        let c = evidence_id("apps/web/package.json", Some(0), Some(0), EvidenceKind::Config);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(a.starts_with("ev:"));
        assert_eq!(a.len(), 15);
        assert_ne!(a, evidence_id("apps/web/package.json", None, None, EvidenceKind::Doc));
    }

    #[test]
    fn test_excerpt_hash_not_part_of_id() {
        let one = Observation::new("a.ts", EvidenceKind::Code).lines(1, 3).excerpt("x");
        let two = Observation::new("a.ts", EvidenceKind::Code).lines(1, 3).excerpt("y");
        assert_eq!(one.id(), two.id());
    }

    #[test]
    fn test_submit_computes_fingerprint_and_hides_snippet() {
        let mut ix = EvidenceIndexer::new(false);
        let id = ix.submit(Observation::new("a.ts", EvidenceKind::Code).lines(2, 4).excerpt("let a;"));
        let rec = ix.get(&id).unwrap();
        assert_eq!(rec.excerpt_hash.as_deref(), Some(compute_sha256("let a;").as_str()));
        assert!(rec.excerpt.is_none());

        let mut ix = EvidenceIndexer::new(true);
        let id = ix.submit(Observation::new("a.ts", EvidenceKind::Code).excerpt("let a;"));
        assert_eq!(ix.get(&id).unwrap().excerpt.as_deref(), Some("let a;"));
    }

    #[test]
    fn test_explicit_hash_wins() {
        let mut ix = EvidenceIndexer::new(false);
        let id = ix.submit(
            Observation::new("a.py", EvidenceKind::Code)
                .excerpt("x")
                .content_hash("feed"),
        );
        assert_eq!(ix.get(&id).unwrap().excerpt_hash.as_deref(), Some("feed"));
    }

    #[test]
    fn test_reobservation_merges() {
        let mut ix = EvidenceIndexer::new(false);
        let first = ix.submit(Observation::new("package.json", EvidenceKind::Config));
        let second = ix.try_submit(Observation::new("package.json", EvidenceKind::Config)).unwrap();
        assert_eq!(first, second);
        assert_eq!(ix.len(), 1);
    }

    #[test]
    fn test_collision_refused_and_original_kept() {
        let mut ix = EvidenceIndexer::new(false);
        let id = ix.submit(Observation::new("a.ts", EvidenceKind::Code).excerpt("old"));

        let forged = EvidenceRecord {
            path: "other.ts".into(),
            kind: EvidenceKind::Doc,
            start_line: None,
            end_line: None,
            excerpt_hash: None,
            excerpt: None,
        };
        let err = ix.admit(id.clone(), forged).unwrap_err();
        assert!(matches!(err, BrainError::EvidenceCollision { .. }));
        assert_eq!(ix.get(&id).unwrap().path, "a.ts");

        // Same location, different content within one run.
        let again = ix.submit(Observation::new("a.ts", EvidenceKind::Code).excerpt("new"));
        assert_eq!(again, id);
        assert_eq!(
            ix.get(&id).unwrap().excerpt_hash.as_deref(),
            Some(compute_sha256("old").as_str())
        );
    }

    #[test]
    fn test_index_all_reports_collision() {
        let batch = vec![
            Observation::new("a.ts", EvidenceKind::Code).content_hash("1"),
            Observation::new("a.ts", EvidenceKind::Code).content_hash("2"),
        ];
        assert!(index_all(batch, false).is_err());

        let ok = index_all(
            vec![
                Observation::new("b.ts", EvidenceKind::Code),
                Observation::new("a.ts", EvidenceKind::Code),
            ],
            false,
        )
        .unwrap();
        let paths: Vec<_> = ok.values().map(|r| r.path.as_str()).collect();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_record_serializes_camel_case_and_skips_none() {
        let mut ix = EvidenceIndexer::new(false);
        let id = ix.submit(Observation::new("a.ts", EvidenceKind::Code).lines(1, 2));
        let json = serde_json::to_string(ix.get(&id).unwrap()).unwrap();
        assert_eq!(json, r#"{"path":"a.ts","kind":"code","startLine":1,"endLine":2}"#);
    }
}
