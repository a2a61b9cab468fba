// src/pipeline.rs
//! The scan pipeline as an ordered set of stage functions.
//!
//! Each stage takes what it needs from [`ScanContext`] plus the outputs of
//! earlier stages and returns a plain record. The only value threaded
//! mutably through stages is the evidence indexer.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::brain::{Brain, Coverage, GeneratedWith, RepoInfo, Status, BRAIN_VERSION, SCHEMA_VERSION};
use crate::config::Config;
use crate::conventions::{self, Conventions};
use crate::discovery;
use crate::error::BrainError;
use crate::evidence::EvidenceIndexer;
use crate::graph::{self, ImportGraph};
use crate::profile;
use crate::render;
use crate::rules::{self, CheckReport, Policy, Rules, SynthesisInput};
use crate::snapshot::RepoSnapshot;
use crate::storage::{self, Drift};
use crate::structure::{self, ProjectStructure};
use crate::workflows::{self, Workflows};

/// Inputs shared by every stage of one run.
pub struct ScanContext {
    pub root: PathBuf,
    pub config: Config,
    pub snapshot: RepoSnapshot,
}

impl ScanContext {
    /// Loads config from `root` and collects the snapshot.
    ///
    /// # Errors
    /// Returns error if the root is unreadable or the config is invalid.
    pub fn open(root: &Path) -> crate::error::Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| BrainError::io(e, root))?;
        let config = Config::load(&root)?;
        Self::with_config(root, config)
    }

    /// Collects the snapshot with an explicit config.
    ///
    /// # Errors
    /// Returns error if the root is unreadable or a pattern is invalid.
    pub fn with_config(root: PathBuf, config: Config) -> crate::error::Result<Self> {
        let snapshot = discovery::collect(&root, &config)?;
        Ok(Self {
            root,
            config,
            snapshot,
        })
    }

    #[must_use]
    pub fn brain_dir(&self) -> PathBuf {
        self.config.brain_path(&self.root)
    }

    #[must_use]
    pub fn policy(&self) -> Policy {
        Policy {
            fail_on_warnings: self.config.rules.fail_on_warnings,
            ..Policy::default()
        }
    }
}

/// Structure, import graph and workflows of the snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub structure: ProjectStructure,
    pub graphs: ImportGraph,
    pub workflows: Workflows,
}

pub fn analyze(ctx: &ScanContext, evidence: &mut EvidenceIndexer) -> Analysis {
    Analysis {
        structure: structure::infer(&ctx.snapshot, evidence),
        graphs: graph::build(&ctx.snapshot),
        workflows: workflows::extract(&ctx.snapshot, evidence),
    }
}

pub fn synthesize(
    ctx: &ScanContext,
    analysis: &Analysis,
    conventions: &Conventions,
    evidence: &mut EvidenceIndexer,
) -> Rules {
    let input = SynthesisInput {
        structure: &analysis.structure,
        conventions,
        workflows: &analysis.workflows,
        policy: ctx.policy(),
    };
    rules::synthesize(&input, evidence)
}

/// Runs every stage and assembles the Brain. Nothing is written.
#[must_use]
pub fn build_brain(ctx: &ScanContext) -> Brain {
    let mut evidence = EvidenceIndexer::new(ctx.config.evidence.store_snippets);

    let profile = profile::detect(&ctx.snapshot);
    let analysis = analyze(ctx, &mut evidence);
    let conventions = conventions::mine(&ctx.snapshot, &mut evidence);
    let rules = synthesize(ctx, &analysis, &conventions, &mut evidence);

    let status = Status {
        coverage: Coverage {
            files_scanned: ctx.snapshot.files().len(),
            files_ignored: ctx.snapshot.ignored(),
        },
        conflicts: conventions.conflicts(),
    };

    Brain {
        schema_version: SCHEMA_VERSION.to_string(),
        brain_version: BRAIN_VERSION.to_string(),
        repo: RepoInfo {
            root: ctx.root.display().to_string(),
            git_commit: discovery::read_git_commit(&ctx.root),
            generated_with: GeneratedWith::default(),
        },
        profile,
        structure: analysis.structure,
        graphs: analysis.graphs,
        conventions,
        rules,
        workflows: analysis.workflows,
        evidence: evidence.finish(),
        status,
    }
}

/// Builds the Brain, then persists and renders it.
///
/// # Errors
/// Returns error if the output directory cannot be written.
pub fn generate(ctx: &ScanContext) -> Result<Brain> {
    let brain = build_brain(ctx);
    let dir = ctx.brain_dir();
    let path = storage::save_brain(&dir, &brain)?;
    render::write_all(&dir, &brain)?;
    log::info!("Wrote {}", path.display());
    Ok(brain)
}

/// Generates the Brain and stores it as the baseline as well.
///
/// # Errors
/// Returns error if the output directory cannot be written.
pub fn baseline(ctx: &ScanContext) -> Result<Brain> {
    let brain = generate(ctx)?;
    let path = storage::save_baseline(&ctx.brain_dir(), &brain)?;
    log::info!("Wrote {}", path.display());
    Ok(brain)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesSource {
    /// Loaded from `brain.json`.
    Stored,
    /// No stored brain; synthesized from the current scan.
    Synthesized,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub rules_source: RulesSource,
    pub report: CheckReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drift: Option<Drift>,
}

/// Checks the current import graph against stored (or freshly synthesized)
/// rules and compares against the baseline when one exists.
///
/// # Errors
/// Returns error if a stored artifact exists but cannot be read.
pub fn check(ctx: &ScanContext) -> Result<CheckOutcome> {
    let dir = ctx.brain_dir();
    let mut evidence = EvidenceIndexer::new(ctx.config.evidence.store_snippets);
    let analysis = analyze(ctx, &mut evidence);
    let conventions = conventions::mine(&ctx.snapshot, &mut evidence);
    let synthesized = synthesize(ctx, &analysis, &conventions, &mut evidence);

    let (rules_source, rules, rejected) = match storage::load_rules(&dir)? {
        Some(stored) => (RulesSource::Stored, stored.rules, stored.rejected),
        None => (RulesSource::Synthesized, synthesized, Vec::new()),
    };

    let mut report = rules::check(&rules, &analysis.graphs, &analysis.structure);
    report.skipped_rules.extend(rejected);

    let drift = storage::load_baseline(&dir)?.map(|base| {
        let current = evidence.finish();
        Drift::between(&base, &rules, &current, &analysis.graphs)
    });

    Ok(CheckOutcome {
        rules_source,
        report,
        drift,
    })
}
