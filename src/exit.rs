// src/exit.rs
//! Standardized process exit codes for `repobrain`.
//!
//! CI integrations depend on `0 / 1 / 2`; do not renumber them.

use std::process::{ExitCode, Termination};

use crate::rules::CheckReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BrainExit {
    /// No violations.
    Clean = 0,
    /// Only soft (warning) violations.
    Warnings = 1,
    /// At least one hard violation.
    HardViolations = 2,
    /// Fatal error (unreadable root, invalid config, unwritable output).
    Error = 3,
}

impl BrainExit {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Maps a check verdict to its exit code.
    #[must_use]
    pub fn from_report(report: &CheckReport) -> Self {
        if report.has_hard_violations() {
            Self::HardViolations
        } else if report.has_warnings() {
            Self::Warnings
        } else {
            Self::Clean
        }
    }
}

impl Termination for BrainExit {
    fn report(self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
