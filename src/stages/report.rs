// src/stages/report.rs

use std::collections::BTreeMap;
use std::fmt;

use crate::types::StageKind;

/// Result of one stage execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Succeeded { files_written: usize },
    Failed { error: String },
    /// Never started because `blocked_by` failed earlier in the same run.
    Skipped { blocked_by: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: StageKind,
    pub outcome: StageOutcome,
}

impl StageReport {
    pub fn succeeded(stage: StageKind, files_written: usize) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Succeeded { files_written },
        }
    }

    pub fn failed(stage: StageKind, error: impl fmt::Display) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    pub fn skipped(stage: StageKind, blocked_by: impl Into<String>) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Skipped {
                blocked_by: blocked_by.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, StageOutcome::Succeeded { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StageOutcome::Failed { .. })
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StageOutcome::Succeeded { files_written } => {
                write!(f, "{}: ok ({files_written} file(s) written)", self.stage)
            }
            StageOutcome::Failed { error } => write!(f, "{}: FAILED ({error})", self.stage),
            StageOutcome::Skipped { blocked_by } => {
                write!(f, "{}: skipped (blocked by {blocked_by})", self.stage)
            }
        }
    }
}

/// Every report produced during one invocation, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    reports: Vec<StageReport>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: StageReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Number of reports recorded for `stage`.
    pub fn runs_of(&self, stage: StageKind) -> usize {
        self.reports.iter().filter(|r| r.stage == stage).count()
    }

    /// Stages whose most recent report is not a success.
    ///
    /// A watched stage that failed and later rebuilt cleanly does not count.
    pub fn failed_stages(&self) -> Vec<String> {
        let mut latest: BTreeMap<StageKind, &StageReport> = BTreeMap::new();
        for report in self.reports.iter() {
            latest.insert(report.stage, report);
        }
        latest
            .values()
            .filter(|r| !r.is_success())
            .map(|r| r.stage.task_name().to_string())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_stages().is_empty()
    }
}
