//! Per-artifact verdicts and the run summary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of checking one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    PassedWithWarnings,
    Failed,
    FailedDueToWarnings,
}

impl Verdict {
    /// Derive the verdict from the render outcome.
    ///
    /// Strict mode only turns a warning-bearing pass into a failure; it
    /// never changes a render failure or a clean pass.
    pub fn classify(rendered: bool, has_warnings: bool, strict: bool) -> Self {
        match (rendered, has_warnings) {
            (false, _) => Self::Failed,
            (true, false) => Self::Passed,
            (true, true) if strict => Self::FailedDueToWarnings,
            (true, true) => Self::PassedWithWarnings,
        }
    }

    /// Status text printed on the report line.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::PassedWithWarnings => "PASSED with warnings",
            Self::Failed => "FAILED",
            Self::FailedDueToWarnings => "FAILED due to warnings",
        }
    }

    /// Whether this verdict makes the run fail.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::FailedDueToWarnings)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

/// Result for one artifact, as reported in the JSON summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub path: String,
    pub verdict: Verdict,
    /// Warning messages logged for this artifact, in order.
    pub warnings: Vec<String>,
    /// Renderer diagnostics, when the description failed to render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a whole check run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub created_at: DateTime<Utc>,
    pub strict: bool,
    pub index_name: String,
    /// True if any artifact has a failing verdict, or there was nothing to
    /// check.
    pub failed: bool,
    pub artifacts: Vec<ArtifactReport>,
}

impl RunSummary {
    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
