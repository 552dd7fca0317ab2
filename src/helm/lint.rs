//! Structural chart linting.
//!
//! The "lint by helm" phase: verifies that a chart's metadata is sane, its
//! default values parse, and every template renders with the supplied
//! overlay. Convention checks live in [`crate::linter`]; this phase is the
//! only one allowed to fail the whole run.

use std::fmt;
use std::path::Path;

use crate::helm::chart::{Chart, ChartMetadata};
use crate::helm::render::{render, RenderError};
use crate::helm::values::ValueOptions;

/// Severity levels for structural lint messages.
///
/// Ordered from least to most severe: `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational suggestions
    Info,
    /// Important issues that should be addressed
    Warning,
    /// Issues that fail the chart
    Error,
}

impl Severity {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structural lint message, anchored to a chart-relative path.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl fmt::Display for LintMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Result of the structural lint phase for one chart.
#[derive(Debug, Clone, Default)]
pub struct HelmLintResult {
    /// All messages, in emission order.
    pub messages: Vec<LintMessage>,
}

impl HelmLintResult {
    fn push(&mut self, severity: Severity, path: impl Into<String>, message: impl Into<String>) {
        self.messages.push(LintMessage {
            severity,
            path: path.into(),
            message: message.into(),
        });
    }

    /// Check if any message fails the chart.
    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity == Severity::Error)
    }

    /// Check if the chart produced anything worth showing in quiet mode.
    pub fn has_warnings_or_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.severity >= Severity::Warning)
    }
}

/// Run the structural lint for one chart directory with already-resolved
/// metadata (from Chart.yaml, or synthesized from extension.yaml).
pub fn lint_chart(dir: &Path, metadata: ChartMetadata, overlay: &ValueOptions) -> HelmLintResult {
    let mut result = HelmLintResult::default();

    if metadata.name.is_empty() {
        result.push(Severity::Error, "Chart.yaml", "name is required");
    }
    if metadata.version.is_empty() {
        result.push(Severity::Error, "Chart.yaml", "version is required");
    }
    if !metadata.has_valid_api_version() {
        result.push(
            Severity::Error,
            "Chart.yaml",
            "apiVersion is not valid; the value must be either \"v1\" or \"v2\"",
        );
    }
    if metadata.icon.is_none() {
        result.push(Severity::Info, "Chart.yaml", "icon is recommended");
    }

    let is_library = metadata.is_library();
    let chart = match Chart::load_with_metadata(dir, metadata) {
        Ok(chart) => chart,
        Err(e) => {
            result.push(Severity::Error, "values.yaml", e.to_string());
            return result;
        }
    };

    if is_library {
        result.push(
            Severity::Info,
            "templates",
            "library chart: templates are not rendered",
        );
        return result;
    }

    match render(&chart, overlay) {
        Ok(files) => {
            log::debug!(
                "structural lint rendered {} files for {}",
                files.len(),
                dir.display()
            );
        }
        Err(RenderError::Template { name, message }) => {
            result.push(Severity::Error, name, message);
        }
        Err(e) => {
            result.push(Severity::Error, "templates", e.to_string());
        }
    }

    result
}
