//! Convention linting core.
//!
//! Aggregates the convention rules: each rule renders the chart with its
//! own sentinel injection and returns a structured outcome; outcomes are
//! formatted separately by [`report`]. Rules run in a fixed order and are
//! advisory — only the structural phase in [`crate::helm::lint`] can fail
//! the process.

pub mod decode;
pub mod report;
pub mod rules;
pub mod walker;

use crate::extension::Metadata;
use crate::helm::chart::Chart;
use crate::helm::values::ValueOptions;
use rules::{RuleError, RuleOutcome, RuleReport, ViolationsByFile};

/// The collected outcomes of one convention lint run.
#[derive(Debug, Clone)]
pub struct ConventionReport {
    /// The extension under lint.
    pub extension: String,
    /// Rule outcomes in execution order.
    pub sections: Vec<RuleReport>,
}

impl ConventionReport {
    /// Check whether any rule produced a finding.
    pub fn has_findings(&self) -> bool {
        self.sections.iter().any(|s| !s.outcome.is_pass())
    }
}

/// Run every convention rule against one extension. A rule that fails to
/// run is recorded as failed; the remaining rules still execute, each on
/// its own copy of the overlay.
pub fn run_conventions(
    chart: &Chart,
    metadata: &Metadata,
    overlay: &ValueOptions,
) -> ConventionReport {
    let mut sections = Vec::new();

    let reasons = rules::name::validate_name(&metadata.name);
    sections.push(RuleReport {
        rule: "name",
        outcome: if reasons.is_empty() {
            RuleOutcome::Pass
        } else {
            RuleOutcome::NameInvalid {
                name: metadata.name.clone(),
                reasons,
            }
        },
    });

    let outcome = if metadata.images.is_empty() {
        RuleOutcome::NoImages
    } else {
        match rules::images::run(chart, &metadata.images, overlay) {
            Ok(missing) if missing.is_empty() => RuleOutcome::Pass,
            Ok(missing) => RuleOutcome::ImagesMissing { missing },
            Err(e) => RuleOutcome::Failed {
                error: e.to_string(),
            },
        }
    };
    sections.push(RuleReport {
        rule: "images",
        outcome,
    });

    sections.push(RuleReport {
        rule: "global.imageRegistry",
        outcome: propagation_outcome(
            "global.imageRegistry",
            rules::image_registry::run(chart, overlay),
        ),
    });

    sections.push(RuleReport {
        rule: "global.nodeSelector",
        outcome: propagation_outcome(
            "global.nodeSelector",
            rules::node_selector::run(chart, overlay),
        ),
    });

    ConventionReport {
        extension: metadata.name.clone(),
        sections,
    }
}

fn propagation_outcome(
    setting: &'static str,
    result: Result<ViolationsByFile, RuleError>,
) -> RuleOutcome {
    match result {
        Ok(violations) if violations.is_empty() => RuleOutcome::Pass,
        Ok(violations) => RuleOutcome::Propagation {
            setting,
            violations,
        },
        Err(e) => RuleOutcome::Failed {
            error: e.to_string(),
        },
    }
}
