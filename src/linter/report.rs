//! Report formatting.
//!
//! Rules return structured outcomes; this module is the only place that
//! turns them into text. Keeping the two apart lets rule logic be tested
//! without capturing output.

use std::fmt;

use colored::Colorize;

use crate::linter::rules::{RuleOutcome, Severity, Violation};
use crate::linter::ConventionReport;

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Resource: {{kind: {}, name: {} }}", self.kind, self.name)?;
        if !self.init_containers.is_empty() || !self.containers.is_empty() {
            write!(
                f,
                " InitContainer: [ {} ] Container: [ {} ]",
                self.init_containers.join(", "),
                self.containers.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Format a convention report for the terminal.
pub fn format_report(report: &ConventionReport) -> String {
    let mut out = String::new();

    for section in &report.sections {
        out.push_str(&format!("\nInfo: lint {}\n", section.rule));
        match &section.outcome {
            RuleOutcome::Pass => {}
            RuleOutcome::NameInvalid { name, reasons } => {
                out.push_str(&format!(
                    "{}: extension name \"{}\" is invalid:\n  error: {}\n",
                    tag(Severity::Error),
                    name,
                    reasons.join("\n  error: ")
                ));
            }
            RuleOutcome::NoImages => {
                out.push_str(&format!(
                    "{}: extension {} has no images\n",
                    tag(Severity::Warning),
                    report.extension
                ));
            }
            RuleOutcome::ImagesMissing { missing } => {
                for image in missing {
                    out.push_str(&format!(
                        "{}: image {} not found in rendered templates\n",
                        tag(Severity::Warning),
                        image
                    ));
                }
            }
            RuleOutcome::Propagation {
                setting,
                violations,
            } => {
                out.push_str(&format!(
                    "{}: {} doesn't work in \"{}\"\n",
                    tag(Severity::Error),
                    setting,
                    report.extension
                ));
                for (file, entries) in violations {
                    let lines = entries
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join("\n    ");
                    out.push_str(&format!("  File \"{}\":\n    {}\n", file, lines));
                }
            }
            RuleOutcome::Failed { error } => {
                out.push_str(&format!(
                    "{}: lint {} failed: {}\n",
                    tag(Severity::Error),
                    section.rule,
                    error
                ));
            }
        }
    }

    out
}

fn tag(severity: Severity) -> colored::ColoredString {
    match severity {
        Severity::Error => severity.as_str().red(),
        Severity::Warning => severity.as_str().yellow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::rules::{RuleReport, ViolationsByFile};

    fn report(sections: Vec<RuleReport>) -> ConventionReport {
        ConventionReport {
            extension: "sample".to_string(),
            sections,
        }
    }

    #[test]
    fn test_violation_display_resource_only() {
        let violation = Violation::resource("Deployment", "web");
        assert_eq!(
            violation.to_string(),
            "Resource: {kind: Deployment, name: web }"
        );
    }

    #[test]
    fn test_violation_display_with_containers() {
        let violation = Violation::containers(
            "Deployment",
            "web",
            vec!["setup".to_string()],
            vec!["app".to_string(), "sidecar".to_string()],
        );
        assert_eq!(
            violation.to_string(),
            "Resource: {kind: Deployment, name: web } InitContainer: [ setup ] Container: [ app, sidecar ]"
        );
    }

    #[test]
    fn test_pass_sections_print_headers_only() {
        colored::control::set_override(false);
        let text = format_report(&report(vec![
            RuleReport {
                rule: "name",
                outcome: RuleOutcome::Pass,
            },
            RuleReport {
                rule: "images",
                outcome: RuleOutcome::Pass,
            },
        ]));
        assert_eq!(text, "\nInfo: lint name\n\nInfo: lint images\n");
    }

    #[test]
    fn test_propagation_groups_by_file() {
        colored::control::set_override(false);
        let mut violations = ViolationsByFile::new();
        violations.insert(
            "templates/a.yaml".to_string(),
            vec![
                Violation::resource("Deployment", "one"),
                Violation::resource("StatefulSet", "two"),
            ],
        );
        let text = format_report(&report(vec![RuleReport {
            rule: "global.nodeSelector",
            outcome: RuleOutcome::Propagation {
                setting: "global.nodeSelector",
                violations,
            },
        }]));
        assert!(text.contains("ERROR: global.nodeSelector doesn't work in \"sample\""));
        assert!(text.contains("  File \"templates/a.yaml\":"));
        assert!(text.contains("    Resource: {kind: Deployment, name: one }"));
        assert!(text.contains("\n    Resource: {kind: StatefulSet, name: two }"));
    }

    #[test]
    fn test_name_errors_listed_individually() {
        colored::control::set_override(false);
        let text = format_report(&report(vec![RuleReport {
            rule: "name",
            outcome: RuleOutcome::NameInvalid {
                name: "My_Extension".to_string(),
                reasons: vec!["reason one".to_string(), "reason two".to_string()],
            },
        }]));
        assert!(text.contains("extension name \"My_Extension\" is invalid:"));
        assert!(text.contains("  error: reason one"));
        assert!(text.contains("  error: reason two"));
    }

    #[test]
    fn test_rule_failure_is_reported_not_silent() {
        colored::control::set_override(false);
        let text = format_report(&report(vec![RuleReport {
            rule: "global.imageRegistry",
            outcome: RuleOutcome::Failed {
                error: "failed to render templates/bad.yaml".to_string(),
            },
        }]));
        assert!(text.contains("ERROR: lint global.imageRegistry failed:"));
    }
}
