//! Global node-selector propagation rule.
//!
//! Injects a sentinel value for `global.nodeSelector` and checks that every
//! workload's pod spec carries it. Walking is soft: a resource whose spec
//! path is absent is skipped, a resource whose spec lacks the sentinel is a
//! violation.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::helm::chart::Chart;
use crate::helm::render::render;
use crate::helm::values::ValueOptions;
use crate::linter::decode::{decode_documents, is_yaml_file};
use crate::linter::rules::{sentinel_token, RuleError, Violation, ViolationsByFile};
use crate::linter::walker;

/// Kinds this rule checks. DaemonSets are deliberately absent: they are
/// expected to run on every node regardless of a global node selector.
pub const KINDS: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "ReplicaSet",
    "Job",
    "Pod",
    "CronJob",
];

/// The node-selector key the platform overrides.
pub const SELECTOR_KEY: &str = "kubernetes.io/os";

/// Run the rule against one chart.
pub fn run(chart: &Chart, overlay: &ValueOptions) -> Result<ViolationsByFile, RuleError> {
    let token = sentinel_token();
    let mut overlay = overlay.clone();
    overlay.json_values.push(format!(
        "global.nodeSelector={{\"{}\": \"{}\"}}",
        SELECTOR_KEY, token
    ));

    let files = render(chart, &overlay)?;
    let mut violations = ViolationsByFile::new();

    for (file, content) in &files {
        if !is_yaml_file(file) {
            continue;
        }
        let mut seen: HashSet<(String, String)> = HashSet::new();
        for resource in decode_documents(file, content)? {
            let Some(kind) = resource.kind() else {
                continue;
            };
            if !KINDS.contains(&kind) {
                continue;
            }
            let Some(path) = walker::target_spec_path(kind) else {
                continue;
            };
            let Some(spec) = walker::lookup(resource.value(), path) else {
                continue;
            };
            if selector_matches(spec, &token) {
                continue;
            }
            let name = resource.name().unwrap_or_default().to_string();
            if seen.insert((kind.to_string(), name.clone())) {
                violations
                    .entry(file.clone())
                    .or_default()
                    .push(Violation::resource(kind, name));
            }
        }
    }

    Ok(violations)
}

fn selector_matches(spec: &Value, token: &str) -> bool {
    spec.get("nodeSelector")
        .and_then(|selector| selector.get(SELECTOR_KEY))
        .and_then(Value::as_str)
        == Some(token)
}
