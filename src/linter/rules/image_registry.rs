//! Global image-registry propagation rule.
//!
//! Injects a sentinel registry and checks that every container and
//! init-container image of every workload embeds it. Unlike the
//! node-selector rule this one assumes well-formed manifests: a workload
//! whose spec path or container entries are malformed fails the rule hard.

use std::collections::HashSet;

use serde_yaml::Value;

use crate::helm::chart::Chart;
use crate::helm::render::render;
use crate::helm::values::ValueOptions;
use crate::linter::decode::{decode_documents, is_yaml_file, Resource};
use crate::linter::rules::{sentinel_token, RuleError, Violation, ViolationsByFile};
use crate::linter::walker::{self, WalkError};

/// Kinds this rule checks. DaemonSets pull images like any other workload,
/// so they are included here even though the node-selector rule skips them.
pub const KINDS: &[&str] = &[
    "Deployment",
    "StatefulSet",
    "DaemonSet",
    "ReplicaSet",
    "Job",
    "Pod",
    "CronJob",
];

/// Run the rule against one chart.
pub fn run(chart: &Chart, overlay: &ValueOptions) -> Result<ViolationsByFile, RuleError> {
    let token = sentinel_token();
    let mut overlay = overlay.clone();
    overlay
        .values
        .push(format!("global.imageRegistry={}", token));

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
            // Safe: every kind in KINDS has a table entry.
            let Some(path) = walker::target_spec_path(kind) else {
                continue;
            };

            let context = resource_context(file, &resource);
            let spec = walker::lookup_strict(resource.value(), path, &context)?;
            let name = resource
                .name()
                .ok_or_else(|| WalkError {
                    resource: context.clone(),
                    path: "metadata.name".to_string(),
                })?
                .to_string();

            let init_containers = scan_containers(spec, "initContainers", &token, &context)?;
            let containers = scan_containers(spec, "containers", &token, &context)?;

            if (!init_containers.is_empty() || !containers.is_empty())
                && seen.insert((kind.to_string(), name.clone()))
            {
                violations.entry(file.clone()).or_default().push(
                    Violation::containers(kind, name, init_containers, containers),
                );
            }
        }
    }

    Ok(violations)
}

fn resource_context(file: &str, resource: &Resource) -> String {
    format!(
        "{}: {}/{}",
        file,
        resource.kind().unwrap_or("?"),
        resource.name().unwrap_or("?")
    )
}

/// Collect the names of containers under `field` whose image does not
/// embed the sentinel. An absent list is fine; a present entry without a
/// string image (or, for an offender, without a string name) is fatal.
fn scan_containers(
    spec: &Value,
    field: &str,
    token: &str,
    context: &str,
) -> Result<Vec<String>, RuleError> {
    let Some(list) = spec.get(field).and_then(Value::as_sequence) else {
        return Ok(Vec::new());
    };

    let mut offending = Vec::new();
    for (i, container) in list.iter().enumerate() {
        let image = container
            .get("image")
            .and_then(Value::as_str)
            .ok_or_else(|| WalkError {
                resource: context.to_string(),
                path: format!("{}[{}].image", field, i),
            })?;
        if !image.contains(token) {
            let name = container
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| WalkError {
                    resource: context.to_string(),
                    path: format!("{}[{}].name", field, i),
                })?;
            offending.push(name.to_string());
        }
    }
    Ok(offending)
}
