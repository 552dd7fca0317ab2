//! Resource path walking.
//!
//! One static table maps workload kinds to the nested path of "the pod
//! spec"; a generic walker follows such a path over a decoded resource.
//! Two variants preserve the leniency asymmetry between rules: the soft
//! lookup treats a missing or mistyped segment as "not applicable", the
//! strict lookup reports it as an error.

use serde_yaml::Value;

/// Path to the pod template spec of template-bearing workloads.
const POD_TEMPLATE_SPEC: &[&str] = &["spec", "template", "spec"];
/// A bare pod's spec.
const POD_SPEC: &[&str] = &["spec"];
/// CronJobs nest a job template around the pod template.
const CRON_JOB_SPEC: &[&str] = &["spec", "jobTemplate", "spec", "template", "spec"];

/// Map a resource kind to the path of its pod spec. Kinds with no such
/// concept return `None` and are skipped by the rules.
pub fn target_spec_path(kind: &str) -> Option<&'static [&'static str]> {
    match kind {
        "Deployment" | "StatefulSet" | "DaemonSet" | "ReplicaSet" | "Job" => {
            Some(POD_TEMPLATE_SPEC)
        }
        "Pod" => Some(POD_SPEC),
        "CronJob" => Some(CRON_JOB_SPEC),
        _ => None,
    }
}

/// Soft path lookup: a missing or non-mapping intermediate yields `None`.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = current.get(*segment)?;
    }
    Some(current)
}

/// Strict path lookup: a missing or non-mapping segment is an error naming
/// the deepest path reached.
pub fn lookup_strict<'a>(
    root: &'a Value,
    path: &[&str],
    resource: &str,
) -> Result<&'a Value, WalkError> {
    let mut current = root;
    for (i, segment) in path.iter().enumerate() {
        current = current.get(*segment).ok_or_else(|| WalkError {
            resource: resource.to_string(),
            path: path[..=i].join("."),
        })?;
    }
    Ok(current)
}

/// A strict lookup failed.
#[derive(Debug, Clone)]
pub struct WalkError {
    /// Description of the resource being walked (file + kind/name).
    pub resource: String,
    /// The dotted path up to and including the failing segment.
    pub path: String,
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: missing or invalid field \"{}\"",
            self.resource, self.path
        )
    }
}

impl std::error::Error for WalkError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_kind_table() {
        for kind in ["Deployment", "StatefulSet", "DaemonSet", "ReplicaSet", "Job"] {
            assert_eq!(target_spec_path(kind), Some(POD_TEMPLATE_SPEC));
        }
        assert_eq!(target_spec_path("Pod"), Some(POD_SPEC));
        assert_eq!(target_spec_path("CronJob"), Some(CRON_JOB_SPEC));
        assert_eq!(target_spec_path("Service"), None);
        assert_eq!(target_spec_path("ConfigMap"), None);
    }

    #[test]
    fn test_lookup_deployment_spec() {
        let value = parse(
            r#"
spec:
  template:
    spec:
      nodeSelector:
        kubernetes.io/os: linux
"#,
        );
        let spec = lookup(&value, POD_TEMPLATE_SPEC).unwrap();
        assert!(spec.get("nodeSelector").is_some());
    }

    #[test]
    fn test_lookup_cronjob_spec() {
        let value = parse(
            r#"
spec:
  jobTemplate:
    spec:
      template:
        spec:
          containers:
            - name: task
"#,
        );
        let spec = lookup(&value, CRON_JOB_SPEC).unwrap();
        assert!(spec.get("containers").is_some());
        // The shallow workload path does not apply to CronJobs.
        assert!(lookup(&value, POD_TEMPLATE_SPEC)
            .and_then(|s| s.get("containers"))
            .is_none());
    }

    #[test]
    fn test_soft_lookup_missing_segment() {
        let value = parse("spec:\n  replicas: 1\n");
        assert!(lookup(&value, POD_TEMPLATE_SPEC).is_none());
    }

    #[test]
    fn test_soft_lookup_mistyped_segment() {
        let value = parse("spec:\n  template: \"not a mapping\"\n");
        assert!(lookup(&value, POD_TEMPLATE_SPEC).is_none());
    }

    #[test]
    fn test_strict_lookup_reports_path() {
        let value = parse("spec:\n  replicas: 1\n");
        let err = lookup_strict(&value, POD_TEMPLATE_SPEC, "Deployment/web").unwrap_err();
        assert_eq!(err.path, "spec.template");
        assert!(err.to_string().contains("Deployment/web"));
    }

    #[test]
    fn test_strict_lookup_success() {
        let value = parse("spec:\n  template:\n    spec:\n      containers: []\n");
        assert!(lookup_strict(&value, POD_TEMPLATE_SPEC, "Deployment/web").is_ok());
    }
}
