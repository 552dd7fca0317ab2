//! Manifest rendering.
//!
//! Renders a chart's templates through one `tera` engine instance with a
//! synthesized context: chart metadata, a capabilities descriptor, a
//! placeholder release identity (no real release exists at lint time), and
//! the merged values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tera::Tera;

use crate::helm::chart::Chart;
use crate::helm::values::{merge_maps, ValueOptions, ValuesError};

/// The release identity visible to templates during linting.
#[derive(Debug, Clone, Serialize)]
pub struct Release {
    pub name: String,
    pub namespace: String,
    pub revision: u32,
    pub service: String,
}

impl Release {
    /// The placeholder identity used for lint-time renders.
    pub fn placeholder() -> Self {
        Self {
            name: "undefined".to_string(),
            namespace: "undefined".to_string(),
            revision: 1,
            service: "extlint".to_string(),
        }
    }
}

/// Kubernetes version descriptor exposed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct KubeVersion {
    pub version: String,
    pub major: String,
    pub minor: String,
}

/// Cluster capabilities descriptor exposed to templates.
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub kube_version: KubeVersion,
    pub api_versions: Vec<String>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            kube_version: KubeVersion {
                version: "v1.33.0".to_string(),
                major: "1".to_string(),
                minor: "33".to_string(),
            },
            api_versions: vec![
                "v1".to_string(),
                "apps/v1".to_string(),
                "batch/v1".to_string(),
                "networking.k8s.io/v1".to_string(),
                "rbac.authorization.k8s.io/v1".to_string(),
            ],
        }
    }
}

/// Render every template of `chart` with `overlay` merged over the chart's
/// default values. Returns rendered text keyed by the template's path
/// relative to the chart root. Partials (file name starting with `_`) are
/// registered for includes/macros but produce no output file.
pub fn render(
    chart: &Chart,
    overlay: &ValueOptions,
) -> Result<BTreeMap<String, String>, RenderError> {
    let overlay_map = overlay.merge().map_err(RenderError::Values)?;

    let mut values = match chart.values.clone() {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => {
            return Err(RenderError::Engine(
                "chart values.yaml must contain a mapping".to_string(),
            ));
        }
    };
    merge_maps(&mut values, overlay_map);

    let mut engine = Tera::default();
    engine
        .add_raw_templates(
            chart
                .templates
                .iter()
                .map(|t| (t.name.as_str(), t.content.as_str()))
                .collect::<Vec<_>>(),
        )
        .map_err(|e| RenderError::Engine(error_chain(&e)))?;

    let engine_err = |e: tera::Error| RenderError::Engine(error_chain(&e));
    let mut context = tera::Context::new();
    context.try_insert("chart", &chart.metadata).map_err(engine_err)?;
    context
        .try_insert("release", &Release::placeholder())
        .map_err(engine_err)?;
    context
        .try_insert("capabilities", &Capabilities::default())
        .map_err(engine_err)?;
    context
        .try_insert("values", &Value::Mapping(values))
        .map_err(engine_err)?;

    let mut rendered = BTreeMap::new();
    for template in &chart.templates {
        if is_partial(&template.name) {
            continue;
        }
        let output = engine
            .render(&template.name, &context)
            .map_err(|e| RenderError::Template {
                name: template.name.clone(),
                message: error_chain(&e),
            })?;
        rendered.insert(template.name.clone(), output);
    }

    log::debug!(
        "rendered {} of {} templates from {}",
        rendered.len(),
        chart.templates.len(),
        chart.root.display()
    );
    Ok(rendered)
}

fn is_partial(name: &str) -> bool {
    name.rsplit('/')
        .next()
        .map_or(false, |base| base.starts_with('_'))
}

/// Flatten a tera error and its source chain into one line, so template
/// failures surface verbatim instead of as "failed to render".
fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}

/// Rendering errors.
#[derive(Debug, Clone)]
pub enum RenderError {
    /// The value overlay could not be merged.
    Values(ValuesError),
    /// Template registration or context construction failed.
    Engine(String),
    /// A template failed to render.
    Template { name: String, message: String },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Values(e) => write!(f, "{}", e),
            Self::Engine(msg) => write!(f, "template engine error: {}", msg),
            Self::Template { name, message } => {
                write!(f, "failed to render {}: {}", name, message)
            }
        }
    }
}

impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_chart(dir: &Path) {
        fs::create_dir_all(dir.join("templates")).unwrap();
        fs::write(
            dir.join("Chart.yaml"),
            "apiVersion: v2\nname: sample\nversion: 0.1.0\n",
        )
        .unwrap();
        fs::write(
            dir.join("values.yaml"),
            "replicaCount: 1\nimage:\n  repository: nginx\n  tag: \"1.25\"\n",
        )
        .unwrap();
        fs::write(
            dir.join("templates/deployment.yaml"),
            concat!(
                "apiVersion: apps/v1\n",
                "kind: Deployment\n",
                "metadata:\n",
                "  name: {{ release.name }}-web\n",
                "spec:\n",
                "  replicas: {{ values.replicaCount }}\n",
                "  template:\n",
                "    spec:\n",
                "      containers:\n",
                "        - name: web\n",
                "          image: {{ values.image.repository }}:{{ values.image.tag }}\n",
            ),
        )
        .unwrap();
        fs::write(dir.join("templates/_helpers.tpl"), "{# partials only #}\n").unwrap();
    }

    #[test]
    fn test_render_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path());
        let chart = Chart::load(temp_dir.path()).unwrap();

        let rendered = render(&chart, &ValueOptions::default()).unwrap();
        let deployment = &rendered["templates/deployment.yaml"];
        assert!(deployment.contains("name: undefined-web"));
        assert!(deployment.contains("replicas: 1"));
        assert!(deployment.contains("image: nginx:1.25"));
        assert!(!rendered.contains_key("templates/_helpers.tpl"));
    }

    #[test]
    fn test_overlay_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path());
        let chart = Chart::load(temp_dir.path()).unwrap();

        let overlay = ValueOptions {
            values: vec!["replicaCount=5".to_string()],
            string_values: vec!["image.tag=2.0".to_string()],
            ..Default::default()
        };
        let rendered = render(&chart, &overlay).unwrap();
        let deployment = &rendered["templates/deployment.yaml"];
        assert!(deployment.contains("replicas: 5"));
        assert!(deployment.contains("image: nginx:2.0"));
    }

    #[test]
    fn test_render_error_names_template() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path());
        fs::write(
            temp_dir.path().join("templates/broken.yaml"),
            "value: {{ values.missing.key }}\n",
        )
        .unwrap();
        let chart = Chart::load(temp_dir.path()).unwrap();

        let err = render(&chart, &ValueOptions::default()).unwrap_err();
        match err {
            RenderError::Template { name, .. } => {
                assert_eq!(name, "templates/broken.yaml");
            }
            other => panic!("expected template error, got {}", other),
        }
    }
}
