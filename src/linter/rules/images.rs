//! Declared-image presence rule.
//!
//! Every image an extension declares should appear somewhere in its
//! rendered manifests. Registry-implicit references are accepted: a
//! declared `docker.io/library/nginx:1.25` matches a rendered `nginx:1.25`.

use crate::helm::chart::Chart;
use crate::helm::render::render;
use crate::helm::values::ValueOptions;
use crate::linter::decode::is_yaml_file;
use crate::linter::rules::RuleError;

/// Run the rule: render with the unmodified overlay and return the
/// declared images found in no rendered file. Scanning for one image stops
/// at its first match.
pub fn run(
    chart: &Chart,
    images: &[String],
    overlay: &ValueOptions,
) -> Result<Vec<String>, RuleError> {
    let files = render(chart, overlay)?;

    let mut missing = Vec::new();
    for image in images {
        let found = files
            .iter()
            .filter(|(name, _)| is_yaml_file(name))
            .any(|(_, content)| content_mentions(content, image));
        if !found {
            missing.push(image.clone());
        }
    }

    Ok(missing)
}

fn content_mentions(content: &str, image: &str) -> bool {
    if content.contains(image) {
        return true;
    }
    if let Some(rest) = image.strip_prefix("docker.io/") {
        if content.contains(rest) {
            return true;
        }
    }
    if let Some(rest) = image.strip_prefix("docker.io/library/") {
        if content.contains(rest) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_chart(dir: &Path, pod: &str) {
        fs::create_dir_all(dir.join("templates")).unwrap();
        fs::write(
            dir.join("Chart.yaml"),
            "apiVersion: v2\nname: sample\nversion: 0.1.0\n",
        )
        .unwrap();
        fs::write(dir.join("templates/pod.yaml"), pod).unwrap();
    }

    fn pod_with_image(image: &str) -> String {
        format!(
            concat!(
                "apiVersion: v1\n",
                "kind: Pod\n",
                "metadata:\n",
                "  name: p\n",
                "spec:\n",
                "  containers:\n",
                "    - name: main\n",
                "      image: {}\n",
            ),
            image
        )
    }

    #[test]
    fn test_exact_reference_found() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path(), &pod_with_image("quay.io/app/api:1.0"));
        let chart = Chart::load(temp_dir.path()).unwrap();

        let missing = run(
            &chart,
            &["quay.io/app/api:1.0".to_string()],
            &ValueOptions::default(),
        )
        .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_library_prefix_elision() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path(), &pod_with_image("nginx:1.25"));
        let chart = Chart::load(temp_dir.path()).unwrap();

        let missing = run(
            &chart,
            &["docker.io/library/nginx:1.25".to_string()],
            &ValueOptions::default(),
        )
        .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_registry_prefix_elision() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path(), &pod_with_image("grafana/grafana:10.0.0"));
        let chart = Chart::load(temp_dir.path()).unwrap();

        let missing = run(
            &chart,
            &["docker.io/grafana/grafana:10.0.0".to_string()],
            &ValueOptions::default(),
        )
        .unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_absent_image_reported() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path(), &pod_with_image("nginx:1.25"));
        let chart = Chart::load(temp_dir.path()).unwrap();

        let missing = run(
            &chart,
            &[
                "docker.io/library/nginx:1.25".to_string(),
                "redis:7.2".to_string(),
            ],
            &ValueOptions::default(),
        )
        .unwrap();
        assert_eq!(missing, vec!["redis:7.2"]);
    }

    #[test]
    fn test_non_yaml_files_not_scanned() {
        let temp_dir = TempDir::new().unwrap();
        write_chart(temp_dir.path(), &pod_with_image("nginx:1.25"));
        fs::write(
            temp_dir.path().join("templates/NOTES.txt"),
            "mentions redis:7.2 in prose\n",
        )
        .unwrap();
        let chart = Chart::load(temp_dir.path()).unwrap();

        let missing = run(&chart, &["redis:7.2".to_string()], &ValueOptions::default()).unwrap();
        assert_eq!(missing, vec!["redis:7.2"]);
    }
}
