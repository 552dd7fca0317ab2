//! Value overlay merging.
//!
//! Implements the helm-style precedence chain: values files first (in
//! order), then `--set`, `--set-string`, `--set-file`, and `--set-json`,
//! with later mechanisms and later entries overriding earlier ones.

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};

/// An ordered value overlay, one list per assignment mechanism.
#[derive(Debug, Clone, Default)]
pub struct ValueOptions {
    /// Values files (`-f`/`--values`), lowest precedence.
    pub value_files: Vec<PathBuf>,
    /// `--set` assignments; scalars are coerced (null/bool/int).
    pub values: Vec<String>,
    /// `--set-string` assignments; values stay strings.
    pub string_values: Vec<String>,
    /// `--set-file` assignments; the value is read from a file.
    pub file_values: Vec<String>,
    /// `--set-json` assignments; the value is a JSON fragment. Highest
    /// precedence.
    pub json_values: Vec<String>,
}

impl ValueOptions {
    /// Merge all mechanisms into a single mapping.
    pub fn merge(&self) -> Result<Mapping, ValuesError> {
        let mut base = Mapping::new();

        for file in &self.value_files {
            let content = std::fs::read_to_string(file).map_err(|e| {
                ValuesError::Io(format!("failed to read {}: {}", file.display(), e))
            })?;
            let doc: Value = serde_yaml::from_str(&content)
                .map_err(|e| ValuesError::Parse(format!("{}: {}", file.display(), e)))?;
            match doc {
                Value::Null => {}
                Value::Mapping(mapping) => merge_maps(&mut base, mapping),
                _ => {
                    return Err(ValuesError::NotAMapping(file.display().to_string()));
                }
            }
        }

        for entry in &self.values {
            for part in split_assignments(entry) {
                let (path, raw) = split_assignment(&part)?;
                set_path(&mut base, path, coerce_scalar(raw))?;
            }
        }

        for entry in &self.string_values {
            for part in split_assignments(entry) {
                let (path, raw) = split_assignment(&part)?;
                set_path(&mut base, path, Value::String(raw.to_string()))?;
            }
        }

        for entry in &self.file_values {
            let (path, file) = split_assignment(entry)?;
            let content = std::fs::read_to_string(file)
                .map_err(|e| ValuesError::Io(format!("failed to read {}: {}", file, e)))?;
            set_path(&mut base, path, Value::String(content))?;
        }

        for entry in &self.json_values {
            let (path, raw) = split_assignment(entry)?;
            let json: serde_json::Value = serde_json::from_str(raw)
                .map_err(|e| ValuesError::Parse(format!("{}: {}", path, e)))?;
            let value =
                serde_yaml::to_value(json).map_err(|e| ValuesError::Parse(e.to_string()))?;
            set_path(&mut base, path, value)?;
        }

        log::debug!("merged value overlay with {} top-level keys", base.len());
        Ok(base)
    }
}

/// Merge `overlay` into `base`; mappings merge recursively, everything else
/// is replaced by the overlay.
pub(crate) fn merge_maps(base: &mut Mapping, overlay: Mapping) {
    for (key, value) in overlay {
        let nested = matches!(base.get(&key), Some(Value::Mapping(_)));
        match value {
            Value::Mapping(incoming) if nested => {
                if let Some(Value::Mapping(existing)) = base.get_mut(&key) {
                    merge_maps(existing, incoming);
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Set a dotted path to a value, creating intermediate mappings. An
/// existing non-mapping intermediate is replaced.
fn set_path(map: &mut Mapping, path: &str, value: Value) -> Result<(), ValuesError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ValuesError::InvalidAssignment(path.to_string()));
    }

    let mut current = map;
    for segment in &segments[..segments.len() - 1] {
        let key = Value::String((*segment).to_string());
        if !matches!(current.get(&key), Some(Value::Mapping(_))) {
            current.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        let Some(Value::Mapping(next)) = current.get_mut(&key) else {
            return Err(ValuesError::InvalidAssignment(path.to_string()));
        };
        current = next;
    }
    current.insert(
        Value::String(segments[segments.len() - 1].to_string()),
        value,
    );
    Ok(())
}

/// Split a `--set` style entry on top-level commas. Commas inside quotes,
/// braces, or brackets are literal.
fn split_assignments(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_quotes = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '{' | '[' if !in_quotes => {
                depth += 1;
                current.push(c);
            }
            '}' | ']' if !in_quotes => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 && !in_quotes => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn split_assignment(entry: &str) -> Result<(&str, &str), ValuesError> {
    entry
        .split_once('=')
        .ok_or_else(|| ValuesError::InvalidAssignment(entry.to_string()))
}

/// Coerce a `--set` scalar: null, bool, and integer literals keep their
/// type; anything else stays a string.
fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "" | "null" | "~" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

/// Value merging errors.
#[derive(Debug, Clone)]
pub enum ValuesError {
    /// I/O error reading a values file.
    Io(String),
    /// A values file or fragment failed to parse.
    Parse(String),
    /// An assignment is not of the form `path=value`.
    InvalidAssignment(String),
    /// A values file does not contain a top-level mapping.
    NotAMapping(String),
}

impl std::fmt::Display for ValuesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "values I/O error: {}", msg),
            Self::Parse(msg) => write!(f, "values parse error: {}", msg),
            Self::InvalidAssignment(entry) => {
                write!(f, "invalid value assignment {:?}: expected path=value", entry)
            }
            Self::NotAMapping(file) => {
                write!(f, "values file {} must contain a top-level mapping", file)
            }
        }
    }
}

impl std::error::Error for ValuesError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn get<'a>(map: &'a Mapping, path: &str) -> Option<&'a Value> {
        let mut current: Option<&Value> = None;
        for (i, segment) in path.split('.').enumerate() {
            current = if i == 0 {
                map.get(Value::String(segment.to_string()))
            } else {
                current?.get(segment)
            };
        }
        current
    }

    #[test]
    fn test_set_values_create_nested_paths() {
        let options = ValueOptions {
            values: vec!["image.repository=nginx".to_string()],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(
            get(&merged, "image.repository").and_then(|v| v.as_str()),
            Some("nginx")
        );
    }

    #[test]
    fn test_set_coercion() {
        let options = ValueOptions {
            values: vec![
                "replicas=3,enabled=true,label=web".to_string(),
                "optional=null".to_string(),
            ],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(get(&merged, "replicas").and_then(|v| v.as_i64()), Some(3));
        assert_eq!(get(&merged, "enabled").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(get(&merged, "label").and_then(|v| v.as_str()), Some("web"));
        assert!(get(&merged, "optional").map(|v| v.is_null()).unwrap_or(false));
    }

    #[test]
    fn test_set_string_keeps_strings() {
        let options = ValueOptions {
            string_values: vec!["port=8080".to_string()],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(get(&merged, "port").and_then(|v| v.as_str()), Some("8080"));
    }

    #[test]
    fn test_json_values_override_everything() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("values.yaml");
        fs::write(&file, "global:\n  registry: docker.io\n").unwrap();

        let options = ValueOptions {
            value_files: vec![file],
            values: vec!["global.registry=quay.io".to_string()],
            json_values: vec![r#"global.registry="ghcr.io""#.to_string()],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(
            get(&merged, "global.registry").and_then(|v| v.as_str()),
            Some("ghcr.io")
        );
    }

    #[test]
    fn test_json_fragment_with_dotted_key() {
        let options = ValueOptions {
            json_values: vec![
                r#"global.nodeSelector={"kubernetes.io/os": "linux"}"#.to_string(),
            ],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        let selector = get(&merged, "global.nodeSelector")
            .and_then(|v| v.as_mapping())
            .unwrap();
        assert_eq!(
            selector
                .get(Value::String("kubernetes.io/os".to_string()))
                .and_then(|v| v.as_str()),
            Some("linux")
        );
    }

    #[test]
    fn test_commas_inside_braces_are_literal() {
        let parts = split_assignments(r#"a={"x": 1, "y": 2},b=2"#);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], r#"a={"x": 1, "y": 2}"#);
        assert_eq!(parts[1], "b=2");
    }

    #[test]
    fn test_set_file_reads_content() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("banner.txt");
        fs::write(&file, "hello").unwrap();

        let options = ValueOptions {
            file_values: vec![format!("motd={}", file.display())],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(get(&merged, "motd").and_then(|v| v.as_str()), Some("hello"));
    }

    #[test]
    fn test_later_files_override_earlier() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.yaml");
        let second = temp_dir.path().join("b.yaml");
        fs::write(&first, "image:\n  tag: \"1.0\"\n  pullPolicy: Always\n").unwrap();
        fs::write(&second, "image:\n  tag: \"2.0\"\n").unwrap();

        let options = ValueOptions {
            value_files: vec![first, second],
            ..Default::default()
        };
        let merged = options.merge().unwrap();
        assert_eq!(get(&merged, "image.tag").and_then(|v| v.as_str()), Some("2.0"));
        assert_eq!(
            get(&merged, "image.pullPolicy").and_then(|v| v.as_str()),
            Some("Always")
        );
    }

    #[test]
    fn test_invalid_assignment() {
        let options = ValueOptions {
            values: vec!["no-equals-sign".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            options.merge(),
            Err(ValuesError::InvalidAssignment(_))
        ));
    }
}
