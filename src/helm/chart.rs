//! Chart metadata and chart loading.
//!
//! Parses `Chart.yaml` metadata and collects a chart directory's default
//! values and template files into an in-memory [`Chart`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Chart API version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// Legacy (v1) charts
    V1,
    /// Current (v2) charts
    #[default]
    V2,
    /// Unknown/invalid version
    Unknown(String),
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "v1" => ApiVersion::V1,
            "v2" => ApiVersion::V2,
            other => ApiVersion::Unknown(other.to_string()),
        })
    }
}

impl Serialize for ApiVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ApiVersion::V1 => serializer.serialize_str("v1"),
            ApiVersion::V2 => serializer.serialize_str("v2"),
            ApiVersion::Unknown(s) => serializer.serialize_str(s),
        }
    }
}

/// Chart type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Standard application chart
    #[default]
    Application,
    /// Library chart (no templates rendered directly)
    Library,
}

/// Parsed Chart.yaml metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartMetadata {
    /// The chart API version (v1 or v2)
    #[serde(rename = "apiVersion", default)]
    pub api_version: ApiVersion,

    /// The name of the chart
    pub name: String,

    /// A SemVer 2 version
    pub version: String,

    /// Kubernetes version constraint
    #[serde(rename = "kubeVersion")]
    pub kube_version: Option<String>,

    /// A single-sentence description of this project
    pub description: Option<String>,

    /// The type of the chart (application or library)
    #[serde(rename = "type")]
    pub chart_type: Option<ChartType>,

    /// A list of keywords about this project
    #[serde(default)]
    pub keywords: Vec<String>,

    /// The URL of this projects home page
    pub home: Option<String>,

    /// A list of URLs to source code for this project
    #[serde(default)]
    pub sources: Vec<String>,

    /// A URL to an SVG or PNG image to be used as an icon
    pub icon: Option<String>,

    /// The version of the app that this contains
    #[serde(rename = "appVersion")]
    pub app_version: Option<String>,
}

impl ChartMetadata {
    /// Check if the chart has a valid API version.
    pub fn has_valid_api_version(&self) -> bool {
        matches!(self.api_version, ApiVersion::V1 | ApiVersion::V2)
    }

    /// Check if this is a library chart.
    pub fn is_library(&self) -> bool {
        matches!(self.chart_type, Some(ChartType::Library))
    }
}

/// One file under the chart's `templates/` directory.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Path relative to the chart root, e.g. `templates/deployment.yaml`
    pub name: String,
    /// Raw template text
    pub content: String,
}

/// A chart loaded into memory: metadata, default values, and templates.
#[derive(Debug, Clone)]
pub struct Chart {
    /// The chart root directory.
    pub root: PathBuf,
    /// Chart metadata, from Chart.yaml or synthesized from extension.yaml.
    pub metadata: ChartMetadata,
    /// Default values from values.yaml (empty mapping when absent).
    pub values: serde_yaml::Value,
    /// All template files, sorted by relative path.
    pub templates: Vec<TemplateFile>,
}

impl Chart {
    /// Load a chart whose metadata comes from `Chart.yaml` in `dir`.
    pub fn load(dir: &Path) -> Result<Self, ChartError> {
        let chart_yaml = dir.join("Chart.yaml");
        if !chart_yaml.exists() {
            return Err(ChartError::MissingMetadata(dir.display().to_string()));
        }
        let metadata = parse_chart_yaml_file(&chart_yaml)?;
        Self::load_with_metadata(dir, metadata)
    }

    /// Load a chart with externally supplied metadata (extension directories
    /// without a Chart.yaml carry their identity in extension.yaml instead).
    pub fn load_with_metadata(dir: &Path, metadata: ChartMetadata) -> Result<Self, ChartError> {
        let values_yaml = dir.join("values.yaml");
        let values = if values_yaml.exists() {
            let content = std::fs::read_to_string(&values_yaml)
                .map_err(|e| ChartError::Io(format!("failed to read values.yaml: {}", e)))?;
            serde_yaml::from_str(&content).map_err(|e| ChartError::Parse {
                file: "values.yaml".to_string(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
        };

        let templates = collect_templates(dir)?;

        Ok(Self {
            root: dir.to_path_buf(),
            metadata,
            values,
            templates,
        })
    }
}

/// Collect all template files under `dir/templates`, names relative to the
/// chart root with forward slashes.
fn collect_templates(dir: &Path) -> Result<Vec<TemplateFile>, ChartError> {
    let templates_dir = dir.join("templates");
    let mut templates = Vec::new();

    if !templates_dir.is_dir() {
        return Ok(templates);
    }

    for entry in walkdir::WalkDir::new(&templates_dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let file_path = entry.path();
        if !file_path.is_file() {
            continue;
        }

        let extension = file_path.extension().and_then(|e| e.to_str());
        if !matches!(extension, Some("yaml") | Some("yml") | Some("tpl") | Some("txt")) {
            continue;
        }

        let relative = file_path
            .strip_prefix(dir)
            .unwrap_or(file_path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        match std::fs::read_to_string(file_path) {
            Ok(content) => templates.push(TemplateFile {
                name: relative,
                content,
            }),
            Err(e) => {
                log::warn!("skipping unreadable template {}: {}", relative, e);
            }
        }
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}

/// Parse Chart.yaml content.
pub fn parse_chart_yaml(content: &str) -> Result<ChartMetadata, ChartError> {
    serde_yaml::from_str(content).map_err(|e| ChartError::Parse {
        file: "Chart.yaml".to_string(),
        message: e.to_string(),
    })
}

/// Parse Chart.yaml from a file path.
pub fn parse_chart_yaml_file(path: &Path) -> Result<ChartMetadata, ChartError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ChartError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    parse_chart_yaml(&content)
}

/// Chart loading errors.
#[derive(Debug, Clone)]
pub enum ChartError {
    /// Neither Chart.yaml nor supplied metadata is available.
    MissingMetadata(String),
    /// I/O error reading chart files.
    Io(String),
    /// A chart file failed to parse.
    Parse { file: String, message: String },
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingMetadata(dir) => {
                write!(f, "no Chart.yaml found in {}", dir)
            }
            Self::Io(msg) => write!(f, "chart I/O error: {}", msg),
            Self::Parse { file, message } => write!(f, "{}: {}", file, message),
        }
    }
}

impl std::error::Error for ChartError {}
