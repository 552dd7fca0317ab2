//! extension.yaml parsing.
//!
//! An extension directory carries its identity in `extension.yaml`: the
//! declared name, the container images it ships, and the descriptive fields
//! a catalog would show. The linter reads this descriptor but never writes
//! it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::helm::chart::{ApiVersion, ChartMetadata};

/// File name of the extension descriptor.
pub const METADATA_FILENAME: &str = "extension.yaml";

/// Parsed extension.yaml descriptor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    /// The extension name; must be a DNS-1123 subdomain.
    pub name: String,

    /// A SemVer 2 version.
    pub version: String,

    /// Human-facing display name.
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,

    /// A single-sentence description.
    pub description: Option<String>,

    /// Catalog keywords.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// The URL of the extension's home page.
    pub home: Option<String>,

    /// Source code URLs.
    #[serde(default)]
    pub sources: Vec<String>,

    /// A URL or data URI for the extension icon.
    pub icon: Option<String>,

    /// Kubernetes version constraint.
    #[serde(rename = "kubeVersion")]
    pub kube_version: Option<String>,

    /// Container images the extension ships.
    #[serde(default)]
    pub images: Vec<String>,

    /// Free-form annotations.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Metadata {
    /// Load `extension.yaml` from an extension directory.
    pub fn load(dir: &Path) -> Result<Self, MetadataError> {
        let path = dir.join(METADATA_FILENAME);
        if !path.exists() {
            return Err(MetadataError::Missing(dir.display().to_string()));
        }
        let content = std::fs::read_to_string(&path)
            .map_err(|e| MetadataError::Io(format!("failed to read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content).map_err(|e| MetadataError::Parse(e.to_string()))
    }

    /// Synthesize chart metadata for extension directories that carry no
    /// Chart.yaml of their own.
    pub fn to_chart_metadata(&self) -> ChartMetadata {
        ChartMetadata {
            api_version: ApiVersion::V2,
            name: self.name.clone(),
            version: self.version.clone(),
            kube_version: self.kube_version.clone(),
            description: self.description.clone(),
            chart_type: None,
            keywords: self.keywords.clone(),
            home: self.home.clone(),
            sources: self.sources.clone(),
            icon: self.icon.clone(),
            app_version: None,
        }
    }
}

/// Metadata loading errors.
#[derive(Debug, Clone)]
pub enum MetadataError {
    /// No extension.yaml in the directory.
    Missing(String),
    /// I/O error reading extension.yaml.
    Io(String),
    /// extension.yaml failed to parse.
    Parse(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(dir) => write!(f, "no {} found in {}", METADATA_FILENAME, dir),
            Self::Io(msg) => write!(f, "metadata I/O error: {}", msg),
            Self::Parse(msg) => write!(f, "{}: {}", METADATA_FILENAME, msg),
        }
    }
}

impl std::error::Error for MetadataError {}
