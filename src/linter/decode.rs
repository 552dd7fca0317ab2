//! Multi-document YAML decoding.
//!
//! Splits rendered file content into individual documents and decodes each
//! into a generic structured resource. Empty and comment-only documents are
//! skipped; a document that fails to decode is fatal for the enclosing rule
//! and carries the originating file name.

use serde_yaml::Value;

/// One decoded Kubernetes resource.
#[derive(Debug, Clone)]
pub struct Resource {
    value: Value,
}

impl Resource {
    /// The resource's `kind`, when present.
    pub fn kind(&self) -> Option<&str> {
        self.value.get("kind").and_then(Value::as_str)
    }

    /// The resource's `metadata.name`, when present.
    pub fn name(&self) -> Option<&str> {
        self.value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
    }

    /// The underlying decoded value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Check whether a rendered file name is a YAML manifest.
pub fn is_yaml_file(name: &str) -> bool {
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// Split file content on standard document markers.
pub fn split_documents(content: &str) -> Vec<&str> {
    content.split("\n---").collect()
}

/// Decode every document in `content` into a [`Resource`].
pub fn decode_documents(file: &str, content: &str) -> Result<Vec<Resource>, DecodeError> {
    let mut resources = Vec::new();

    for doc in split_documents(content) {
        let doc = doc.trim();
        if doc.is_empty() || doc.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            continue;
        }

        let value: Value = serde_yaml::from_str(doc).map_err(|e| DecodeError {
            file: file.to_string(),
            message: e.to_string(),
        })?;

        if value.is_null() {
            continue;
        }
        resources.push(Resource { value });
    }

    Ok(resources)
}

/// A document in a rendered file failed to decode.
#[derive(Debug, Clone)]
pub struct DecodeError {
    /// The rendered file the document came from.
    pub file: String,
    /// The underlying YAML error.
    pub message: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to decode YAML file {}: {}", self.file, self.message)
    }
}

impl std::error::Error for DecodeError {}
