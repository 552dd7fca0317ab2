//! Crate-level error type.
//!
//! Subsystems define their own focused error enums; this module wraps them
//! into the single error surfaced by the CLI.

use thiserror::Error;

/// Errors surfaced by extlint commands.
#[derive(Debug, Error)]
pub enum ExtlintError {
    /// I/O failure outside any subsystem (archive expansion, directory walks)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart loading failed
    #[error(transparent)]
    Chart(#[from] crate::helm::chart::ChartError),

    /// Value overlay could not be merged
    #[error(transparent)]
    Values(#[from] crate::helm::values::ValuesError),

    /// Template rendering failed
    #[error(transparent)]
    Render(#[from] crate::helm::render::RenderError),

    /// Extension metadata could not be loaded
    #[error(transparent)]
    Metadata(#[from] crate::extension::metadata::MetadataError),

    /// An expanded subchart archive did not contain a chart directory
    #[error("unexpected file {file} in expanded archive {archive}")]
    ArchiveLayout { file: String, archive: String },

    /// Structural lint failed; the message is the run summary
    #[error("{0}")]
    LintFailed(String),
}

/// Result type alias for extlint operations
pub type Result<T> = std::result::Result<T, ExtlintError>;
