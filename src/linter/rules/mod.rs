//! Convention rules and their shared types.
//!
//! Each rule is an independent check: it renders the chart with its own
//! sentinel injection, inspects the rendered resources, and returns a
//! structured outcome. Formatting lives in [`crate::linter::report`].

pub mod image_registry;
pub mod images;
pub mod name;
pub mod node_selector;

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use crate::helm::render::RenderError;
use crate::linter::decode::DecodeError;
use crate::linter::walker::WalkError;

/// Severity levels for convention findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Convention broken; still advisory for the exit code.
    Error,
    /// Worth fixing, not a convention break.
    Warning,
}

impl Severity {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One violating resource within a rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The resource kind, e.g. "Deployment".
    pub kind: String,
    /// The resource's metadata.name.
    pub name: String,
    /// Offending init-container names (image-registry rule only).
    pub init_containers: Vec<String>,
    /// Offending container names (image-registry rule only).
    pub containers: Vec<String>,
}

impl Violation {
    /// A violation identified by the resource alone.
    pub fn resource(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            init_containers: Vec::new(),
            containers: Vec::new(),
        }
    }

    /// A violation carrying offending container names.
    pub fn containers(
        kind: impl Into<String>,
        name: impl Into<String>,
        init_containers: Vec<String>,
        containers: Vec<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            init_containers,
            containers,
        }
    }
}

/// Violations grouped by rendered file, in path order; violations within a
/// file keep first-encountered order, one entry per resource.
pub type ViolationsByFile = BTreeMap<String, Vec<Violation>>;

/// A rule that could not run to completion (render or decode failure).
#[derive(Debug, Clone)]
pub enum RuleError {
    /// The sentinel render failed.
    Render(RenderError),
    /// A rendered document failed to decode.
    Decode(DecodeError),
    /// The strict walker hit a malformed resource.
    Walk(WalkError),
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(e) => write!(f, "{}", e),
            Self::Decode(e) => write!(f, "{}", e),
            Self::Walk(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RuleError {}

impl From<RenderError> for RuleError {
    fn from(e: RenderError) -> Self {
        Self::Render(e)
    }
}

impl From<DecodeError> for RuleError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<WalkError> for RuleError {
    fn from(e: WalkError) -> Self {
        Self::Walk(e)
    }
}

/// The structured outcome of one rule invocation.
#[derive(Debug, Clone)]
pub enum RuleOutcome {
    /// Nothing to report.
    Pass,
    /// The extension name breaks DNS-1123 subdomain syntax.
    NameInvalid { name: String, reasons: Vec<String> },
    /// The extension declares no images at all.
    NoImages,
    /// Declared images absent from every rendered file.
    ImagesMissing { missing: Vec<String> },
    /// A global override failed to propagate.
    Propagation {
        setting: &'static str,
        violations: ViolationsByFile,
    },
    /// The rule itself failed to run.
    Failed { error: String },
}

impl RuleOutcome {
    /// Check whether this outcome produces output.
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// One rule's report: the rule label plus its outcome.
#[derive(Debug, Clone)]
pub struct RuleReport {
    /// Rule label as shown in output, e.g. "global.nodeSelector".
    pub rule: &'static str,
    pub outcome: RuleOutcome,
}

/// Alphabet for sentinel tokens: lowercase alphanumerics without vowels,
/// so a token can never spell an unfortunate word.
const TOKEN_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const TOKEN_LEN: usize = 12;

/// Generate a fresh 12-character sentinel token. Fresh per rule
/// invocation; never reused across renders.
pub fn sentinel_token() -> String {
    let mut rng = rand::rng();
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}
