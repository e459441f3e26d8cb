use crate::point::PointIssue;
use serde::Serialize;

/// A problem found while loading layer data that was skipped rather than treated as fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Layer name, or [`crate::SELF_LAYER`] for per-container main data.
    pub layer: String,
    /// Set for main data, which is keyed by container rather than by layer name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    /// Index of the offending element in the layer's JSON array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    InvalidPoint { issue: PointIssue },
    MalformedJson { message: String },
    NotAnArray,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.container {
            Some(container) => write!(f, "{}@{}", self.layer, container)?,
            None => write!(f, "{}", self.layer)?,
        }
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        match &self.kind {
            DiagnosticKind::InvalidPoint { issue } => write!(f, ": invalid point: {issue}"),
            DiagnosticKind::MalformedJson { message } => write!(f, ": malformed JSON: {message}"),
            DiagnosticKind::NotAnArray => write!(f, ": layer data is not a JSON array"),
        }
    }
}
