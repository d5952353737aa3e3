use crate::splice::SpliceError;
use crate::yaml::YamlError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    #[error("failed to parse values document: {0}")]
    Parse(YamlError),

    #[error("no matcher given: a path or a selector is required (either one is acceptable)")]
    NoMatcher,

    #[error("mapping at {path} has no field '{field}'")]
    MissingField { path: String, field: String },

    #[error("field '{field}' of mapping at {path} has tag {found}, expected !!str")]
    TypeMismatch {
        path: String,
        field: String,
        found: String,
    },

    #[error("internal error: unsupported node kind '{kind}' at {line}:{column}")]
    UnsupportedNodeKind {
        kind: String,
        line: usize,
        column: usize,
    },

    #[error("failed to encode value for field '{field}': {message}")]
    Encoding { field: String, message: String },

    #[error(
        "internal error: computed span [{byte_start}, {byte_end}) of field '{field}' at {path} does not cover its value"
    )]
    SpanMismatch {
        path: String,
        field: String,
        byte_start: usize,
        byte_end: usize,
    },

    #[error("internal error: {0}")]
    Splice(#[from] SpliceError),

    #[error("internal error: edited document no longer parses: {0}")]
    InvalidOutput(YamlError),
}

impl UpdateError {
    /// True for failures of the engine itself rather than of the caller's
    /// document or rule.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            UpdateError::UnsupportedNodeKind { .. }
                | UpdateError::SpanMismatch { .. }
                | UpdateError::Splice(_)
                | UpdateError::InvalidOutput(_)
        )
    }
}

impl From<YamlError> for UpdateError {
    fn from(err: YamlError) -> Self {
        match err {
            YamlError::UnsupportedNodeKind { kind, line, column } => {
                UpdateError::UnsupportedNodeKind { kind, line, column }
            }
            other => UpdateError::Parse(other),
        }
    }
}
