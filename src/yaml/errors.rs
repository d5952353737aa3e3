use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YamlError {
    #[error("invalid YAML syntax: {message}")]
    Syntax { message: String },

    #[error("document is not valid UTF-8: {message}")]
    InvalidUtf8 { message: String },

    #[error("expected exactly one YAML document, found {found}")]
    DocumentCount { found: usize },

    #[error("unsupported YAML node kind '{kind}' at {line}:{column}")]
    UnsupportedNodeKind {
        kind: String,
        line: usize,
        column: usize,
    },
}

impl From<yaml_rust2::ScanError> for YamlError {
    fn from(err: yaml_rust2::ScanError) -> Self {
        YamlError::Syntax {
            message: err.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for YamlError {
    fn from(err: std::str::Utf8Error) -> Self {
        YamlError::InvalidUtf8 {
            message: err.to_string(),
        }
    }
}
