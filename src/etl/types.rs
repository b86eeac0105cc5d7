use std::fmt;

use serde::Serialize;

/// Errors raised while running an ETL pipeline.
///
/// Variants are split into recoverable and fatal ones, see
/// [`EtlError::is_recoverable`]. Recoverable errors may be downgraded by a
/// listener of the matching `*-exception` event; fatal ones always abort.
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("could not extract data: {found} is not an iterable sequence")]
    ExtractContract { found: &'static str },

    #[error("the transformer must produce a lazy sequence, got {found}")]
    TransformContract { found: &'static str },

    #[error("{found} is not an iterable sequence")]
    NotIterable { found: &'static str },

    #[error("{0}")]
    Fatal(String),

    #[error("{0}")]
    Message(String),

    #[error("stage failed")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EtlError {
    /// Recoverable error carrying a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        EtlError::Message(message.into())
    }

    /// Error that can never be ignored by a listener.
    pub fn fatal(message: impl Into<String>) -> Self {
        EtlError::Fatal(message.into())
    }

    /// Wraps a foreign error, keeping it reachable through `source()`.
    pub fn source(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        EtlError::Source(Box::new(error))
    }

    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            EtlError::ExtractContract { .. }
                | EtlError::TransformContract { .. }
                | EtlError::NotIterable { .. }
                | EtlError::Fatal(_)
        )
    }
}

impl From<super::builder::ConfigBuilderError> for EtlError {
    fn from(err: super::builder::ConfigBuilderError) -> Self {
        EtlError::Config(err.to_string())
    }
}

/// Key attached to an extracted item or a transformed value.
///
/// Keys are either ordinals or names and are not required to be unique
/// within a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    Index(usize),
    Name(String),
}

impl Key {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(i) => Some(*i),
            Key::Name(_) => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Index(_) => None,
            Key::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(i) => write!(f, "{}", i),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}
