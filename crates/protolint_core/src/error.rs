//! Linter error types.

use thiserror::Error;

/// Errors that can occur during a lint run.
#[derive(Debug, Error)]
pub enum LinterError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The compiler could not be started.
    #[error("Failed to run `{program}`: {source}")]
    Process {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The compiler failed without producing any output.
    #[error("`{program}` crashed but produced no output (status: {status})")]
    Crashed { program: String, status: String },

    /// A diagnostic line could not be classified.
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// An issue references a file that was never discovered.
    #[error("Unable to resolve workspace path for protobuf file: {0}")]
    Resolve(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LinterError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a resolution error for `file`.
    pub fn resolve(file: impl Into<String>) -> Self {
        Self::Resolve(file.into())
    }
}

/// A diagnostic line that does not match any known output shape.
///
/// Every variant carries the raw line so the failure can be reported
/// verbatim; an unknown shape means the upstream tools changed format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// No shape test accepted the line.
    #[error("No way to handle output: '{line}'")]
    UnrecognizedOutput { line: String },

    /// A style issue whose message matches no known warning.
    #[error("Cannot parse issue line for type: '{line}'")]
    UnknownStyleMessage { line: String },

    /// An internal compiler warning that names no schema file.
    #[error("No protobuf file named in compiler warning: '{line}'")]
    MissingFileName { line: String },

    /// An internal compiler warning that does not split into prefix and message.
    #[error("Malformed compiler warning: '{line}'")]
    MalformedInternalWarning { line: String },

    /// A compiler error whose context cannot be extracted.
    #[error("Error is unimplemented for context ({kind}): '{line}'")]
    MissingContext { kind: &'static str, line: String },

    /// A line or column that is not a positive integer.
    #[error("Invalid position '{value}' in: '{line}'")]
    InvalidPosition { value: String, line: String },
}

impl ClassifyError {
    /// Returns the raw line that failed to classify.
    pub fn line(&self) -> &str {
        match self {
            Self::UnrecognizedOutput { line }
            | Self::UnknownStyleMessage { line }
            | Self::MissingFileName { line }
            | Self::MalformedInternalWarning { line }
            | Self::MissingContext { line, .. }
            | Self::InvalidPosition { line, .. } => line,
        }
    }
}
