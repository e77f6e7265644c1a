//! Error types for ffplan-av.

use std::path::PathBuf;

use ffplan_common::ContentCategory;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while probing media or assembling commands.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The file's guessed content category is not one the prober accepts.
    #[error(
        "content category {} not allowed: {}",
        category.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()),
        path.display()
    )]
    CategoryNotAllowed {
        path: PathBuf,
        category: Option<ContentCategory>,
    },

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool failed to execute or reported an error.
    #[error("tool execution failed: {tool}: {message}")]
    ToolFailed { tool: String, message: String },

    /// An external tool ran successfully but printed nothing.
    #[error("{tool} produced no output")]
    EmptyOutput { tool: String },

    /// Failed to parse tool output.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The caller or a stream policy broke the mapper's contract.
    ///
    /// These are programming errors, not bad media data.
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl Error {
    /// Create a category not allowed error.
    pub fn category_not_allowed(
        path: impl Into<PathBuf>,
        category: Option<ContentCategory>,
    ) -> Self {
        Self::CategoryNotAllowed {
            path: path.into(),
            category,
        }
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create an empty output error.
    pub fn empty_output(tool: impl Into<String>) -> Self {
        Self::EmptyOutput { tool: tool.into() }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }

    /// Whether this error means "this file cannot be probed right now".
    ///
    /// Callers treat these as a skip, not a crash.
    pub fn is_probe_failure(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::CategoryNotAllowed { .. }
                | Self::ToolNotFound { .. }
                | Self::ToolFailed { .. }
                | Self::EmptyOutput { .. }
                | Self::ParseError { .. }
                | Self::Io(_)
        )
    }
}
