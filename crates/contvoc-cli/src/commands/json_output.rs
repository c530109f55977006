//! JSON output types for machine-readable CLI output.

use contvoc_excitation::ExcitationError;
use serde::Serialize;

/// Error codes for failures outside the excitation library.
pub mod error_codes {
    /// File could not be read or written
    pub const FILE_IO: &str = "CLI_001";
    /// Config file could not be parsed
    pub const CONFIG_PARSE: &str = "CLI_002";
    /// Bad command-line arguments
    pub const USAGE: &str = "CLI_003";
    /// Anything else
    pub const INTERNAL: &str = "CLI_099";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (library codes pass through)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Error category from the library, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl JsonError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category: None,
        }
    }

    /// Maps an error chain, preferring the library's stable code.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        if let Some(inner) = err.downcast_ref::<ExcitationError>() {
            return Self {
                code: inner.code().to_string(),
                message,
                category: Some(inner.category().to_string()),
            };
        }
        let code = if err.downcast_ref::<std::io::Error>().is_some() {
            error_codes::FILE_IO
        } else {
            error_codes::INTERNAL
        };
        Self::new(code, message)
    }
}

/// Envelope printed for every `--json` run.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutput<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> CommandOutput<T> {
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            errors: vec![error],
            result: None,
        }
    }
}
