//! Error types for scopegrid.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 3=not_found, 4=validation, etc.)
//! - Retryability flags
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use thiserror::Error;

/// Result type alias for scopegrid operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    DatabaseError,
    CorruptCollection,

    // Not Found (exit 3)
    RecordNotFound,

    // Validation (exit 4)
    InvalidArgument,
    InvalidField,

    // Import (exit 6)
    InvalidFormat,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Remote (exit 9)
    RemoteError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::CorruptCollection => "CORRUPT_COLLECTION",
            Self::RecordNotFound => "RECORD_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidField => "INVALID_FIELD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::RemoteError => "REMOTE_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError | Self::CorruptCollection => 2,
            Self::RecordNotFound => 3,
            Self::InvalidArgument | Self::InvalidField => 4,
            Self::InvalidFormat => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::RemoteError => 9,
        }
    }

    /// Whether the caller should retry with corrected input.
    ///
    /// True for validation errors and transient remote/database failures.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument
                | Self::InvalidField
                | Self::InvalidFormat
                | Self::RemoteError
                | Self::DatabaseError
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in scopegrid operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Record not found: {id} (did you mean: {}?)", similar.join(", "))]
    RecordNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("Field '{field}' cannot be edited")]
    ReadOnlyField { field: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid JSON format: {0}")]
    InvalidFormat(String),

    #[error("Stored collection is unreadable: {reason}")]
    CorruptCollection { reason: String },

    #[error("Remote source error: {0}")]
    Remote(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::RecordNotFound { .. } | Self::RecordNotFoundSimilar { .. } => {
                ErrorCode::RecordNotFound
            }
            Self::ReadOnlyField { .. } | Self::UnknownField(_) => ErrorCode::InvalidField,
            Self::InvalidFormat(_) => ErrorCode::InvalidFormat,
            Self::CorruptCollection { .. } => ErrorCode::CorruptCollection,
            Self::Remote(_) => ErrorCode::RemoteError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::RecordNotFound { id } => Some(format!(
                "No record with ID '{id}'. Use `sg list` to see available records."
            )),
            Self::RecordNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::ReadOnlyField { field } if field == "amount" => Some(
                "The amount is derived from percentCost and the configured budget. \
                 Edit percentCost instead."
                    .to_string(),
            ),
            Self::ReadOnlyField { .. } | Self::UnknownField(_) => Some(
                "Editable fields: page, childPage, milestone, description, remarks, \
                 demoDate, deploymentDate, percentCost"
                    .to_string(),
            ),

            Self::InvalidFormat(_) => Some(
                "Import files must contain a JSON array of records, e.g. the output of `sg export`."
                    .to_string(),
            ),

            Self::CorruptCollection { .. } => Some(
                "Point --db at a fresh database and restore from an export with `sg import`."
                    .to_string(),
            ),

            Self::Config(msg) if msg.contains("api_url") => Some(
                "Set `api_url` in ~/.scopegrid/config.json or export SG_API_URL.".to_string(),
            ),

            Self::InvalidArgument(msg) if msg.contains("status") => {
                Some("Valid statuses: deployed, demo-done, pending".to_string())
            }
            Self::InvalidArgument(msg) if msg.contains("column") => Some(
                "Sortable columns: no, page, childPage, milestone, description, remarks, \
                 demoDate, deploymentDate, percentCost, amount"
                    .to_string(),
            ),

            Self::Remote(_) => Some("Check that the server is reachable, then run `sg reload`.".to_string()),

            Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
