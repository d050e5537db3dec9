//! Error types for roastlog.
//!
//! Storage and configuration failures wrap their sources. Domain refusals
//! (an unavailable phase, a finished session, a missing base temperature) are
//! typed so callers can tell an operator what to do next.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::session::Phase;

/// The main error type for roastlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Input Errors ===
    /// One or more required fields are missing or invalid.
    #[error("{0}")]
    Validation(ValidationErrors),

    // === Session Errors ===
    /// There is no pending session to start a roast from.
    #[error("no pending roast session; run `roastlog session start` first")]
    NoPendingSession,

    /// The requested phase cannot be recorded right now.
    #[error("{phase} is not available: {reason}")]
    PhaseUnavailable {
        /// The phase that was requested.
        phase: Phase,
        /// Why it is not available.
        reason: &'static str,
    },

    /// The roast has already finished.
    #[error("the roast has already finished")]
    SessionFinished,

    /// The roast is still running.
    #[error("the roast is still running; finish it before saving")]
    SessionNotFinished,

    /// A units digit was chosen before any base temperature.
    #[error("select a base temperature before choosing a units digit")]
    NoBaseSelected,

    /// A selector value outside its tier.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// A console line that is not a known command.
    #[error("{0}")]
    InvalidCommand(String),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for roastlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new invalid-selection error.
    #[must_use]
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }

    /// Per-field messages if this is a validation error.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(errors) => Some(errors.fields()),
            _ => None,
        }
    }

    /// Check if this error is a refusal of an operator action rather than a
    /// failure of the tool itself.
    #[must_use]
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NoPendingSession
                | Self::PhaseUnavailable { .. }
                | Self::SessionFinished
                | Self::SessionNotFinished
                | Self::NoBaseSelected
                | Self::InvalidSelection(_)
                | Self::InvalidCommand(_)
        )
    }
}

/// A message attached to a single input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name as the operator knows it.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// Collected field messages from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// The collected messages, in the order they were added.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    /// Message for a given field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    /// Whether no messages were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `Ok(())` when empty, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if any field message was added.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid input")?;
        for (i, field) in self.fields.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{}: {}", field.field, field.message)?;
        }
        Ok(())
    }
}
