//! Unified error handling system
//!
//! Structured error types with context, recovery suggestions and error chaining.
//! Authorization denials are not errors; they are reported as outcomes by the
//! operations that can be denied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

pub type PressResult<T> = Result<T, PressError>;

/// Boxed source error carried by the transport and storage variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the press console client
#[derive(Error, Debug)]
pub enum PressError {
    /// The request never produced an HTTP response (DNS, connect, timeout, ...)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    /// The server answered with a non-success status
    #[error("Server error ({status}): {message}")]
    Server {
        status: u16,
        message: String,
        /// Frappe exception class, e.g. `PermissionError`
        exc_type: Option<String>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        context: ErrorContext,
    },
}

impl PressError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            PressError::Network { context, .. } => Some(context),
            PressError::Server { context, .. } => Some(context),
            PressError::Authentication { context, .. } => Some(context),
            PressError::Storage { context, .. } => Some(context),
            PressError::Config { context, .. } => Some(context),
            PressError::Validation { context, .. } => Some(context),
            PressError::Internal { context, .. } => Some(context),
            PressError::Io(_) | PressError::Serialization(_) => None,
        }
    }

    /// HTTP status of a server error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            PressError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for failures of the remote round trip itself
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PressError::Network { .. }
                | PressError::Server { .. }
                | PressError::Authentication { .. }
                | PressError::Serialization(_)
        )
    }

    /// Check if error is recoverable by trying again later.
    /// Nothing in this workspace retries on its own; this is advice for callers.
    pub fn is_recoverable(&self) -> bool {
        match self {
            PressError::Network { .. } => true,
            PressError::Server { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            PressError::Internal { .. } | PressError::Storage { .. } => {
                error!(error_id = ?error_id, error = %self, "Internal or storage error occurred");
            }
            PressError::Config { .. } | PressError::Validation { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration or validation error");
            }
            PressError::Network { .. } | PressError::Server { .. } => {
                warn!(error_id = ?error_id, error = %self, "Remote call failed");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::PressError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'press config --init' to create a default config"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::PressError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::PressError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::PressError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the storage location is writable"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_recoverability() {
        let server = PressError::Server {
            status: 502,
            message: "Bad Gateway".to_string(),
            exc_type: None,
            context: ErrorContext::new("test"),
        };
        assert!(server.is_recoverable());
        assert!(server.is_transport());
        assert_eq!(server.status(), Some(502));

        let forbidden = PressError::Server {
            status: 403,
            message: "Not permitted".to_string(),
            exc_type: Some("PermissionError".to_string()),
            context: ErrorContext::new("test"),
        };
        assert!(!forbidden.is_recoverable());
    }

    #[test]
    fn test_storage_error_is_local() {
        let error = storage_error!("disk full", "test");
        assert!(!error.is_transport());
        assert!(error.context().is_some());
    }
}
