//! Unified error handling system
//!
//! Every component fails fast and wraps the first failure into one of five
//! tagged variants, keeping the original error as the `source`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

pub type ScrivenerResult<T> = Result<T, ScrivenerError>;

/// Boxed cause carried by every error variant
pub type ErrorSource = Box<dyn std::error::Error + Send + Sync>;

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
    pub metadata: std::collections::HashMap<String, String>,
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
            metadata: std::collections::HashMap::new(),
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

/// Plain tag of a [`ScrivenerError`], for exhaustive handling at the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    Search,
    Synthesis,
    Persistence,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Search => "search",
            ErrorKind::Synthesis => "synthesis",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Configuration => "configuration",
        };
        f.write_str(name)
    }
}

/// Main error type for Scrivener
#[derive(Error, Debug)]
pub enum ScrivenerError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        #[source]
        source: Option<ErrorSource>,
        context: ErrorContext,
    },

    #[error("Search error: {message}")]
    Search {
        message: String,
        #[source]
        source: Option<ErrorSource>,
        context: ErrorContext,
    },

    #[error("Synthesis error: {message}")]
    Synthesis {
        message: String,
        #[source]
        source: Option<ErrorSource>,
        context: ErrorContext,
    },

    #[error("Persistence error: {message}")]
    Persistence {
        message: String,
        #[source]
        source: Option<ErrorSource>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<ErrorSource>,
        context: ErrorContext,
    },
}

impl ScrivenerError {
    /// Build an error of the given kind without a cause
    pub fn new(kind: ErrorKind, message: impl Into<String>, context: ErrorContext) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Validation => ScrivenerError::Validation {
                message,
                field: None,
                source: None,
                context,
            },
            ErrorKind::Search => ScrivenerError::Search {
                message,
                source: None,
                context,
            },
            ErrorKind::Synthesis => ScrivenerError::Synthesis {
                message,
                source: None,
                context,
            },
            ErrorKind::Persistence => ScrivenerError::Persistence {
                message,
                source: None,
                context,
            },
            ErrorKind::Configuration => ScrivenerError::Configuration {
                message,
                source: None,
                context,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrivenerError::Validation { .. } => ErrorKind::Validation,
            ScrivenerError::Search { .. } => ErrorKind::Search,
            ScrivenerError::Synthesis { .. } => ErrorKind::Synthesis,
            ScrivenerError::Persistence { .. } => ErrorKind::Persistence,
            ScrivenerError::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Human-readable message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            ScrivenerError::Validation { message, .. }
            | ScrivenerError::Search { message, .. }
            | ScrivenerError::Synthesis { message, .. }
            | ScrivenerError::Persistence { message, .. }
            | ScrivenerError::Configuration { message, .. } => message,
        }
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            ScrivenerError::Validation { context, .. }
            | ScrivenerError::Search { context, .. }
            | ScrivenerError::Synthesis { context, .. }
            | ScrivenerError::Persistence { context, .. }
            | ScrivenerError::Configuration { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            ScrivenerError::Validation { context, .. }
            | ScrivenerError::Search { context, .. }
            | ScrivenerError::Synthesis { context, .. }
            | ScrivenerError::Persistence { context, .. }
            | ScrivenerError::Configuration { context, .. } => context,
        }
    }

    /// Record the operation that failed
    pub fn with_operation(mut self, operation: &str) -> Self {
        self.context_mut().operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.context_mut()
            .metadata
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Messages of the wrapped causes, outermost first
    pub fn cause_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            chain.push(cause.to_string());
            current = cause.source();
        }
        chain
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        match self.kind() {
            ErrorKind::Configuration | ErrorKind::Validation => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    error = %self,
                    "Configuration or validation error"
                );
            }
            ErrorKind::Search | ErrorKind::Synthesis => {
                warn!(
                    error_id = %context.error_id,
                    component = %context.component,
                    operation = ?context.operation,
                    error = %self,
                    "Upstream API error"
                );
            }
            ErrorKind::Persistence => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    operation = ?context.operation,
                    error = %self,
                    "Filesystem error"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::ScrivenerError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! search_error {
    ($msg:expr, $component:expr) => {
        $crate::ScrivenerError::Search {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your search API key and internet connection"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScrivenerError::Search {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your search API key and internet connection"),
        }
    };
}

#[macro_export]
macro_rules! synthesis_error {
    ($msg:expr, $component:expr) => {
        $crate::ScrivenerError::Synthesis {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your generation API key and try again"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScrivenerError::Synthesis {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your generation API key and try again"),
        }
    };
}

#[macro_export]
macro_rules! persistence_error {
    ($msg:expr, $component:expr) => {
        $crate::ScrivenerError::Persistence {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your file permissions and disk space"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScrivenerError::Persistence {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your file permissions and disk space"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ScrivenerError::Configuration {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment variables and configuration file")
                .with_suggestion("Run 'scrivener config --init' to create a default config"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScrivenerError::Configuration {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your environment variables and configuration file")
                .with_suggestion("Run 'scrivener config --init' to create a default config"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let error = search_error!("upstream down", "test");
        assert_eq!(error.kind(), ErrorKind::Search);
        assert_eq!(error.message(), "upstream down");
        assert_eq!(error.to_string(), "Search error: upstream down");

        let error = ScrivenerError::new(ErrorKind::Persistence, "disk full", ErrorContext::new("t"));
        assert_eq!(error.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = persistence_error!("Failed to write article", "archive", io)
            .with_operation("write_file");

        assert_eq!(error.context().operation.as_deref(), Some("write_file"));
        assert_eq!(error.cause_chain(), vec!["denied".to_string()]);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_config_error_carries_suggestions() {
        let error = config_error!("missing key", "synthesizer");
        assert!(!error.context().recovery_suggestions.is_empty());
        assert!(!error.context().error_id.is_empty());
        assert_eq!(error.kind().to_string(), "configuration");
    }
}
