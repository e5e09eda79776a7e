//! Error types for worksite.
//!
//! This module defines all error types used throughout the worksite crate,
//! providing detailed context for debugging and user-friendly error messages.

use thiserror::Error;

use crate::record::{IncidentId, SiteId};

/// The main error type for worksite operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Registry Errors ===
    /// An incident referenced a site that does not exist.
    #[error("unknown site: {site_id}")]
    UnknownSite {
        /// The site identifier supplied by the caller.
        site_id: SiteId,
    },

    /// No incident exists with the given identifier.
    #[error("incident not found: {incident_id}")]
    IncidentNotFound {
        /// The incident identifier supplied by the caller.
        incident_id: IncidentId,
    },

    /// No site exists with the given identifier.
    #[error("site not found: {site_id}")]
    SiteNotFound {
        /// The site identifier supplied by the caller.
        site_id: SiteId,
    },

    /// A request body failed shape validation.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the validation failure.
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

    // === I/O Errors ===
    /// Socket or file system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for worksite operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an input validation error for the named field.
    #[must_use]
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Check if this error was caused by bad caller input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownSite { .. } | Self::InvalidInput { .. })
    }

    /// Check if this error indicates a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::IncidentNotFound { .. } | Self::SiteNotFound { .. }
        )
    }
}
