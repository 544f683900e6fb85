// Error taxonomy for package assembly and configuration

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PackageError {
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Provider failure ({catalog}): {message}")]
    ProviderFailure {
        catalog: &'static str,
        message: String,
    },

    #[error("Lodging pricing failed for batch [{}]: {message}", batch.join(","))]
    PartialEnrichmentFailure { batch: Vec<String>, message: String },

    #[error("Activities unavailable: {0}")]
    ActivityUnavailable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Assembly deadline exceeded after {0}ms")]
    DeadlineExceeded(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PackageError {
    pub fn provider(catalog: &'static str, message: impl Into<String>) -> Self {
        PackageError::ProviderFailure {
            catalog,
            message: message.into(),
        }
    }

    // Fatal errors abort the live fetch for the whole request
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PackageError::PartialEnrichmentFailure { .. } | PackageError::ActivityUnavailable(_)
        )
    }

    // Fetch-layer failures the caller never sees: the fallback catalog answers instead
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            PackageError::AuthFailure(_)
                | PackageError::ProviderFailure { .. }
                | PackageError::DeadlineExceeded(_)
        )
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
