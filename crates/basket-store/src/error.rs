//! # Store Error Types
//!
//! Error types for the store handle and checkout orchestration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Orchestration  │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  InProgress     │  │  Core (selectors)       │ │
//! │  │  ConfigLoad     │  │  Superseded     │  │  Validation (quantity)  │ │
//! │  │  ConfigSave     │  │  Cancelled      │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NOT HERE: a declined checkout or a failed collaborator call.          │
//! │  Those are cart state (ERROR), reported as a CheckoutOutcome.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use uuid::Uuid;

use basket_core::{CoreError, ValidationError};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Checkout Orchestration Errors
    // =========================================================================
    /// A checkout is already in flight and the store rejects overlaps.
    #[error("Checkout {checkout_id} is already in progress")]
    CheckoutInProgress { checkout_id: Uuid },

    /// This checkout was replaced by a newer one before it finished.
    #[error("Checkout was superseded by a newer checkout")]
    CheckoutSuperseded,

    /// This checkout was cancelled before the collaborator answered.
    #[error("Checkout was cancelled")]
    CheckoutCancelled,

    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// Selector or domain failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Rejected input under a validating quantity policy.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// The checkout task died without reporting back.
    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Internal(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl StoreError {
    /// Returns true if the caller can reasonably try the same call again later.
    ///
    /// ## Retryable Errors
    /// - A checkout was already in flight (it will finish)
    /// - This checkout was superseded or cancelled
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::CheckoutInProgress { .. }
                | StoreError::CheckoutSuperseded
                | StoreError::CheckoutCancelled
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConfig(_)
                | StoreError::ConfigLoadFailed(_)
                | StoreError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(StoreError::CheckoutInProgress {
            checkout_id: Uuid::new_v4()
        }
        .is_retryable());
        assert!(StoreError::CheckoutSuperseded.is_retryable());
        assert!(StoreError::CheckoutCancelled.is_retryable());

        assert!(!StoreError::InvalidConfig("bad".into()).is_retryable());
        assert!(!StoreError::Core(CoreError::ProductNotFound("X".into())).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(StoreError::InvalidConfig("bad".into()).is_config_error());
        assert!(StoreError::ConfigLoadFailed("io".into()).is_config_error());
        assert!(!StoreError::CheckoutCancelled.is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err: StoreError = CoreError::ProductNotFound("X".into()).into();
        assert_eq!(err.to_string(), "Product not found: X");

        let err: StoreError = ValidationError::MustBePositive {
            field: "quantity".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Validation error: quantity must be positive");
    }
}
