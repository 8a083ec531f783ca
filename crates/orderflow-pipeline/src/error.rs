//! # Pipeline Error Types
//!
//! Error types for intake and processor operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pipeline Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Domain       │  │    Storage      │  │       Wire              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(..)       │  │  Store(..)      │  │  MalformedPayload       │ │
//! │  │  (validation,   │  │  (queries,      │  │  EncodingFailed         │ │
//! │  │   transitions,  │  │   conflicts,    │  │                         │ │
//! │  │   permissions)  │  │   pool)         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  The processor asks `is_retryable()` to decide between nacking a       │
//! │  message (transient) and dropping it (poison).                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use orderflow_core::CoreError;
use orderflow_store::StoreError;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline error type covering intake, processor, and tracking failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Business rule violation (validation, transition, permission).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A queue payload could not be decoded.
    ///
    /// ## When This Occurs
    /// - Payload is not valid base64
    /// - Decoded bytes are not UTF-8 JSON
    /// - JSON shape doesn't match the message contract
    ///
    /// Such messages never become valid; the processor drops them instead
    /// of retrying.
    #[error("Malformed queue payload: {0}")]
    MalformedPayload(String),

    /// A wire message could not be encoded.
    #[error("Message encoding failed: {0}")]
    EncodingFailed(String),
}

impl PipelineError {
    /// Whether retrying the failed operation could succeed.
    ///
    /// ## Classification
    /// ```text
    /// MalformedPayload          → no  (poison - the bytes won't change)
    /// Core(..)                  → no  (a rule was violated, retry changes nothing)
    /// Store(NotFound)           → no  (referenced entity is gone)
    /// Store(other)              → yes (pool, lock, transient I/O)
    /// EncodingFailed            → no
    /// ```
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Store(StoreError::NotFound { .. }) => false,
            PipelineError::Store(_) => true,
            PipelineError::Core(_) => false,
            PipelineError::MalformedPayload(_) => false,
            PipelineError::EncodingFailed(_) => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(PipelineError::Store(StoreError::PoolExhausted).is_retryable());
        assert!(PipelineError::Store(StoreError::QueryFailed("locked".into())).is_retryable());

        assert!(!PipelineError::Store(StoreError::not_found("Order", "o1")).is_retryable());
        assert!(!PipelineError::MalformedPayload("bad base64".into()).is_retryable());
        assert!(!PipelineError::Core(CoreError::OrderNotFound("o1".into())).is_retryable());
    }
}
