//! Unified error type for the domain layer.
//!
//! Mirrors the orchestrator's error taxonomy (§7 of the design): callers
//! only ever see `InvalidInput`, `NotFound`, or `ServiceUnavailable`.
//! Render failures are never represented as an error - they surface as
//! scene status transitions instead.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// The request was structurally invalid (e.g. empty story text).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The referenced scene does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The orchestrator cannot currently serve requests (store unreachable,
    /// provider pool empty at startup, etc).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }
}
