//! Replication Error Types
//!
//! Most replication failures are recovered locally (logged and
//! retried, or abandoned to anti-entropy) and never reach the client; only
//! an invalid write concern is surfaced synchronously.

use std::fmt;

/// Replication error type
#[derive(Debug, Clone)]
pub struct ReplicationError {
    /// Error kind
    pub kind: ReplicationErrorKind,
    /// Error message
    pub message: String,
}

/// Replication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationErrorKind {
    /// `W` is outside `1..=N+1`, or `W-1 > N` and the call could never
    /// unblock.
    InvalidWriteConcern,
}

impl ReplicationError {
    /// Create a new replication error.
    pub fn new(kind: ReplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create an invalid write concern error.
    pub fn invalid_write_concern(message: impl Into<String>) -> Self {
        Self::new(ReplicationErrorKind::InvalidWriteConcern, message)
    }
}

impl fmt::Display for ReplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReplicationError({:?}): {}", self.kind, self.message)
    }
}

impl std::error::Error for ReplicationError {}

/// Result type for replication operations
pub type ReplicationResult<T> = Result<T, ReplicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_write_concern_carries_message() {
        let err = ReplicationError::invalid_write_concern("w-1 > n");
        assert_eq!(err.kind, ReplicationErrorKind::InvalidWriteConcern);
        assert!(err.to_string().contains("w-1 > n"));
    }
}
