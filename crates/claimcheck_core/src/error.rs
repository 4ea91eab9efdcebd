//! Core error types for CLAIMCHECK.

use std::fmt;

/// Core result type
pub type AuditResult<T> = Result<T, AuditError>;

/// Core error type
///
/// Every variant is recoverable at the caller boundary. Nothing in the core
/// is transient, so none of these are ever retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A required field is missing or has the wrong type
    MalformedInput {
        /// Which input was being read
        context: String,
        /// Parser or validation message
        reason: String,
    },

    /// A non-address field differs between reference and submitted claim
    StructuralMismatch {
        /// Field name
        field: String,
        /// Reference value
        expected: String,
        /// Submitted value
        actual: String,
    },

    /// Address count, amount, or timelock outside the tolerance window
    AddressSetMismatch {
        /// First offending entry, if the mismatch is per-entry
        index: Option<usize>,
        /// What differed
        reason: String,
    },

    /// The vesting policy cannot produce a meaningful schedule
    ScheduleDegenerate {
        /// Why
        reason: String,
    },

    /// Checked arithmetic overflowed
    ArithmeticOverflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Configuration value out of range
    InvalidConfig {
        /// Config field
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

impl AuditError {
    /// Shorthand for a `MalformedInput` error
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a `ScheduleDegenerate` error
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::ScheduleDegenerate {
            reason: reason.into(),
        }
    }

    /// Shorthand for an `ArithmeticOverflow` error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::ArithmeticOverflow {
            operation: operation.into(),
        }
    }

    /// Whether this error is a verdict on the claim rather than on the inputs
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::StructuralMismatch { .. } | Self::AddressSetMismatch { .. }
        )
    }
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput { context, reason } => {
                write!(f, "Malformed input in {}: {}", context, reason)
            }
            Self::StructuralMismatch {
                field,
                expected,
                actual,
            } => write!(
                f,
                "Structural mismatch in {}: expected {}, got {}",
                field, expected, actual
            ),
            Self::AddressSetMismatch { index: Some(i), reason } => {
                write!(f, "Address set mismatch at entry {}: {}", i, reason)
            }
            Self::AddressSetMismatch { index: None, reason } => {
                write!(f, "Address set mismatch: {}", reason)
            }
            Self::ScheduleDegenerate { reason } => write!(f, "Degenerate schedule: {}", reason),
            Self::ArithmeticOverflow { operation } => {
                write!(f, "Arithmetic overflow: {}", operation)
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "Invalid config for {}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for AuditError {}

impl From<serde_json::Error> for AuditError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed("json", err.to_string())
    }
}
