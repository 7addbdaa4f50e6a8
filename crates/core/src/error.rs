// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::ports::RepositoryError;
use enrollment_domain::{DomainError, FieldPath, HistoryField, RejectReason};

/// Entity name reported with uniqueness violations.
pub const ENROLLMENT_STATUS_HISTORIES: &str = "enrollment_status_histories";

/// Errors surfaced by enrollment operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A requested change violates a transition or date-ordering rule.
    InvalidData {
        /// The offending field.
        field: FieldPath,
        /// Machine-readable reason.
        reason: String,
    },
    /// A required field is absent.
    MissingMandatory {
        /// The missing field.
        field: FieldPath,
    },
    /// A uniqueness constraint would be violated.
    ExistingData {
        /// The conflicting field.
        field: FieldPath,
        /// The entity holding the constraint.
        entity: String,
    },
    /// A referenced resource does not exist.
    NotFound {
        /// The resource kind.
        resource: String,
        /// The identifier that was looked up.
        id: String,
    },
    /// A collaborator failed unexpectedly.
    Internal {
        /// The operation that was being performed.
        operation: String,
        /// The underlying failure.
        message: String,
    },
    /// The caller's deadline passed before the operation could start.
    DeadlineExceeded {
        /// The operation that was skipped.
        operation: String,
    },
    /// An inbound payload could not be decoded.
    InvalidPayload(String),
}

impl CoreError {
    /// Wraps a collaborator failure with the calling operation's name.
    #[must_use]
    pub fn internal(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Internal {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    /// Reports a rule rejection against `field`.
    #[must_use]
    pub fn rejected(field: FieldPath, reason: RejectReason) -> Self {
        Self::InvalidData {
            field,
            reason: reason.as_str().to_string(),
        }
    }

    /// Reports a domain error against `field`.
    #[must_use]
    pub fn domain(field: FieldPath, err: &DomainError) -> Self {
        match err {
            DomainError::MissingField(_) => Self::MissingMandatory { field },
            DomainError::TransitionRejected(reason) => Self::rejected(field, *reason),
            other => Self::InvalidData {
                field,
                reason: other.to_string(),
            },
        }
    }

    /// Returns true if retrying the same input may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal { .. } | Self::DeadlineExceeded { .. })
    }

    /// The field path this error is reported against, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&FieldPath> {
        match self {
            Self::InvalidData { field, .. }
            | Self::MissingMandatory { field }
            | Self::ExistingData { field, .. } => Some(field),
            Self::NotFound { .. }
            | Self::Internal { .. }
            | Self::DeadlineExceeded { .. }
            | Self::InvalidPayload(_) => None,
        }
    }
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidData { field, reason } => {
                write!(f, "Invalid data at {field}: {reason}")
            }
            Self::MissingMandatory { field } => write!(f, "Missing mandatory field: {field}"),
            Self::ExistingData { field, entity } => {
                write!(f, "{entity} already has a record with this {field}")
            }
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::Internal { operation, message } => {
                write!(f, "Internal error in {operation}: {message}")
            }
            Self::DeadlineExceeded { operation } => {
                write!(f, "Deadline exceeded before {operation}")
            }
            Self::InvalidPayload(msg) => write!(f, "Invalid payload: {msg}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        let field: FieldPath = FieldPath::bare(err.field());
        Self::domain(field, &err)
    }
}

impl From<RepositoryError> for CoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { resource, id } => Self::NotFound { resource, id },
            RepositoryError::Conflict(_) => Self::ExistingData {
                field: FieldPath::bare(HistoryField::StartDate),
                entity: ENROLLMENT_STATUS_HISTORIES.to_string(),
            },
            RepositoryError::Storage(message) => Self::Internal {
                operation: String::from("repository"),
                message,
            },
        }
    }
}
