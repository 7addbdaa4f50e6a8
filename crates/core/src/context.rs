// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::ports::RepositoryError;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use tracing::{error, warn};

/// Per-request inputs threaded through every enrollment operation.
///
/// `now` is captured once so every decision in a request sees the same
/// instant. The deadline is cooperative: it is checked before each
/// repository call and never interrupts one in flight.
#[derive(Debug, Clone)]
pub struct RequestContext {
    organization_id: String,
    now: OffsetDateTime,
    deadline: Option<Instant>,
}

impl RequestContext {
    #[must_use]
    pub fn new(organization_id: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            organization_id: organization_id.into(),
            now,
            deadline: None,
        }
    }

    /// Sets a deadline `timeout` from the moment of the call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Instant::now().checked_add(timeout);
        self
    }

    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    #[must_use]
    pub const fn now(&self) -> OffsetDateTime {
        self.now
    }

    /// # Errors
    ///
    /// Returns `CoreError::DeadlineExceeded` once the deadline has passed.
    pub fn check_deadline(&self, operation: &str) -> Result<(), CoreError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                warn!(operation, "deadline exceeded");
                Err(CoreError::DeadlineExceeded {
                    operation: operation.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Runs one repository call under the deadline, logging and wrapping
    /// storage failures with `operation`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DeadlineExceeded` if the deadline has passed, or
    /// the mapped repository failure.
    pub fn call<T, F>(&self, operation: &str, f: F) -> Result<T, CoreError>
    where
        F: FnOnce() -> Result<T, RepositoryError>,
    {
        self.check_deadline(operation)?;
        f().map_err(|err| {
            error!(operation, error = %err, "repository call failed");
            match err {
                RepositoryError::Storage(message) => CoreError::Internal {
                    operation: operation.to_string(),
                    message,
                },
                other => CoreError::from(other),
            }
        })
    }
}
