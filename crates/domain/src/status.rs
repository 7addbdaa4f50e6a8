// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment status catalog.
//!
//! A student holds exactly one enrollment status per location at any
//! instant. Statuses are grouped into classification sets that the
//! transition rules and the activation logic consult.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Prefix used by upstream systems when a status travels on the wire.
const WIRE_PREFIX: &str = "STUDENT_ENROLLMENT_STATUS_";

/// The enrollment status a student holds at a location.
///
/// The catalog is closed. Upstream values outside it, including the unset
/// `STUDENT_ENROLLMENT_STATUS_NONE`, fail to parse, so a stored row carrying
/// one is reported as malformed rather than entering a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EnrollmentStatus {
    /// Student declined; terminal lock for direct edits.
    NonPotential,
    /// Prospective student.
    Potential,
    /// Trial enrollment with an explicit end date.
    Temporary,
    /// Fully enrolled.
    Enrolled,
    /// Withdrawn from the location.
    Withdrawn,
    /// Graduated from the location.
    Graduated,
    /// Leave of absence.
    Loa,
}

impl EnrollmentStatus {
    /// Every status in the catalog, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::NonPotential,
        Self::Potential,
        Self::Temporary,
        Self::Enrolled,
        Self::Withdrawn,
        Self::Graduated,
        Self::Loa,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NonPotential => "non_potential",
            Self::Potential => "potential",
            Self::Temporary => "temporary",
            Self::Enrolled => "enrolled",
            Self::Withdrawn => "withdrawn",
            Self::Graduated => "graduated",
            Self::Loa => "loa",
        }
    }

    /// Parses a status from its persisted form or its upstream wire form
    /// (`STUDENT_ENROLLMENT_STATUS_ENROLLED`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidEnrollmentStatus` for unknown values.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let normalized: String = s
            .strip_prefix(WIRE_PREFIX)
            .unwrap_or(s)
            .to_ascii_lowercase();
        match normalized.as_str() {
            "non_potential" => Ok(Self::NonPotential),
            "potential" => Ok(Self::Potential),
            "temporary" => Ok(Self::Temporary),
            "enrolled" => Ok(Self::Enrolled),
            "withdrawn" => Ok(Self::Withdrawn),
            "graduated" => Ok(Self::Graduated),
            "loa" => Ok(Self::Loa),
            _ => Err(DomainError::InvalidEnrollmentStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if an active record with this status locks the timeline
    /// against any other status.
    #[must_use]
    pub const fn is_locked_terminal(&self) -> bool {
        matches!(self, Self::NonPotential)
    }

    /// Returns true if this status counts as an "activated" status.
    ///
    /// Only TEMPORARY is not activated: a student holding nothing but
    /// temporary windows is not considered enrolled anywhere.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        !matches!(self, Self::Temporary)
    }
}

impl FromStr for EnrollmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl TryFrom<String> for EnrollmentStatus {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_str(&value)
    }
}

impl From<EnrollmentStatus> for String {
    fn from(status: EnrollmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
