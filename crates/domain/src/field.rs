// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Machine-addressable field paths for client-facing errors.
//!
//! Every validation failure resolves to a path such as
//! `students[2].enrollment_status_histories.start_date` so the caller can
//! render the error against the exact offending record.

use serde::{Deserialize, Serialize};

/// A field of an enrollment status history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryField {
    StudentId,
    LocationId,
    OrganizationId,
    EnrollmentStatus,
    StartDate,
    EndDate,
    OrderId,
}

impl HistoryField {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StudentId => "student_id",
            Self::LocationId => "location_id",
            Self::OrganizationId => "organization_id",
            Self::EnrollmentStatus => "enrollment_status",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::OrderId => "order_id",
        }
    }
}

/// A dotted path into a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(String);

impl FieldPath {
    /// `students[i].enrollment_status_histories.<field>`
    #[must_use]
    pub fn history(student_index: usize, field: HistoryField) -> Self {
        Self(format!(
            "students[{student_index}].enrollment_status_histories.{}",
            field.as_str()
        ))
    }

    /// `students[i].enrollment_status_histories[j].<field>`
    #[must_use]
    pub fn history_entry(student_index: usize, entry_index: usize, field: HistoryField) -> Self {
        Self(format!(
            "students[{student_index}].enrollment_status_histories[{entry_index}].{}",
            field.as_str()
        ))
    }

    /// `students[i].<name>`
    #[must_use]
    pub fn student(student_index: usize, name: &str) -> Self {
        Self(format!("students[{student_index}].{name}"))
    }

    /// A bare top-level field name.
    #[must_use]
    pub fn bare(field: HistoryField) -> Self {
        Self(field.as_str().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
