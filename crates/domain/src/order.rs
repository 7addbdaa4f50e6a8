// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Order events consumed from the upstream order system.
//!
//! Orders are read-only inputs: they are translated into enrollment
//! status history changes by the order-flow handler.

use crate::error::DomainError;
use crate::history::EnrollmentStatusHistory;
use crate::status::EnrollmentStatus;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// The kind of order that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "ORDER_TYPE_NEW")]
    New,
    #[serde(rename = "ORDER_TYPE_ENROLLMENT")]
    Enrollment,
    #[serde(rename = "ORDER_TYPE_UPDATE")]
    Update,
    #[serde(rename = "ORDER_TYPE_WITHDRAWAL")]
    Withdrawal,
    #[serde(rename = "ORDER_TYPE_GRADUATE")]
    Graduate,
    #[serde(rename = "ORDER_TYPE_LOA")]
    Loa,
    #[serde(rename = "ORDER_TYPE_RESUME")]
    Resume,
    #[serde(rename = "ORDER_TYPE_PAUSE")]
    Pause,
    #[serde(rename = "ORDER_TYPE_CUSTOM_BILLING")]
    CustomBilling,
    /// Any order type this system does not act on.
    #[serde(other)]
    Unknown,
}

impl OrderType {
    /// The enrollment status an order of this type moves the student to.
    #[must_use]
    pub const fn target_status(&self) -> Option<EnrollmentStatus> {
        match self {
            Self::Enrollment | Self::Resume => Some(EnrollmentStatus::Enrolled),
            Self::Withdrawal => Some(EnrollmentStatus::Withdrawn),
            Self::Graduate => Some(EnrollmentStatus::Graduated),
            Self::Loa => Some(EnrollmentStatus::Loa),
            Self::New | Self::Update | Self::Pause | Self::CustomBilling | Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "ORDER_TYPE_NEW",
            Self::Enrollment => "ORDER_TYPE_ENROLLMENT",
            Self::Update => "ORDER_TYPE_UPDATE",
            Self::Withdrawal => "ORDER_TYPE_WITHDRAWAL",
            Self::Graduate => "ORDER_TYPE_GRADUATE",
            Self::Loa => "ORDER_TYPE_LOA",
            Self::Resume => "ORDER_TYPE_RESUME",
            Self::Pause => "ORDER_TYPE_PAUSE",
            Self::CustomBilling => "ORDER_TYPE_CUSTOM_BILLING",
            Self::Unknown => "ORDER_TYPE_UNKNOWN",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of the order that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "ORDER_STATUS_SUBMITTED")]
    Submitted,
    #[serde(rename = "ORDER_STATUS_PENDING")]
    Pending,
    #[serde(rename = "ORDER_STATUS_REJECTED")]
    Rejected,
    #[serde(rename = "ORDER_STATUS_VOIDED")]
    Voided,
    #[serde(rename = "ORDER_STATUS_INVOICED")]
    Invoiced,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "ORDER_STATUS_SUBMITTED",
            Self::Pending => "ORDER_STATUS_PENDING",
            Self::Rejected => "ORDER_STATUS_REJECTED",
            Self::Voided => "ORDER_STATUS_VOIDED",
            Self::Invoiced => "ORDER_STATUS_INVOICED",
            Self::Unknown => "ORDER_STATUS_UNKNOWN",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order event as published by the order system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEventLog {
    pub order_status: OrderStatus,
    pub order_type: OrderType,
    pub student_id: String,
    pub location_id: String,
    /// Further locations the same order touched.
    #[serde(default)]
    pub additional_location_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub enrollment_status: Option<EnrollmentStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    pub order_id: String,
    #[serde(default)]
    pub order_sequence_number: i32,
}

impl OrderEventLog {
    /// Every location this order touched, primary location first.
    #[must_use]
    pub fn touched_locations(&self) -> Vec<&str> {
        let mut locations: Vec<&str> = vec![self.location_id.as_str()];
        for location in &self.additional_location_ids {
            if !locations.contains(&location.as_str()) {
                locations.push(location);
            }
        }
        locations
    }

    /// Returns true if both dates are known and the start is after the end.
    #[must_use]
    pub fn has_inverted_dates(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if start > end)
    }

    /// Assembles the history record this order produces with `status`.
    ///
    /// A missing start date defaults to `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingField` if an identifier is empty.
    pub fn to_history(
        &self,
        status: EnrollmentStatus,
        organization_id: &str,
        now: OffsetDateTime,
    ) -> Result<EnrollmentStatusHistory, DomainError> {
        let mut builder = EnrollmentStatusHistory::builder(
            self.student_id.clone(),
            self.location_id.clone(),
            status,
        )
        .organization(organization_id)
        .start_date(self.start_date.unwrap_or(now))
        .end_date(self.end_date);
        if !self.order_id.is_empty() {
            builder = builder.order(self.order_id.clone(), self.order_sequence_number);
        }
        builder.build(now)
    }
}

/// Accepts unknown or empty status strings as "no status".
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<EnrollmentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.parse::<EnrollmentStatus>().ok()))
}
