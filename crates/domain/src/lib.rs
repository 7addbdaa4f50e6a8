// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod calendar;
mod error;
mod field;
mod history;
mod order;
mod settings;
mod status;
mod transition;
mod validation;

#[cfg(test)]
mod tests;

pub use calendar::{
    Calendar, STORAGE_RESOLUTION, end_before, truncate_to_second, truncate_to_storage,
};
pub use error::DomainError;
pub use field::{FieldPath, HistoryField};
pub use history::{EnrollmentStatusHistory, EnrollmentStatusHistoryBuilder, TimelineKey};
pub use order::{OrderEventLog, OrderStatus, OrderType};
pub use settings::{
    CONFIG_KEY_MANUAL_STATUS_UPDATE, CONFIG_VALUE_OFF,
    FEATURE_AUTO_DEACTIVATE_AND_REACTIVATE_STUDENTS_V2,
    FEATURE_CONFIGURATION_FROM_REPLICATED_TABLE, ORDER_FLOW_STATUSES, EnrollmentMode,
    EnrollmentSettings,
};
pub use status::EnrollmentStatus;
pub use transition::{RejectReason, Transition, TransitionPolicy, check_activated_status};
pub use validation::{validate_history_dates, validate_student_placement};
