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

mod activation;
mod collision;
mod context;
mod error;
mod mode;
mod order_flow;
mod ports;
mod reconcile;
mod router;
mod upsert;
mod validation;

#[cfg(test)]
mod tests;

pub use activation::{ActivationFlags, StudentActivationManager};
pub use collision::{resolve_for_store, resolve_start_date};
pub use context::RequestContext;
pub use error::{CoreError, ENROLLMENT_STATUS_HISTORIES};
pub use mode::EnrollmentModeResolver;
pub use order_flow::{
    OrderFlowHandler, OrderOutcome, ReactivateFn, SyncFn, sync_enrollment_status_history,
};
pub use ports::{
    ActivationWriter, ConfigError, ConfigurationSource, EnrollmentHistoryReader,
    EnrollmentHistoryWriter, EnrollmentStore, FeatureToggle, RepositoryError, StudentActivation,
    UserAccessPath, UserAccessPathWriter,
};
pub use reconcile::{Action, TimelineReconciler};
pub use router::{ORDER_EVENT_TIMEOUT, OrderEventRouter};
pub use upsert::{BatchUpsertOrchestrator, HistoryPayload, StudentEnrollmentRequest, StudentPayload};
pub use validation::{BatchValidationManager, ValidatedBatch, validate_histories_before_creating};
