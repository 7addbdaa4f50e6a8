// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use color_eyre::Result;
use color_eyre::eyre::Context;
use enrollment::{
    BatchUpsertOrchestrator, BatchValidationManager, CoreError, EnrollmentModeResolver,
    ORDER_EVENT_TIMEOUT, OrderEventRouter, OrderFlowHandler, OrderOutcome, RequestContext,
    StudentActivationManager, StudentEnrollmentRequest, StudentPayload, TimelineReconciler,
    ValidatedBatch,
};
use enrollment_domain::{
    EnrollmentMode, EnrollmentSettings, EnrollmentStatusHistory, TransitionPolicy,
};
use enrollment_persistence::Persistence;
use std::path::Path;
use tracing::{info, warn};

use crate::settings::{FlagConfiguration, FlagToggles};

/// Everything a command needs to decide how an organization is configured.
pub struct Environment {
    pub settings: EnrollmentSettings,
    pub configuration: FlagConfiguration,
    pub toggles: FlagToggles,
}

impl Environment {
    fn mode(&mut self, ctx: &RequestContext) -> Result<EnrollmentMode> {
        Ok(EnrollmentModeResolver.resolve(ctx, &mut self.configuration, &self.toggles)?)
    }

    fn reconciler(&self, mode: EnrollmentMode) -> TimelineReconciler {
        TimelineReconciler::new(
            TransitionPolicy::from_settings(&self.settings, mode),
            *self.settings.calendar(),
        )
    }

    fn activation(&self, ctx: &RequestContext) -> StudentActivationManager {
        StudentActivationManager::from_toggle(&self.settings, &self.toggles, ctx.organization_id())
    }
}

/// Applies one order event read from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the event fails. The
/// report says whether the event should be redelivered.
pub fn sync_order(
    persistence: &mut Persistence,
    env: &mut Environment,
    ctx: &RequestContext,
    path: &Path,
) -> Result<()> {
    let payload: Vec<u8> =
        std::fs::read(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let ctx: RequestContext = ctx.clone().with_timeout(ORDER_EVENT_TIMEOUT);
    let mode: EnrollmentMode = env.mode(&ctx)?;
    if !mode.is_order_flow() {
        warn!(
            organization_id = ctx.organization_id(),
            "organization edits statuses directly, applying order anyway"
        );
    }
    let reconciler: TimelineReconciler = env.reconciler(EnrollmentMode::OrderFlow);
    let activation: StudentActivationManager = env.activation(&ctx);

    let result: Result<OrderOutcome> = persistence.transaction(|store| {
        let router = OrderEventRouter::new(OrderFlowHandler::with_activation(
            reconciler,
            &activation,
        ));
        Ok(router.route_json(&ctx, store, &payload)?)
    });

    match result {
        Ok(OrderOutcome::Applied) => {
            println!("applied");
            Ok(())
        }
        Ok(OrderOutcome::Skipped(reason)) => {
            println!("skipped: {reason}");
            Ok(())
        }
        Err(report) => {
            let retryable: bool = report
                .downcast_ref::<CoreError>()
                .is_none_or(CoreError::is_retryable);
            if retryable {
                Err(report.wrap_err("Order event failed and should be redelivered"))
            } else {
                Err(report.wrap_err("Order event rejected"))
            }
        }
    }
}

/// Validates and applies a batch of student enrollment changes read from
/// `path`.
///
/// Invalid students are reported and skipped; the valid ones are applied
/// in one transaction.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, or if applying
/// the accepted students fails.
pub fn upsert(
    persistence: &mut Persistence,
    env: &mut Environment,
    ctx: &RequestContext,
    path: &Path,
) -> Result<()> {
    let text: String = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let payloads: Vec<StudentPayload> = serde_json::from_str(&text)
        .wrap_err_with(|| format!("Failed to decode {}", path.display()))?;

    let mut errors: Vec<CoreError> = Vec::new();
    let mut requests: Vec<StudentEnrollmentRequest> = Vec::with_capacity(payloads.len());
    for (index, payload) in payloads.into_iter().enumerate() {
        match payload.into_request(index, ctx) {
            Ok(request) => requests.push(request),
            Err(err) => errors.push(err),
        }
    }

    let mode: EnrollmentMode = env.mode(ctx)?;
    let validator: BatchValidationManager = BatchValidationManager::new(
        env.reconciler(mode),
        env.settings.order_flow_statuses(),
    );
    let orchestrator: BatchUpsertOrchestrator = BatchUpsertOrchestrator::new(env.reconciler(mode));
    let activation: StudentActivationManager = env.activation(ctx);

    let batch: ValidatedBatch = persistence.transaction(|store| -> Result<ValidatedBatch> {
        let batch: ValidatedBatch = validator.validate(ctx, store, requests)?;
        let flags = orchestrator.upsert_many(ctx, store, &batch.accepted)?;
        activation.apply_flags(ctx, store, &flags)?;
        Ok(batch)
    })?;

    errors.extend(batch.errors);
    for err in &errors {
        println!("rejected: {err}");
    }
    info!(
        accepted = batch.accepted.len(),
        rejected = errors.len(),
        "batch processed"
    );
    println!("{} accepted, {} rejected", batch.accepted.len(), errors.len());
    Ok(())
}

/// Prints a student's stored timeline as JSON.
///
/// # Errors
///
/// Returns an error if the timeline cannot be read or encoded.
pub fn timeline(
    persistence: &mut Persistence,
    student_id: &str,
    location_id: Option<&str>,
) -> Result<()> {
    let records: Vec<EnrollmentStatusHistory> = persistence.timeline(student_id, location_id)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
