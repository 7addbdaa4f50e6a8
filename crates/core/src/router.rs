// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::order_flow::{OrderFlowHandler, OrderOutcome};
use crate::ports::EnrollmentStore;
use enrollment_domain::{OrderEventLog, OrderStatus, OrderType, truncate_to_second};
use std::time::Duration;
use tracing::{debug, error};

/// Time budget for handling one order event.
pub const ORDER_EVENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatches decoded order events to the order-flow handler.
pub struct OrderEventRouter<'a, S> {
    handler: OrderFlowHandler<'a, S>,
}

impl<'a, S> OrderEventRouter<'a, S>
where
    S: EnrollmentStore + 'a,
{
    #[must_use]
    pub const fn new(handler: OrderFlowHandler<'a, S>) -> Self {
        Self { handler }
    }

    /// Decodes a JSON order event and routes it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPayload` if the payload cannot be decoded,
    /// or the handler's failure.
    pub fn route_json(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        payload: &[u8],
    ) -> Result<OrderOutcome, CoreError> {
        let event: OrderEventLog = serde_json::from_slice(payload).map_err(|err| {
            error!(error = %err, "order event could not be decoded");
            CoreError::InvalidPayload(err.to_string())
        })?;
        self.route(ctx, store, event)
    }

    /// Routes one order event by its status and type.
    ///
    /// A start date in the past is moved to the current second, so orders
    /// always take effect from the moment they are processed.
    ///
    /// # Errors
    ///
    /// Returns the handler's failure. Use [`CoreError::is_retryable`] to
    /// decide whether the event should be redelivered.
    pub fn route(
        &self,
        ctx: &RequestContext,
        store: &mut S,
        mut event: OrderEventLog,
    ) -> Result<OrderOutcome, CoreError> {
        if event.start_date.is_none_or(|start| start < ctx.now()) {
            event.start_date = Some(truncate_to_second(ctx.now()));
        }

        let result: Result<OrderOutcome, CoreError> = match (event.order_status, event.order_type)
        {
            (OrderStatus::Submitted, OrderType::Pause | OrderType::Update) => {
                Ok(OrderOutcome::Skipped("order type does not change enrollment"))
            }
            (
                OrderStatus::Submitted,
                OrderType::Enrollment
                | OrderType::Withdrawal
                | OrderType::Graduate
                | OrderType::Loa
                | OrderType::Resume,
            ) => self
                .handler
                .handle_enrollment_status_update(ctx, store, &event),
            (OrderStatus::Submitted, OrderType::New | OrderType::CustomBilling) => {
                let existing = ctx.call("get_by_student_and_location", || {
                    store.get_by_student_and_location(&event.student_id, &event.location_id, None)
                })?;
                if existing.is_empty() {
                    self.handler.handle_for_new_location(ctx, store, &event)
                } else {
                    self.handler.handle_existed_locations(ctx, store, &event)
                }
            }
            (
                OrderStatus::Voided,
                OrderType::Enrollment
                | OrderType::Withdrawal
                | OrderType::Graduate
                | OrderType::Loa
                | OrderType::New
                | OrderType::Resume,
            ) => self.handler.handle_void_enrollment_status(ctx, store, &event),
            _ => Ok(OrderOutcome::Skipped("order event not handled")),
        };

        match &result {
            Ok(outcome) => debug!(
                order_id = %event.order_id,
                order_status = %event.order_status,
                order_type = %event.order_type,
                ?outcome,
                "order event handled"
            ),
            Err(err) => error!(
                student_id = %event.student_id,
                location_id = %event.location_id,
                order_id = %event.order_id,
                order_status = %event.order_status,
                order_type = %event.order_type,
                retryable = err.is_retryable(),
                error = %err,
                "order event failed"
            ),
        }
        result
    }
}
