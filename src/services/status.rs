use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{NotificationStatus, OrderService};
use crate::{
    core::outbox,
    domain::{errors::OrderError, status::OrderStatus},
    models::{OrderEntity, UpdateOrderStatusEntity},
    notifications::{NotificationKind, NotificationRequest},
    store::{StatusChange, StoreError},
};

/// How many times a transition is re-judged when another writer moved the order first.
const MAX_STATUS_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransitionReq {
    pub status: String,
    #[serde(default)]
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusChanged {
    pub order: OrderEntity,
    pub notification: NotificationStatus,
}

impl OrderService {
    /// Moves an order along the state machine. The write is conditional on the
    /// status read here, so two racing staff updates cannot both apply.
    pub async fn transition(
        &self,
        order_id: i32,
        next: OrderStatus,
        estimated_completion_time: Option<DateTime<Utc>>,
    ) -> Result<StatusChanged, OrderError> {
        let mut current = self.require_order(order_id).await?;

        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let from = current.status()?;
            from.transition(next)?;

            let request = NotificationRequest::status_update(&current, next, estimated_completion_time);
            let event = outbox::event(NotificationKind::StatusUpdate.as_str(), &request)
                .map_err(StoreError::from)?;

            let change = StatusChange {
                order_id,
                expected: from,
                update: UpdateOrderStatusEntity {
                    status: next.as_str().to_string(),
                    estimated_completion_time,
                    updated_at: Utc::now(),
                },
                event,
            };

            match self.store.apply_status_change(change).await? {
                Some((order, outbox_id)) => {
                    info!("Order #{} has moved from {} to {}", order.id, from, next);
                    let notification = self.dispatch_after_commit(outbox_id, &request).await;
                    return Ok(StatusChanged {
                        order,
                        notification,
                    });
                }
                None => {
                    warn!(
                        "Order #{} changed while moving it to {} (attempt {}), re-reading",
                        order_id, next, attempt
                    );
                    current = self.require_order(order_id).await?;
                }
            }
        }

        Err(StoreError::Other(anyhow::anyhow!(
            "order {order_id} kept changing during a status update"
        ))
        .into())
    }

    /// Cancellation is only allowed while the order is received or preparing.
    pub async fn cancel(&self, order_id: i32) -> Result<StatusChanged, OrderError> {
        self.transition(order_id, OrderStatus::Cancelled, None).await
    }

    pub(super) async fn require_order(&self, order_id: i32) -> Result<OrderEntity, OrderError> {
        self.store
            .find_order(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(format!("#{order_id}")))
    }
}
