//! Order workflows: submission, status transitions, lookup and feedback.
//!
//! Every write follows the same shape: validate, commit the change together
//! with its outbox row, then dispatch the notification and record the outcome
//! on that row. A failed dispatch is reported to the caller but never undoes
//! the commit.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    core::config::OrderSettings,
    notifications::{NotificationDispatcher, NotificationRequest},
    store::{MenuCatalog, OrderStore, OutboxStatus},
};

pub mod feedback;
pub mod lookup;
pub mod status;
pub mod submission;

/// Outcome of the post-commit notification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NotificationStatus {
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn MenuCatalog>,
    notifier: Arc<dyn NotificationDispatcher>,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn MenuCatalog>,
        notifier: Arc<dyn NotificationDispatcher>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            notifier,
            settings,
        }
    }

    async fn dispatch_after_commit(
        &self,
        outbox_id: i32,
        request: &NotificationRequest,
    ) -> NotificationStatus {
        let number = &request.order_details.order_number;

        let status = match self.notifier.dispatch(request).await {
            Ok(results) if results.delivered() => NotificationStatus {
                delivered: true,
                error: None,
            },
            Ok(results) => NotificationStatus {
                delivered: false,
                error: Some(
                    results
                        .first_error()
                        .unwrap_or("notification not delivered")
                        .to_string(),
                ),
            },
            Err(err) => NotificationStatus {
                delivered: false,
                error: Some(err.to_string()),
            },
        };

        let outbox_status = if status.delivered {
            info!(
                "Dispatched {} notification for order #{}",
                request.kind.as_str(),
                number
            );
            OutboxStatus::Dispatched
        } else {
            warn!(
                "{} notification for order #{} failed: {}",
                request.kind.as_str(),
                number,
                status.error.as_deref().unwrap_or_default()
            );
            OutboxStatus::Failed
        };

        if let Err(err) = self.store.mark_outbox(outbox_id, outbox_status).await {
            warn!("Failed to mark outbox event {}: {:#}", outbox_id, err);
        }

        status
    }
}
