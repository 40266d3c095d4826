//! Customer notifications. Delivery itself belongs to an external gateway; this
//! module owns the request shape, message rendering and the dispatcher seam.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::status::OrderStatus, models::OrderEntity};

pub mod templates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OrderConfirmation,
    StatusUpdate,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::OrderConfirmation => "order_confirmation",
            NotificationKind::StatusUpdate => "status_update",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderDetails {
    pub order_number: String,
    #[schema(value_type = String, example = "8.00")]
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body of `POST /notifications`, and the payload stored in the outbox.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub phone: bool,
    pub order_details: OrderDetails,
    pub customer_info: CustomerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl NotificationRequest {
    pub fn order_confirmation(order: &OrderEntity) -> Self {
        Self::for_order(NotificationKind::OrderConfirmation, order, OrderStatus::Received, None)
    }

    pub fn status_update(
        order: &OrderEntity,
        status: OrderStatus,
        eta: Option<DateTime<Utc>>,
    ) -> Self {
        let mut request = Self::for_order(NotificationKind::StatusUpdate, order, status, eta);
        request.status = Some(status);
        request
    }

    fn for_order(
        kind: NotificationKind,
        order: &OrderEntity,
        status: OrderStatus,
        eta: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind,
            email: order.customer_email.is_some(),
            phone: order.customer_phone.is_some(),
            order_details: OrderDetails {
                order_number: order.order_number.clone(),
                total_amount: order.total_amount.clone(),
                status,
                estimated_completion_time: eta.or(order.estimated_completion_time),
            },
            customer_info: CustomerInfo {
                name: order.customer_name.clone(),
                email: order.customer_email.clone(),
                phone: order.customer_phone.clone(),
            },
            status: None,
        }
    }

    /// The status the customer is told about.
    pub fn effective_status(&self) -> OrderStatus {
        self.status.unwrap_or(self.order_details.status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelResult {
    pub attempted: bool,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelResult {
    pub fn skipped() -> Self {
        Self::default()
    }

    pub fn sent() -> Self {
        Self {
            attempted: true,
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            attempted: true,
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationResults {
    pub email: ChannelResult,
    pub sms: ChannelResult,
}

impl NotificationResults {
    /// Delivered when any attempted channel got through, or when nothing applied.
    pub fn delivered(&self) -> bool {
        let attempted = [&self.email, &self.sms]
            .into_iter()
            .filter(|channel| channel.attempted)
            .collect::<Vec<_>>();

        attempted.is_empty() || attempted.iter().any(|channel| channel.success)
    }

    pub fn first_error(&self) -> Option<&str> {
        self.email.error.as_deref().or(self.sms.error.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Notification gateway unreachable: {0}")]
    GatewayUnreachable(String),

    #[error("Notification gateway rejected the message with status {0}")]
    GatewayRejected(u16),

    #[error("Status update notifications need a status")]
    MissingStatus,
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        request: &NotificationRequest,
    ) -> Result<NotificationResults, NotificationError>;
}
