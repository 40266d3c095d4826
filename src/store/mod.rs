//! Storage seams. Services only ever see [`OrderStore`] and [`MenuCatalog`];
//! the Postgres adapter backs the running service and the in-memory adapter
//! backs tests.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::{
    domain::{pricing::OrderLine, status::OrderStatus},
    models::{
        CreateFeedbackEntity, CreateOrderEntity, CreateOutboxEntity, FeedbackEntity,
        MenuItemEntity, OrderEntity, OrderItemEntity, UpdateOrderStatusEntity,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgOrderStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Duplicate(info.constraint_name().unwrap_or("unique").to_string())
            }
            other => StoreError::Other(other.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    Pending,
    Dispatched,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "PENDING",
            OutboxStatus::Dispatched => "DISPATCHED",
            OutboxStatus::Failed => "FAILED",
        }
    }
}

/// Conjunctive lookup filters. `None` means "don't filter on this".
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub order_number: Option<String>,
    pub phone: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: OrderEntity,
    pub items: Vec<OrderItemEntity>,
    pub outbox_id: i32,
}

/// A compare-and-set status update: it only applies while the order still has `expected`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub order_id: i32,
    pub expected: OrderStatus,
    pub update: UpdateOrderStatusEntity,
    pub event: CreateOutboxEntity,
}

#[async_trait]
pub trait MenuCatalog: Send + Sync {
    async fn menu_items(&self, ids: &[i32]) -> Result<HashMap<i32, MenuItemEntity>, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes the order, its items and the outbox row as one unit.
    async fn create_order(
        &self,
        order: CreateOrderEntity,
        lines: Vec<OrderLine>,
        event: CreateOutboxEntity,
    ) -> Result<CreatedOrder, StoreError>;

    async fn find_order(&self, id: i32) -> Result<Option<OrderEntity>, StoreError>;

    /// Newest first.
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderEntity>, StoreError>;

    async fn order_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemEntity>, StoreError>;

    /// Returns `None` when the order is gone or no longer in `change.expected`.
    async fn apply_status_change(
        &self,
        change: StatusChange,
    ) -> Result<Option<(OrderEntity, i32)>, StoreError>;

    async fn mark_outbox(&self, id: i32, status: OutboxStatus) -> Result<(), StoreError>;

    async fn insert_feedback(
        &self,
        feedback: CreateFeedbackEntity,
    ) -> Result<FeedbackEntity, StoreError>;
}
