use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{
    CreatedOrder, MenuCatalog, OrderFilter, OrderStore, OutboxStatus, StatusChange, StoreError,
};
use crate::{
    domain::{pricing::OrderLine, status::OrderStatus},
    models::{
        CreateFeedbackEntity, CreateOrderEntity, CreateOutboxEntity, FeedbackEntity,
        MenuItemEntity, OrderEntity, OrderItemEntity, OutboxEntity,
    },
};

#[derive(Clone, Default)]
struct Tables {
    menu: HashMap<i32, MenuItemEntity>,
    orders: Vec<OrderEntity>,
    items: Vec<OrderItemEntity>,
    outbox: Vec<OutboxEntity>,
    feedback: Vec<FeedbackEntity>,
    next_order_id: i32,
    next_item_id: i32,
    next_outbox_id: i32,
    next_feedback_id: i32,
}

impl Tables {
    fn push_outbox(&mut self, event: CreateOutboxEntity) -> i32 {
        self.next_outbox_id += 1;
        let now = Utc::now();
        self.outbox.push(OutboxEntity {
            id: self.next_outbox_id,
            event_type: event.event_type,
            payload: event.payload,
            status: event.status,
            created_at: now,
            updated_at: now,
        });
        self.next_outbox_id
    }
}

/// In-process store. Every write runs against a scratch copy of the tables that
/// replaces the live copy only when the whole write succeeded.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_item_writes: AtomicBool,
    order_number_collisions: AtomicU32,
    concurrent_status: Mutex<Option<(i32, OrderStatus)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_menu(items: impl IntoIterator<Item = MenuItemEntity>) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.lock() {
            tables.menu = items.into_iter().map(|item| (item.id, item)).collect();
        }
        store
    }

    /// Makes order item writes fail after the order row has been written.
    pub fn fail_item_writes(&self, fail: bool) {
        self.fail_item_writes.store(fail, Ordering::SeqCst);
    }

    /// The next `count` order inserts fail as if their order number were taken.
    pub fn collide_order_numbers(&self, count: u32) {
        self.order_number_collisions.store(count, Ordering::SeqCst);
    }

    /// The next status change finds `order_id` already moved to `status` by another writer.
    pub fn move_before_next_status_change(&self, order_id: i32, status: OrderStatus) {
        if let Ok(mut pending) = self.concurrent_status.lock() {
            *pending = Some((order_id, status));
        }
    }

    pub fn outbox_events(&self) -> Vec<OutboxEntity> {
        self.tables
            .lock()
            .map(|tables| tables.outbox.clone())
            .unwrap_or_default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Other(anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl MenuCatalog for MemoryStore {
    async fn menu_items(&self, ids: &[i32]) -> Result<HashMap<i32, MenuItemEntity>, StoreError> {
        let tables = self.tables()?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.menu.get(id).map(|item| (*id, item.clone())))
            .collect())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(
        &self,
        order: CreateOrderEntity,
        lines: Vec<OrderLine>,
        event: CreateOutboxEntity,
    ) -> Result<CreatedOrder, StoreError> {
        let mut live = self.tables()?;
        let mut tx = live.clone();

        let collide = self
            .order_number_collisions
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if collide
            || tx
                .orders
                .iter()
                .any(|existing| existing.order_number == order.order_number)
        {
            return Err(StoreError::Duplicate("orders_order_number_key".into()));
        }

        tx.next_order_id += 1;
        let now = Utc::now();
        let order = OrderEntity {
            id: tx.next_order_id,
            order_number: order.order_number,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            customer_email: order.customer_email,
            order_type: order.order_type,
            table_number: order.table_number,
            status: order.status,
            total_amount: order.total_amount,
            special_instructions: order.special_instructions,
            estimated_completion_time: None,
            created_at: now,
            updated_at: now,
        };
        tx.orders.push(order.clone());

        if self.fail_item_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other(anyhow!("Failed to create order items")));
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            tx.next_item_id += 1;
            items.push(OrderItemEntity {
                id: tx.next_item_id,
                order_id: order.id,
                menu_item_id: line.menu_item_id,
                quantity: line.quantity,
                price: line.price,
                customizations: Value::from(line.customizations),
            });
        }
        tx.items.extend(items.iter().cloned());

        let outbox_id = tx.push_outbox(event);

        *live = tx;
        Ok(CreatedOrder {
            order,
            items,
            outbox_id,
        })
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderEntity>, StoreError> {
        let tables = self.tables()?;
        Ok(tables.orders.iter().find(|order| order.id == id).cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderEntity>, StoreError> {
        let tables = self.tables()?;
        let mut orders: Vec<OrderEntity> = tables
            .orders
            .iter()
            .filter(|order| {
                filter
                    .status
                    .is_none_or(|status| order.status == status.as_str())
            })
            .filter(|order| {
                filter
                    .order_number
                    .as_ref()
                    .is_none_or(|number| &order.order_number == number)
            })
            .filter(|order| {
                filter
                    .phone
                    .as_ref()
                    .is_none_or(|phone| order.customer_phone.as_ref() == Some(phone))
            })
            .cloned()
            .collect();

        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        if let Some(limit) = filter.limit {
            orders.truncate(usize::try_from(limit).unwrap_or(0));
        }

        Ok(orders)
    }

    async fn order_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemEntity>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .items
            .iter()
            .filter(|item| order_ids.contains(&item.order_id))
            .cloned()
            .collect())
    }

    async fn apply_status_change(
        &self,
        change: StatusChange,
    ) -> Result<Option<(OrderEntity, i32)>, StoreError> {
        let mut live = self.tables()?;

        let concurrent = self
            .concurrent_status
            .lock()
            .map_err(|_| StoreError::Other(anyhow!("memory store lock poisoned")))?
            .take();
        if let Some((order_id, status)) = concurrent {
            if let Some(order) = live.orders.iter_mut().find(|order| order.id == order_id) {
                order.status = status.as_str().to_string();
                order.updated_at = Utc::now();
            }
        }

        let mut tx = live.clone();

        let Some(order) = tx
            .orders
            .iter_mut()
            .find(|order| order.id == change.order_id && order.status == change.expected.as_str())
        else {
            return Ok(None);
        };

        order.status = change.update.status;
        if let Some(eta) = change.update.estimated_completion_time {
            order.estimated_completion_time = Some(eta);
        }
        order.updated_at = change.update.updated_at;
        let order = order.clone();

        let outbox_id = tx.push_outbox(change.event);

        *live = tx;
        Ok(Some((order, outbox_id)))
    }

    async fn mark_outbox(&self, id: i32, status: OutboxStatus) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if let Some(event) = tables.outbox.iter_mut().find(|event| event.id == id) {
            event.status = status.as_str().to_string();
            event.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_feedback(
        &self,
        feedback: CreateFeedbackEntity,
    ) -> Result<FeedbackEntity, StoreError> {
        let mut tables = self.tables()?;
        tables.next_feedback_id += 1;
        let row = FeedbackEntity {
            id: tables.next_feedback_id,
            order_id: feedback.order_id,
            food_quality_rating: feedback.food_quality_rating,
            service_speed_rating: feedback.service_speed_rating,
            value_rating: feedback.value_rating,
            overall_rating: feedback.overall_rating,
            comments: feedback.comments,
            created_at: Utc::now(),
        };
        tables.feedback.push(row.clone());
        Ok(row)
    }
}
