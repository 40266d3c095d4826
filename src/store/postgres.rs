use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde_json::Value;

use super::{
    CreatedOrder, MenuCatalog, OrderFilter, OrderStore, OutboxStatus, StatusChange, StoreError,
};
use crate::{
    core::db::DbPool,
    domain::pricing::OrderLine,
    models::{
        CreateFeedbackEntity, CreateOrderEntity, CreateOrderItemEntity, CreateOutboxEntity,
        FeedbackEntity, MenuItemEntity, OrderEntity, OrderItemEntity,
    },
    schema::{feedback, menu_items, order_items, orders, outbox},
};

/// Order store over a bb8 pool of async Postgres connections.
#[derive(Clone)]
pub struct PgOrderStore {
    pool: DbPool,
}

impl PgOrderStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuCatalog for PgOrderStore {
    async fn menu_items(&self, ids: &[i32]) -> Result<HashMap<i32, MenuItemEntity>, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let items: Vec<MenuItemEntity> = menu_items::table
            .filter(menu_items::id.eq_any(ids.to_vec()))
            .select(MenuItemEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get menu items")?;

        Ok(items.into_iter().map(|item| (item.id, item)).collect())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(
        &self,
        order: CreateOrderEntity,
        lines: Vec<OrderLine>,
        event: CreateOutboxEntity,
    ) -> Result<CreatedOrder, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        conn.transaction(move |conn| {
            Box::pin(async move {
                // No context here: a unique violation must surface as StoreError::Duplicate.
                let order: OrderEntity = diesel::insert_into(orders::table)
                    .values(&order)
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await?;

                let rows: Vec<CreateOrderItemEntity> = lines
                    .into_iter()
                    .map(|line| CreateOrderItemEntity {
                        order_id: order.id,
                        menu_item_id: line.menu_item_id,
                        quantity: line.quantity,
                        price: line.price,
                        customizations: Value::from(line.customizations),
                    })
                    .collect();

                let items: Vec<OrderItemEntity> = diesel::insert_into(order_items::table)
                    .values(&rows)
                    .returning(OrderItemEntity::as_returning())
                    .get_results(conn)
                    .await
                    .context("Failed to create order items")?;

                let outbox_id: i32 = diesel::insert_into(outbox::table)
                    .values(&event)
                    .returning(outbox::id)
                    .get_result(conn)
                    .await
                    .context("Failed to write outbox event")?;

                Ok::<CreatedOrder, StoreError>(CreatedOrder {
                    order,
                    items,
                    outbox_id,
                })
            })
        })
        .await
    }

    async fn find_order(&self, id: i32) -> Result<Option<OrderEntity>, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let order = orders::table
            .find(id)
            .select(OrderEntity::as_select())
            .get_result(conn)
            .await
            .optional()
            .context("Failed to get order")?;

        Ok(order)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderEntity>, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let mut query = orders::table.into_boxed();

        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status.as_str()));
        }
        if let Some(order_number) = &filter.order_number {
            query = query.filter(orders::order_number.eq(order_number.clone()));
        }
        if let Some(phone) = &filter.phone {
            query = query.filter(orders::customer_phone.eq(phone.clone()));
        }

        query = query
            .order_by(orders::created_at.desc())
            .then_order_by(orders::id.desc());

        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let orders: Vec<OrderEntity> = query
            .select(OrderEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get orders")?;

        Ok(orders)
    }

    async fn order_items(&self, order_ids: &[i32]) -> Result<Vec<OrderItemEntity>, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let items: Vec<OrderItemEntity> = order_items::table
            .filter(order_items::order_id.eq_any(order_ids.to_vec()))
            .order_by(order_items::id.asc())
            .select(OrderItemEntity::as_select())
            .get_results(conn)
            .await
            .context("Failed to get order items")?;

        Ok(items)
    }

    async fn apply_status_change(
        &self,
        change: StatusChange,
    ) -> Result<Option<(OrderEntity, i32)>, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let StatusChange {
            order_id,
            expected,
            update,
            event,
        } = change;

        conn.transaction(move |conn| {
            Box::pin(async move {
                let updated: Option<OrderEntity> = diesel::update(
                    orders::table
                        .find(order_id)
                        .filter(orders::status.eq(expected.as_str())),
                )
                .set(&update)
                .returning(OrderEntity::as_returning())
                .get_result(conn)
                .await
                .optional()
                .context("Failed to update order status")?;

                let Some(order) = updated else {
                    return Ok(None);
                };

                let outbox_id: i32 = diesel::insert_into(outbox::table)
                    .values(&event)
                    .returning(outbox::id)
                    .get_result(conn)
                    .await
                    .context("Failed to write outbox event")?;

                Ok::<Option<(OrderEntity, i32)>, StoreError>(Some((order, outbox_id)))
            })
        })
        .await
    }

    async fn mark_outbox(&self, id: i32, status: OutboxStatus) -> Result<(), StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::update(outbox::table.find(id))
            .set((
                outbox::status.eq(status.as_str()),
                outbox::updated_at.eq(Utc::now()),
            ))
            .execute(conn)
            .await
            .context("Failed to update outbox status")?;

        Ok(())
    }

    async fn insert_feedback(
        &self,
        new_feedback: CreateFeedbackEntity,
    ) -> Result<FeedbackEntity, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let feedback = diesel::insert_into(feedback::table)
            .values(&new_feedback)
            .returning(FeedbackEntity::as_returning())
            .get_result(conn)
            .await
            .context("Failed to create feedback")?;

        Ok(feedback)
    }
}
