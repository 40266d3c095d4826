use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use super::OrderService;
use crate::{
    domain::errors::OrderError,
    models::{MenuItemEntity, OrderEntity, OrderItemEntity},
    store::OrderFilter,
};

/// Current catalog data shown next to an item. The charged price stays `OrderItemView::price`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MenuItemSummary {
    pub name: String,
    #[schema(value_type = String, example = "2.50")]
    pub price: BigDecimal,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderItemView {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "2.50")]
    pub price: BigDecimal,
    pub customizations: Vec<String>,
    pub menu_item: Option<MenuItemSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: OrderEntity,
    pub items: Vec<OrderItemView>,
}

impl OrderService {
    /// Orders matching every given filter, newest first.
    pub async fn list_orders(&self, mut filter: OrderFilter) -> Result<Vec<OrderView>, OrderError> {
        if let Some(limit) = filter.limit {
            if limit < 1 {
                return Err(OrderError::validation(
                    "limit",
                    format!("limit must be at least 1, got {limit}"),
                ));
            }
        }
        filter.order_number = filter
            .order_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        filter.phone = filter
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let orders = self.store.list_orders(&filter).await?;
        self.with_items(orders).await
    }

    pub async fn get_order(&self, order_id: i32) -> Result<OrderView, OrderError> {
        let order = self.require_order(order_id).await?;
        let mut views = self.with_items(vec![order]).await?;
        views
            .pop()
            .ok_or_else(|| OrderError::NotFound(format!("#{order_id}")))
    }

    async fn with_items(&self, orders: Vec<OrderEntity>) -> Result<Vec<OrderView>, OrderError> {
        if orders.is_empty() {
            return Ok(vec![]);
        }

        let order_ids: Vec<i32> = orders.iter().map(|order| order.id).collect();
        let items = self.store.order_items(&order_ids).await?;

        let mut menu_ids: Vec<i32> = items.iter().map(|item| item.menu_item_id).collect();
        menu_ids.sort_unstable();
        menu_ids.dedup();

        // Display data only; tracking still works while the catalog is down.
        let menu = self
            .catalog
            .menu_items(&menu_ids)
            .await
            .unwrap_or_else(|err| {
                warn!("Failed to resolve menu items for order lookup: {}", err);
                HashMap::new()
            });

        let mut group: HashMap<i32, Vec<OrderItemView>> = HashMap::new();
        for item in items {
            group
                .entry(item.order_id)
                .or_default()
                .push(item_view(item, &menu));
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = group.remove(&order.id).unwrap_or_default();
                OrderView { order, items }
            })
            .collect())
    }
}

fn item_view(item: OrderItemEntity, menu: &HashMap<i32, MenuItemEntity>) -> OrderItemView {
    let customizations = item.customization_labels();
    let menu_item = menu.get(&item.menu_item_id).map(|m| MenuItemSummary {
        name: m.name.clone(),
        price: m.price.clone(),
        category: m.category.clone(),
    });

    OrderItemView {
        id: item.id,
        order_id: item.order_id,
        menu_item_id: item.menu_item_id,
        quantity: item.quantity,
        price: item.price,
        customizations,
        menu_item,
    }
}
