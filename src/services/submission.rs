use std::collections::HashMap;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use super::{NotificationStatus, OrderService};
use crate::{
    core::outbox,
    domain::{
        errors::OrderError,
        order_number,
        pricing::{self, OrderLine},
        status::{OrderStatus, OrderType},
    },
    models::{CreateOrderEntity, MenuItemEntity},
    notifications::{CustomerInfo, NotificationKind, NotificationRequest, OrderDetails},
    store::{CreatedOrder, StoreError},
};

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SubmitOrderReq {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub items: Vec<SubmitOrderItem>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SubmitOrderItem {
    pub menu_item_id: i32,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: i32,
    /// Informational only; the catalog price is what gets charged.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "2.50")]
    pub price: Option<BigDecimal>,
    #[serde(default)]
    pub customizations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubmittedOrder {
    pub order_id: i32,
    pub order_number: String,
    #[schema(value_type = String, example = "8.00")]
    pub total_amount: BigDecimal,
    pub estimated_time: String,
    pub notification: NotificationStatus,
}

/// Customer fields after trimming; blanks count as absent.
struct Customer {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    order_type: OrderType,
    table_number: Option<String>,
    special_instructions: Option<String>,
}

fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_customer(req: &SubmitOrderReq) -> Result<Customer, OrderError> {
    let order_type: OrderType = normalized(req.order_type.clone())
        .ok_or_else(|| OrderError::validation("order_type", "order_type is required"))?
        .parse()?;

    let customer = Customer {
        name: normalized(req.customer_name.clone()),
        phone: normalized(req.customer_phone.clone()),
        email: normalized(req.customer_email.clone()),
        order_type,
        table_number: normalized(req.table_number.clone()),
        special_instructions: normalized(req.special_instructions.clone()),
    };

    match customer.order_type {
        OrderType::DineIn if customer.table_number.is_none() => {
            return Err(OrderError::validation(
                "table_number",
                "table_number is required for dine-in orders",
            ));
        }
        OrderType::Takeaway if customer.name.is_none() => {
            return Err(OrderError::validation(
                "customer_name",
                "customer_name is required for takeaway orders",
            ));
        }
        _ => {}
    }

    if let Some(email) = &customer.email {
        if !email.contains('@') {
            return Err(OrderError::validation(
                "customer_email",
                format!("'{email}' is not a valid email address"),
            ));
        }
    }

    Ok(customer)
}

fn validate_items(items: &[SubmitOrderItem]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::validation(
            "items",
            "an order needs at least one item",
        ));
    }

    for (index, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(OrderError::validation(
                format!("items[{index}].quantity"),
                format!("quantity must be at least 1, got {}", item.quantity),
            ));
        }
    }

    Ok(())
}

/// Prices every line from the catalog. A client price that disagrees is replaced, not rejected.
fn price_lines(
    items: Vec<SubmitOrderItem>,
    menu: &HashMap<i32, MenuItemEntity>,
) -> Result<Vec<OrderLine>, OrderError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let field = || format!("items[{index}].menu_item_id");

            let menu_item = menu.get(&item.menu_item_id).ok_or_else(|| {
                OrderError::validation(
                    field(),
                    format!("menu item {} does not exist", item.menu_item_id),
                )
            })?;

            if !menu_item.is_available {
                return Err(OrderError::validation(
                    field(),
                    format!("{} is currently unavailable", menu_item.name),
                ));
            }

            if let Some(client_price) = &item.price {
                if client_price != &menu_item.price {
                    warn!(
                        "Client sent price {} for menu item {}, charging catalog price {}",
                        client_price, menu_item.id, menu_item.price
                    );
                }
            }

            Ok(OrderLine {
                menu_item_id: menu_item.id,
                name: menu_item.name.clone(),
                quantity: item.quantity,
                price: menu_item.price.clone(),
                customizations: item.customizations,
            })
        })
        .collect()
}

impl OrderService {
    /// Validates and prices the cart, then writes order, items and the confirmation
    /// outbox row in one transaction before notifying the customer.
    pub async fn submit_order(&self, req: SubmitOrderReq) -> Result<SubmittedOrder, OrderError> {
        let customer = validate_customer(&req)?;
        validate_items(&req.items)?;

        let mut ids: Vec<i32> = req.items.iter().map(|item| item.menu_item_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let menu = self.catalog.menu_items(&ids).await?;

        let lines = price_lines(req.items, &menu)?;
        let total_amount = pricing::order_total(&lines);

        let mut attempt = 0;
        let created = loop {
            attempt += 1;

            let order = CreateOrderEntity {
                order_number: order_number::generate(&self.settings.order_number_prefix),
                customer_name: customer.name.clone(),
                customer_phone: customer.phone.clone(),
                customer_email: customer.email.clone(),
                order_type: customer.order_type.as_str().to_string(),
                table_number: customer.table_number.clone(),
                status: OrderStatus::Received.as_str().to_string(),
                total_amount: total_amount.clone(),
                special_instructions: customer.special_instructions.clone(),
            };
            let event = outbox::event(
                NotificationKind::OrderConfirmation.as_str(),
                &confirmation_preview(&order),
            )
            .map_err(StoreError::from)?;

            match self.store.create_order(order, lines.clone(), event).await {
                Ok(created) => break created,
                Err(StoreError::Duplicate(constraint)) if attempt < order_number::MAX_ATTEMPTS => {
                    warn!(
                        "Order number collided on {} (attempt {}), regenerating",
                        constraint, attempt
                    );
                }
                Err(err) => return Err(err.into()),
            }
        };

        let CreatedOrder {
            order,
            items,
            outbox_id,
        } = created;
        info!(
            "Order #{} ({}) has been received with {} items, total {}",
            order.id,
            order.order_number,
            items.len(),
            order.total_amount
        );

        let request = NotificationRequest::order_confirmation(&order);
        let notification = self.dispatch_after_commit(outbox_id, &request).await;

        Ok(SubmittedOrder {
            order_id: order.id,
            order_number: order.order_number,
            total_amount: order.total_amount,
            estimated_time: self.settings.estimated_time.clone(),
            notification,
        })
    }
}

/// The confirmation payload as it will look once the row exists; the outbox row
/// is written before the order id is known.
fn confirmation_preview(order: &CreateOrderEntity) -> NotificationRequest {
    NotificationRequest {
        kind: NotificationKind::OrderConfirmation,
        email: order.customer_email.is_some(),
        phone: order.customer_phone.is_some(),
        order_details: OrderDetails {
            order_number: order.order_number.clone(),
            total_amount: order.total_amount.clone(),
            status: OrderStatus::Received,
            estimated_completion_time: None,
        },
        customer_info: CustomerInfo {
            name: order.customer_name.clone(),
            email: order.customer_email.clone(),
            phone: order.customer_phone.clone(),
        },
        status: None,
    }
}
