use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::{
    Selectable,
    prelude::{AsChangeset, Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{
    errors::OrderError,
    status::OrderStatus,
};

// Menu

/// Catalog row. Owned by the menu service, read-only from here.
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::menu_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MenuItemEntity {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "2.50")]
    pub price: BigDecimal,
    pub category: String,
    pub image_url: String,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Orders

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub id: i32,
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub order_type: String,
    pub table_number: Option<String>,
    pub status: String,
    #[schema(value_type = String, example = "8.00")]
    pub total_amount: BigDecimal,
    pub special_instructions: Option<String>,
    pub estimated_completion_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderEntity {
    pub fn status(&self) -> Result<OrderStatus, OrderError> {
        self.status.parse()
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderEntity {
    pub order_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub order_type: String,
    pub table_number: Option<String>,
    pub status: String,
    pub total_amount: BigDecimal,
    pub special_instructions: Option<String>,
}

/// Columns touched by a status transition. A `None` ETA leaves the stored value alone.
#[derive(AsChangeset, Clone, Debug)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateOrderStatusEntity {
    pub status: String,
    pub estimated_completion_time: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemEntity {
    pub id: i32,
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "2.50")]
    pub price: BigDecimal,
    pub customizations: Value,
}

impl OrderItemEntity {
    /// Decodes the stored customization labels, keeping their original order.
    pub fn customization_labels(&self) -> Vec<String> {
        serde_json::from_value(self.customizations.clone()).unwrap_or_default()
    }
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOrderItemEntity {
    pub order_id: i32,
    pub menu_item_id: i32,
    pub quantity: i32,
    pub price: BigDecimal,
    pub customizations: Value,
}

// Feedback

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug, ToSchema)]
#[diesel(table_name = crate::schema::feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FeedbackEntity {
    pub id: i32,
    pub order_id: i32,
    pub food_quality_rating: i32,
    pub service_speed_rating: i32,
    pub value_rating: i32,
    pub overall_rating: i32,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateFeedbackEntity {
    pub order_id: i32,
    pub food_quality_rating: i32,
    pub service_speed_rating: i32,
    pub value_rating: i32,
    pub overall_rating: i32,
    pub comments: Option<String>,
}

// Outbox

#[derive(Queryable, Selectable, Identifiable, Serialize, Clone, Debug)]
#[diesel(table_name = crate::schema::outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEntity {
    pub id: i32,
    pub event_type: String,
    pub payload: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable, Clone, Debug)]
#[diesel(table_name = crate::schema::outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CreateOutboxEntity {
    pub event_type: String,
    pub payload: String,
    pub status: String,
}
