use axum::{extract::State, response::IntoResponse};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
        extract::{AppJson, AppPath, AppQuery},
    },
    domain::status::OrderStatus,
    services::{
        lookup::OrderView,
        status::{StatusChanged, TransitionReq},
        submission::{SubmitOrderReq, SubmittedOrder},
    },
    store::OrderFilter,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/orders",
        OpenApiRouter::new()
            .routes(utoipa_axum::routes!(get_orders, create_order))
            .routes(utoipa_axum::routes!(
                get_order,
                update_order_status,
                cancel_order
            )),
    )
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct OrderPath {
    /// Order ID
    pub id: i32,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// One of received, preparing, ready, completed, cancelled.
    pub status: Option<String>,
    pub order_number: Option<String>,
    pub phone: Option<String>,
    pub limit: Option<i64>,
}

impl ListOrdersQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(status) => Some(status.parse::<OrderStatus>()?),
        };

        Ok(OrderFilter {
            status,
            order_number: self.order_number,
            phone: self.phone,
            limit: self.limit,
        })
    }
}

/// List or search orders, newest first. Filters combine with AND.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Orders"],
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders matching the filters", body = StdResponse<Vec<OrderView>, String>)
    )
)]
async fn get_orders(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.into_filter()?;
    let orders = state.orders.list_orders(filter).await?;

    Ok(StdResponse::<_, String> {
        data: Some(orders),
        message: None,
    })
}

/// Fetch a specific order with its items.
#[utoipa::path(
    get,
    path = "/{id}",
    tags = ["Orders"],
    params(OrderPath),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<OrderView, String>),
        (status = 404, description = "No such order")
    )
)]
async fn get_order(
    AppPath(OrderPath { id }): AppPath<OrderPath>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let order = state.orders.get_order(id).await?;

    Ok(StdResponse {
        data: Some(order),
        message: Some("Get order successfully"),
    })
}

/// Place an order. Prices are taken from the menu, not from the request.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Orders"],
    request_body = SubmitOrderReq,
    responses(
        (status = 200, description = "Created order successfully", body = StdResponse<SubmittedOrder, String>),
        (status = 400, description = "Invalid order")
    )
)]
async fn create_order(
    State(state): State<AppState>,
    AppJson(body): AppJson<SubmitOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let submitted = state.orders.submit_order(body).await?;

    let message = if submitted.notification.delivered {
        "Created order successfully"
    } else {
        "Created order successfully, but the confirmation could not be sent"
    };

    Ok(StdResponse {
        data: Some(submitted),
        message: Some(message),
    })
}

/// Move an order to its next status, optionally setting an ETA.
#[utoipa::path(
    patch,
    path = "/{id}",
    tags = ["Orders"],
    params(OrderPath),
    request_body = TransitionReq,
    responses(
        (status = 200, description = "Order status updated", body = StdResponse<StatusChanged, String>),
        (status = 404, description = "No such order"),
        (status = 409, description = "Transition not allowed from the current status")
    )
)]
async fn update_order_status(
    AppPath(OrderPath { id }): AppPath<OrderPath>,
    State(state): State<AppState>,
    AppJson(body): AppJson<TransitionReq>,
) -> Result<impl IntoResponse, AppError> {
    let next: OrderStatus = body.status.trim().parse()?;
    let changed = state
        .orders
        .transition(id, next, body.estimated_completion_time)
        .await?;

    Ok(StdResponse {
        message: Some(status_message("Order status updated successfully", &changed)),
        data: Some(changed),
    })
}

/// Cancel an order. The order is kept with status `cancelled`.
#[utoipa::path(
    delete,
    path = "/{id}",
    tags = ["Orders"],
    params(OrderPath),
    responses(
        (status = 200, description = "Cancelled order successfully", body = StdResponse<StatusChanged, String>),
        (status = 404, description = "No such order"),
        (status = 409, description = "Order can no longer be cancelled")
    )
)]
async fn cancel_order(
    AppPath(OrderPath { id }): AppPath<OrderPath>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let changed = state.orders.cancel(id).await?;

    Ok(StdResponse {
        message: Some(status_message("Order cancelled successfully", &changed)),
        data: Some(changed),
    })
}

fn status_message(success: &str, changed: &StatusChanged) -> String {
    if changed.notification.delivered {
        success.to_string()
    } else {
        format!("{success}, but the customer notification failed")
    }
}
