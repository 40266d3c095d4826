use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{app_error::AppError, app_state::AppState, extract::AppJson},
    notifications::{NotificationRequest, NotificationResults},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/notifications",
        OpenApiRouter::new().routes(utoipa_axum::routes!(send_notification)),
    )
}

#[derive(Serialize, ToSchema)]
pub struct SendNotificationRes {
    pub success: bool,
    pub results: NotificationResults,
}

/// Send an order confirmation or status update to the customer.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Notifications"],
    request_body = NotificationRequest,
    responses(
        (status = 200, description = "Per-channel delivery results", body = SendNotificationRes),
        (status = 502, description = "Notification gateway failed")
    )
)]
async fn send_notification(
    State(state): State<AppState>,
    AppJson(body): AppJson<NotificationRequest>,
) -> Result<Json<SendNotificationRes>, AppError> {
    let results = state.notifier.dispatch(&body).await?;

    Ok(Json(SendNotificationRes {
        success: true,
        results,
    }))
}
