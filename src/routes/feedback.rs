use axum::{extract::State, response::IntoResponse};
use utoipa_axum::router::OpenApiRouter;

use crate::{
    core::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
        extract::AppJson,
    },
    models::FeedbackEntity,
    services::feedback::SubmitFeedbackReq,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    utoipa_axum::router::OpenApiRouter::new().nest(
        "/feedback",
        OpenApiRouter::new().routes(utoipa_axum::routes!(submit_feedback)),
    )
}

/// Rate a completed order.
#[utoipa::path(
    post,
    path = "/",
    tags = ["Feedback"],
    request_body = SubmitFeedbackReq,
    responses(
        (status = 200, description = "Feedback submitted successfully", body = StdResponse<FeedbackEntity, String>),
        (status = 404, description = "No such order"),
        (status = 409, description = "Order is not completed yet")
    )
)]
async fn submit_feedback(
    State(state): State<AppState>,
    AppJson(body): AppJson<SubmitFeedbackReq>,
) -> Result<impl IntoResponse, AppError> {
    let feedback = state.orders.submit_feedback(body).await?;

    Ok(StdResponse {
        data: Some(feedback),
        message: Some("Feedback submitted successfully"),
    })
}
