use anyhow::Result;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::{app_state::AppState, swagger};

pub mod feedback;
pub mod notifications;
pub mod orders;

/// All routes plus the Swagger UI, with state applied.
pub fn app(state: AppState) -> Result<Router> {
    let routes = orders::routes_with_openapi()
        .merge(feedback::routes_with_openapi())
        .merge(notifications::routes_with_openapi());

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Chai House OrderService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    Ok(Router::new()
        .merge(routes)
        .merge(swagger_ui)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
