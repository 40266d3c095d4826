use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::OrderService;
use crate::{
    domain::{errors::OrderError, status::OrderStatus},
    models::{CreateFeedbackEntity, FeedbackEntity},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitFeedbackReq {
    pub order_id: i32,
    pub food_quality_rating: i32,
    pub service_speed_rating: i32,
    pub value_rating: i32,
    pub overall_rating: i32,
    #[serde(default)]
    pub comments: Option<String>,
}

fn validate_ratings(req: &SubmitFeedbackReq) -> Result<(), OrderError> {
    let ratings = [
        ("food_quality_rating", req.food_quality_rating),
        ("service_speed_rating", req.service_speed_rating),
        ("value_rating", req.value_rating),
        ("overall_rating", req.overall_rating),
    ];

    for (field, rating) in ratings {
        if !(1..=5).contains(&rating) {
            return Err(OrderError::validation(
                field,
                format!("rating must be between 1 and 5, got {rating}"),
            ));
        }
    }
    Ok(())
}

impl OrderService {
    pub async fn submit_feedback(
        &self,
        req: SubmitFeedbackReq,
    ) -> Result<FeedbackEntity, OrderError> {
        validate_ratings(&req)?;

        let order = self.require_order(req.order_id).await?;
        let status = order.status()?;
        if status != OrderStatus::Completed {
            return Err(OrderError::FeedbackNotAllowed(status));
        }

        let feedback = self
            .store
            .insert_feedback(CreateFeedbackEntity {
                order_id: order.id,
                food_quality_rating: req.food_quality_rating,
                service_speed_rating: req.service_speed_rating,
                value_rating: req.value_rating,
                overall_rating: req.overall_rating,
                comments: req
                    .comments
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            })
            .await?;

        info!(
            "Feedback #{} recorded for order #{} (overall {})",
            feedback.id, order.id, feedback.overall_rating
        );
        Ok(feedback)
    }
}
