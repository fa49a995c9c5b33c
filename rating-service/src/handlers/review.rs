use crate::models::{Prediction, ReviewRequest};
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::extract::AppJson;

/// Predict the rating from a review
///
/// Responds with the classifier's output unchanged, e.g.
/// `[{"label": "5 stars", "score": 0.87}]`.
#[utoipa::path(
    post,
    path = "/review",
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Top prediction for the review", body = [Prediction]),
        (status = 422, description = "Body is not a JSON object with a string `review`"),
        (status = 500, description = "Classifier failed")
    ),
    tag = "Rating"
)]
pub async fn predict_rating(
    State(state): State<AppState>,
    AppJson(request): AppJson<ReviewRequest>,
) -> Result<Json<Vec<Prediction>>, AppError> {
    let predictions = state.classification.classify(request.review).await?;
    Ok(Json(predictions))
}
