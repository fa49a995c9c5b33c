pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Rating Prediction API"),
    paths(handlers::review::predict_rating, handlers::health::health_check),
    components(schemas(models::ReviewRequest, models::Prediction)),
    tags(
        (name = "Rating", description = "Star rating prediction from review text"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;
