use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /review`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReviewRequest {
    #[schema(example = "Great product, works perfectly")]
    pub review: String,
}
