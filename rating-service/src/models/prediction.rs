use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One label with its confidence, as emitted by a text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Prediction {
    #[schema(example = "5 stars")]
    pub label: String,
    #[schema(example = 0.87)]
    pub score: f32,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}
