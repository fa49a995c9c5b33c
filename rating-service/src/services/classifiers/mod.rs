//! Text classifier abstractions and implementations.
//!
//! Classifiers are synchronous and CPU-bound. Callers on the async runtime go
//! through [`ClassificationService`](crate::services::ClassificationService),
//! which moves the call onto the blocking pool.

pub mod bert;
pub mod mock;

use crate::config::{ModelBackend, ModelConfig};
use crate::models::Prediction;
use std::sync::Arc;
use thiserror::Error;

pub use bert::BertClassifier;
pub use mock::MockClassifier;

/// Error type for classifier operations.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Model files unavailable: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model config: {0}")]
    InvalidConfig(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("Inference error: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("Classifier unavailable: {0}")]
    Unavailable(String),
}

/// A model mapping text to labelled confidence scores.
pub trait TextClassifier: Send + Sync {
    /// Classify one text, returning predictions ordered by descending score.
    ///
    /// Blocks the calling thread for the duration of inference.
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, ClassifierError>;

    /// Identifier of the underlying model, used in logs and metrics.
    fn model_id(&self) -> &str;
}

/// Builds the classifier selected by `config`. Blocking: may download weights.
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn TextClassifier>, ClassifierError> {
    match config.backend {
        ModelBackend::Bert => Ok(Arc::new(BertClassifier::load(config)?)),
        ModelBackend::Mock => Ok(Arc::new(MockClassifier::new())),
    }
}

/// Picks the highest-probability label. `None` when there are no scores or
/// the scores and labels disagree in length.
pub(crate) fn top_prediction(probs: &[f32], labels: &[String]) -> Option<Prediction> {
    if probs.is_empty() || probs.len() != labels.len() {
        return None;
    }

    // Strict comparison so the first label wins ties, as argmax does.
    probs
        .iter()
        .enumerate()
        .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
        .map(|(idx, score)| Prediction::new(labels[idx].clone(), *score))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stars() -> Vec<String> {
        ["1 star", "2 stars", "3 stars", "4 stars", "5 stars"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn top_prediction_picks_argmax() {
        let probs = [0.05, 0.05, 0.1, 0.2, 0.6];
        let top = top_prediction(&probs, &stars()).unwrap();
        assert_eq!(top, Prediction::new("5 stars", 0.6));
    }

    #[test]
    fn top_prediction_first_wins_on_tie() {
        let probs = [0.4, 0.4, 0.1, 0.05, 0.05];
        let top = top_prediction(&probs, &stars()).unwrap();
        assert_eq!(top.label, "1 star");
    }

    #[test]
    fn top_prediction_rejects_length_mismatch() {
        assert!(top_prediction(&[1.0], &stars()).is_none());
        assert!(top_prediction(&[], &[]).is_none());
    }

    #[test]
    fn mock_backend_loads_without_weights() {
        let config = ModelConfig {
            backend: ModelBackend::Mock,
            model_id: "unused".to_string(),
            revision: "main".to_string(),
            local_path: None,
            cache_dir: None,
        };
        let classifier = load_classifier(&config).unwrap();
        assert_eq!(classifier.model_id(), mock::MOCK_MODEL_ID);
    }
}
