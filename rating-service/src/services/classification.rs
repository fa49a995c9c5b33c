//! Dispatch of blocking classifier calls from async handlers.

use super::classifiers::TextClassifier;
use super::metrics::record_inference;
use crate::models::Prediction;
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;

/// Runs a [`TextClassifier`] on Tokio's blocking pool so slow inference never
/// stalls the runtime's worker threads.
#[derive(Clone)]
pub struct ClassificationService {
    classifier: Arc<dyn TextClassifier>,
}

impl ClassificationService {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }

    pub fn model_id(&self) -> &str {
        self.classifier.model_id()
    }

    pub async fn classify(&self, text: String) -> Result<Vec<Prediction>, AppError> {
        let classifier = self.classifier.clone();
        let chars = text.chars().count();

        let (result, elapsed) = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            let result = classifier.classify(&text);
            (result, start.elapsed())
        })
        .await?;

        record_inference(self.model_id(), elapsed, result.is_ok());

        match result {
            Ok(predictions) => {
                tracing::debug!(
                    model_id = %self.model_id(),
                    chars,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Classified review"
                );
                Ok(predictions)
            }
            Err(e) => {
                tracing::error!(
                    model_id = %self.model_id(),
                    chars,
                    error = %e,
                    "Classification failed"
                );
                Err(AppError::InternalError(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classifiers::MockClassifier;
    use std::time::Duration;

    #[tokio::test]
    async fn classify_returns_classifier_output() {
        let service = ClassificationService::new(Arc::new(MockClassifier::new()));
        let predictions = service.classify("great, I love it".to_string()).await.unwrap();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].label, "5 stars");
    }

    #[tokio::test]
    async fn classifier_failure_is_internal_error() {
        let service = ClassificationService::new(Arc::new(MockClassifier::new().failing()));
        let err = service.classify("anything".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::InternalError(_)));
    }

    // Current-thread runtime: a blocking classifier on the runtime thread would
    // serialize these calls.
    #[tokio::test(flavor = "current_thread")]
    async fn slow_calls_overlap() {
        let latency = Duration::from_millis(300);
        let service =
            ClassificationService::new(Arc::new(MockClassifier::new().with_latency(latency)));

        let start = Instant::now();
        let calls = (0..4).map(|i| {
            let service = service.clone();
            async move { service.classify(format!("review {}", i)).await }
        });
        let results = futures::future::join_all(calls).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert!(start.elapsed() < latency * 3);
    }
}
