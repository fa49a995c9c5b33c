//! Mock classifier for tests and local development.

use super::{ClassifierError, TextClassifier};
use crate::models::Prediction;
use std::time::Duration;

pub const MOCK_MODEL_ID: &str = "mock-star-rating";

const POSITIVE: &[&str] = &[
    "amazing",
    "best",
    "excellent",
    "good",
    "great",
    "love",
    "perfect",
    "wonderful",
];

const NEGATIVE: &[&str] = &[
    "awful", "bad", "broken", "horrible", "hate", "poor", "terrible", "worst",
];

/// Lexicon-based star rating classifier.
///
/// Counts positive and negative words and maps the balance onto the same
/// `"1 star"` .. `"5 stars"` labels the BERT sentiment model emits.
#[derive(Debug, Clone, Default)]
pub struct MockClassifier {
    latency: Option<Duration>,
    failing: bool,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long (blocking the thread) on every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every call with [`ClassifierError::Unavailable`].
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }
}

impl TextClassifier for MockClassifier {
    fn classify(&self, text: &str) -> Result<Vec<Prediction>, ClassifierError> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if self.failing {
            return Err(ClassifierError::Unavailable(
                "Mock classifier configured to fail".to_string(),
            ));
        }

        let balance: i32 = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| {
                let w = w.to_lowercase();
                if POSITIVE.contains(&w.as_str()) {
                    1
                } else if NEGATIVE.contains(&w.as_str()) {
                    -1
                } else {
                    0
                }
            })
            .sum();

        let stars = (3 + balance).clamp(1, 5) as u8;
        let score = 0.5 + 0.1 * balance.unsigned_abs().min(4) as f32;

        Ok(vec![Prediction::new(star_label(stars), score)])
    }

    fn model_id(&self) -> &str {
        MOCK_MODEL_ID
    }
}

fn star_label(stars: u8) -> String {
    if stars == 1 {
        "1 star".to_string()
    } else {
        format!("{} stars", stars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> String {
        MockClassifier::new().classify(text).unwrap()[0].label.clone()
    }

    #[test]
    fn neutral_text_is_three_stars() {
        assert_eq!(label("It arrived on Tuesday."), "3 stars");
        assert_eq!(label(""), "3 stars");
    }

    #[test]
    fn sentiment_moves_rating() {
        assert_eq!(label("Great product, I love it!"), "5 stars");
        assert_eq!(label("Terrible. Worst purchase, arrived broken."), "1 star");
        assert_eq!(label("Good but a bit poor on battery, good screen"), "4 stars");
    }

    #[test]
    fn score_is_a_probability() {
        let prediction = &MockClassifier::new()
            .classify("amazing amazing amazing amazing amazing amazing")
            .unwrap()[0];
        assert!(prediction.score > 0.0 && prediction.score <= 1.0);
    }

    #[test]
    fn repeated_calls_agree() {
        let classifier = MockClassifier::new();
        let text = "The best headphones I have owned";
        assert_eq!(
            classifier.classify(text).unwrap(),
            classifier.classify(text).unwrap()
        );
    }

    #[test]
    fn failing_mock_errors() {
        let err = MockClassifier::new().failing().classify("great").unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable(_)));
    }
}
