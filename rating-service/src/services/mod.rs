pub mod classification;
pub mod classifiers;
pub mod metrics;

pub use classification::ClassificationService;
pub use classifiers::{load_classifier, ClassifierError, TextClassifier};
pub use metrics::{get_metrics, init_metrics};
