//! HTTP handlers for the rating service.

pub mod health;
pub mod metrics;
pub mod review;

pub use health::health_check;
pub use metrics::metrics_endpoint;
pub use review::predict_rating;
