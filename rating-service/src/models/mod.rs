//! Request and response shapes for the rating service.

pub mod prediction;
pub mod review;

pub use prediction::Prediction;
pub use review::ReviewRequest;
