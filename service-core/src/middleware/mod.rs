pub mod metrics;
pub mod request_id;

pub use metrics::metrics_middleware;
pub use request_id::{REQUEST_ID_HEADER, RequestId, make_request_span, request_id_middleware};
