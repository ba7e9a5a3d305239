pub mod auth;
pub mod drain;
pub mod fault_injection;
pub mod logging;
pub mod metrics;
pub mod recovery;
pub mod sidecar_overhead;
pub mod timeout;
pub mod track;

pub use auth::{require_admin, AdminToken, ADMIN_TOKEN_HEADER};
pub use drain::drain_check;
pub use fault_injection::{inject_faults, FaultLayerState};
pub use logging::log_requests;
pub use metrics::{normalize_endpoint, record_metrics};
pub use recovery::recovery_layer;
pub use sidecar_overhead::request_overhead;
pub use timeout::request_timeout;
pub use track::track_requests;
