//! HTTP plumbing for hotpod: API error types and the middleware pipeline
//! that wraps every handler (timeout, drain check, in-flight tracking,
//! metrics, fault injection, panic recovery, request logging, admin auth).

pub mod errors;
pub mod middleware;

pub use errors::{ApiError, ApiResult};
