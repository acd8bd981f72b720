//! Type definitions shared by the HTTP layer
//!
//! - `response` - error envelope and health check payloads

pub mod response;

pub use response::{ErrorResponse, HealthResponse, HealthStatus};
