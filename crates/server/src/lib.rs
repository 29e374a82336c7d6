//! HTTP gateway for release updates.
//!
//! This crate provides the public endpoints:
//! - The latest version descriptor (`/v1/latest`)
//! - Release file redirects (`/v1/files/{version}/batect-{version}.jar`)
//! - Service endpoints (`/`, `/ping`, `/metrics`)

pub mod error;
pub mod guard;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;
pub mod trace;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use guard::require_method;
pub use routes::create_router;
pub use state::AppState;
pub use trace::TraceId;
