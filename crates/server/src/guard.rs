//! Request method enforcement.

use crate::error::{ApiError, ApiResult};
use axum::http::Method;

/// Reject any request whose method is not `allowed`.
///
/// Handlers call this before doing anything else, so a rejected request has
/// no side effects.
pub fn require_method(allowed: Method, method: &Method) -> ApiResult<()> {
    if *method == allowed {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed { allowed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_method_passes() {
        assert!(require_method(Method::GET, &Method::GET).is_ok());
    }

    #[test]
    fn other_methods_are_rejected_with_allowed_method() {
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            match require_method(Method::GET, &method) {
                Err(ApiError::MethodNotAllowed { allowed }) => assert_eq!(allowed, Method::GET),
                other => panic!("expected MethodNotAllowed for {method}, got {other:?}"),
            }
        }
    }
}
