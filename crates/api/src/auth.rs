//! Bearer-token guard for admin routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use subtle::ConstantTimeEq;

use crate::error::ApiError;

/// The configured admin token, if any.
#[derive(Debug, Clone, Default)]
pub struct AdminAuth {
    token: Option<Arc<str>>,
}

impl AdminAuth {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }

    /// Compares in constant time. Always false when no token is configured.
    fn allows(&self, candidate: &str) -> bool {
        match &self.token {
            Some(token) => bool::from(token.as_bytes().ct_eq(candidate.as_bytes())),
            None => false,
        }
    }
}

/// Rejects requests without `Authorization: Bearer <ADMIN_TOKEN>`.
pub async fn require_admin(State(auth): State<AdminAuth>, req: Request, next: Next) -> Response {
    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => {
            tracing::warn!(path = %req.uri().path(), "rejected admin request");
            ApiError::Unauthorized.into_response()
        }
    }
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bearer_token() {
        let header = HeaderValue::from_static("Bearer s3cret");
        assert_eq!(extract_bearer_token(Some(&header)), Some("s3cret"));
    }

    #[test]
    fn ignores_other_schemes() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
        assert_eq!(extract_bearer_token(None), None);
    }

    #[test]
    fn matches_only_the_configured_token() {
        let auth = AdminAuth::new(Some("s3cret".to_string()));
        assert!(auth.allows("s3cret"));
        assert!(!auth.allows("s3cre"));
        assert!(!auth.allows("s3cret!"));
    }

    #[test]
    fn unconfigured_token_rejects_everything() {
        let auth = AdminAuth::new(None);
        assert!(!auth.allows(""));
        assert!(!auth.allows("anything"));
    }
}
