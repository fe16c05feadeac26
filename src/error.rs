//! Request-level error taxonomy.
//!
//! Every failure a controller can hit maps to a well-formed JSON payload.
//! Access failures abort with 403, domain misses degrade to a 200 carrying
//! a message, and store trouble becomes a generic 500. Internal error
//! strings are logged, never sent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::response::{ResponseContext, Severity};
use crate::models::ModelError;
use crate::resolver::ResolveError;
use crate::session::SessionError;
use crate::store::StoreError;

const GENERIC_FAILURE: &str = "Something went wrong, please try again later";

#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    #[error("no site is configured for host `{host}`")]
    TenantNotFound { host: String },

    #[error("no controller is registered for `{token}`")]
    ControllerNotFound { token: String },

    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ModelError> for SiteError {
    fn from(err: ModelError) -> Self {
        Self::Resolve(ResolveError::Model(err))
    }
}

impl SiteError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TenantNotFound { .. }
            | Self::ControllerNotFound { .. }
            | Self::MissingParameter(_)
            | Self::Resolve(ResolveError::ForbiddenControllerKind { .. }) => StatusCode::FORBIDDEN,

            Self::Resolve(
                ResolveError::PathNotFound { .. }
                | ResolveError::ElementNotFound { .. }
                | ResolveError::MissingContentType { .. },
            ) => StatusCode::OK,

            Self::Resolve(ResolveError::NotFoundPathMissing { .. } | ResolveError::Model(_))
            | Self::Store(_)
            | Self::Session(_)
            | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for misses that are reported inside a normal response.
    pub fn is_recoverable(&self) -> bool {
        self.status() == StatusCode::OK
    }

    /// Text shown to the visitor.
    fn public_message(&self) -> String {
        match self {
            Self::TenantNotFound { .. } => "Unknown site".to_string(),
            Self::ControllerNotFound { .. } => "Unknown resource".to_string(),
            Self::MissingParameter(name) => format!("Missing parameter `{name}`"),
            Self::Resolve(ResolveError::ForbiddenControllerKind { kind, .. }) => {
                format!("Elements of kind `{kind}` are not available on this site")
            }
            Self::Resolve(ResolveError::PathNotFound { .. }) => "Page not found".to_string(),
            Self::Resolve(ResolveError::ElementNotFound { id }) => format!("Element `{id}` not found"),
            Self::Resolve(ResolveError::MissingContentType { id, .. }) => {
                format!("Element `{id}` has no content type")
            }
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let severity = if status == StatusCode::OK {
            Severity::Warning
        } else {
            Severity::Error
        };
        let mut body = ResponseContext::new();
        body.add_message(self.public_message(), severity);
        body.into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ControllerKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SiteError::TenantNotFound { host: "x".into() }, StatusCode::FORBIDDEN),
            (SiteError::ControllerNotFound { token: "x".into() }, StatusCode::FORBIDDEN),
            (SiteError::MissingParameter("id"), StatusCode::FORBIDDEN),
            (
                ResolveError::ForbiddenControllerKind {
                    id: "e".into(),
                    kind: ControllerKind::Slug,
                }
                .into(),
                StatusCode::FORBIDDEN,
            ),
            (ResolveError::ElementNotFound { id: "e".into() }.into(), StatusCode::OK),
            (
                ResolveError::MissingContentType {
                    id: "e".into(),
                    content_type: None,
                }
                .into(),
                StatusCode::OK,
            ),
            (
                ResolveError::NotFoundPathMissing { path: "/404".into() }.into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (SiteError::Store(StoreError::PoolClosed), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn test_store_detail_is_not_exposed() {
        let err = SiteError::Store(StoreError::DuplicateKey {
            collection: "paths".into(),
            key: "secret-index".into(),
        });
        assert!(!err.public_message().contains("secret-index"));
        assert_eq!(err.public_message(), GENERIC_FAILURE);
    }
}
