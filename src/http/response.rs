//! Response assembly.
//!
//! # Responsibilities
//! - Accumulate what controllers produce for one request
//! - Serialize the payload; absent fields are omitted, `content` never is
//! - Surface the path residual as `x-query-parameters`

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

pub const X_QUERY_PARAMETERS: HeaderName = HeaderName::from_static("x-query-parameters");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A user-facing notice attached to the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub text: String,
    pub severity: Severity,
}

/// Per-request output, filled in by controllers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseContext {
    pub content: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_parameters: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

impl ResponseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content<T: Serialize>(&mut self, content: T) -> Result<(), serde_json::Error> {
        self.content = serde_json::to_value(content)?;
        Ok(())
    }

    pub fn set_template(&mut self, template: impl Into<String>) {
        self.template = Some(template.into());
    }

    /// Empty ids are treated as unset.
    pub fn set_dynamic_id(&mut self, dynamic_id: Option<String>) {
        self.dynamic_id = dynamic_id.filter(|d| !d.is_empty());
    }

    /// Empty residuals are treated as unset.
    pub fn set_query_parameters(&mut self, residual: impl Into<String>) {
        let residual = residual.into();
        self.query_parameters = (!residual.is_empty()).then_some(residual);
    }

    pub fn add_message(&mut self, text: impl Into<String>, severity: Severity) {
        self.messages.push(Message {
            text: text.into(),
            severity,
        });
    }

    /// Render with an explicit status.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        let header = self
            .query_parameters
            .as_deref()
            .and_then(|q| HeaderValue::from_str(q).ok());
        let mut response = (status, Json(self)).into_response();
        if let Some(value) = header {
            response.headers_mut().insert(X_QUERY_PARAMETERS, value);
        }
        response
    }
}

impl IntoResponse for ResponseContext {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_context_keeps_content() {
        let ctx = ResponseContext::new();
        assert_eq!(serde_json::to_value(&ctx).unwrap(), json!({ "content": null }));
    }

    #[test]
    fn test_full_context() {
        let mut ctx = ResponseContext::new();
        ctx.set_content(vec!["a", "b"]).unwrap();
        ctx.set_template("page");
        ctx.set_dynamic_id(Some(String::new()));
        ctx.set_query_parameters("my-post");
        ctx.add_message("heads up", Severity::Warning);

        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            json!({
                "content": ["a", "b"],
                "template": "page",
                "query_parameters": "my-post",
                "messages": [{ "text": "heads up", "severity": "warning" }],
            })
        );

        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(X_QUERY_PARAMETERS).unwrap(), "my-post");
    }
}
