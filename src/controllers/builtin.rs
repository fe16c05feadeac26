//! Built-in controllers.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::controllers::Controller;
use crate::error::SiteError;
use crate::http::request::RequestContext;
use crate::http::response::Severity;
use crate::models::ControllerKind;
use crate::resolver::{resolve_with_fallback, Assembler, NodePayload};

pub const PATHS: &str = "paths";
pub const DOMAIN: &str = "domain";

/// Session key holding the last resolved logical path.
pub const LAST_PATH_KEY: &str = "last_path";

/// Resolves the client's current logical path to a template and the
/// shallow descriptors of its elements.
///
/// The path comes from `x-current-path`, falling back to the URL tokens
/// after `paths`.
#[derive(Debug, Default)]
pub struct PathValues;

#[async_trait]
impl Controller for PathValues {
    async fn handle(&self, ctx: &mut RequestContext, params: &[String]) -> Result<(), SiteError> {
        let logical = ctx
            .current_path
            .clone()
            .unwrap_or_else(|| format!("/{}", params.join("/")));

        let found = resolve_with_fallback(ctx.store(), &ctx.tenant.not_found_path, &logical).await?;
        if found.substituted {
            tracing::debug!(
                tenant = %ctx.tenant.id,
                logical = %logical,
                not_found_path = %found.path.path,
                "Serving not-found path"
            );
        }

        let descriptors = Assembler::new(ctx.store(), &ctx.tenant.element_controllers)
            .resolve_children(&found.path.elements)
            .await?;

        ctx.response.set_template(found.path.template.clone());
        ctx.response.set_content(descriptors)?;
        ctx.response.set_query_parameters(found.residual);

        if let Some(session) = &ctx.session {
            if let Err(e) = session.set(LAST_PATH_KEY, Value::String(found.path.path)).await {
                tracing::warn!(tenant = %ctx.tenant.id, error = %e, "Failed to record session path");
            }
        }
        Ok(())
    }
}

/// Resolves one element of a fixed kind: `/<kind>/<element-id>`.
#[derive(Debug)]
pub struct ElementValues {
    kind: ControllerKind,
}

impl ElementValues {
    pub fn new(kind: ControllerKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl Controller for ElementValues {
    async fn handle(&self, ctx: &mut RequestContext, params: &[String]) -> Result<(), SiteError> {
        let id = params.first().ok_or(SiteError::MissingParameter("id"))?;

        let node = Assembler::new(ctx.store(), &ctx.tenant.element_controllers)
            .resolve_element(id, Some(self.kind), ctx.selector.as_deref())
            .await?;

        if matches!(node.payload, NodePayload::Selected(None)) {
            ctx.response
                .add_message("No element matches the selector", Severity::Info);
        }
        ctx.response.set_template(node.template);
        ctx.response.set_dynamic_id(node.dynamic_id);
        ctx.response.set_content(node.payload)?;
        Ok(())
    }
}

/// Exposes one of the site's public values: `/domain/<key>`.
#[derive(Debug, Default)]
pub struct DomainPublicValue;

#[async_trait]
impl Controller for DomainPublicValue {
    async fn handle(&self, ctx: &mut RequestContext, params: &[String]) -> Result<(), SiteError> {
        let key = params.first().ok_or(SiteError::MissingParameter("key"))?;
        let value = ctx.tenant.public_values.get(key);
        ctx.response.set_content(json!({ key.as_str(): value }))?;
        Ok(())
    }
}
