//! Element tree assembly.
//!
//! # Responsibilities
//! - Load an element and enforce the site's controller whitelist
//! - Dispatch on the element kind (content / wrapper / slug)
//! - Describe children shallowly: one store lookup per child, never deeper

use std::collections::HashSet;

use futures_util::future::join_all;
use serde::Serialize;

use crate::models::{ContentType, ControllerKind, Element, ElementKind, ModelError};
use crate::observability::metrics;
use crate::resolver::ResolveError;
use crate::store::{Document, DocumentStore};

/// Shallow view of an element, enough for a client to request its expansion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementDescriptor {
    pub id: String,
    pub template: String,
    pub controller: ControllerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_id: Option<String>,
}

impl From<&Element> for ElementDescriptor {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            template: element.template.clone(),
            controller: element.controller(),
            dynamic_id: element.dynamic_id.clone(),
        }
    }
}

/// Kind-specific result of resolving one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NodePayload {
    /// Field values of a content element.
    Content(Document),
    /// Ordered children of a wrapper.
    Children(Vec<ElementDescriptor>),
    /// The child a slug selected, if any.
    Selected(Option<ElementDescriptor>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNode {
    pub id: String,
    pub template: String,
    pub controller: ControllerKind,
    pub dynamic_id: Option<String>,
    pub payload: NodePayload,
}

/// Resolves elements for one site against one store handle.
pub struct Assembler<'a> {
    store: &'a dyn DocumentStore,
    allowed: &'a HashSet<ControllerKind>,
}

impl<'a> Assembler<'a> {
    pub fn new(store: &'a dyn DocumentStore, allowed: &'a HashSet<ControllerKind>) -> Self {
        Self { store, allowed }
    }

    /// Resolve one element. When `expected` is given the element must be of
    /// that kind; `selector` is consulted by slug elements.
    pub async fn resolve_element(
        &self,
        id: &str,
        expected: Option<ControllerKind>,
        selector: Option<&str>,
    ) -> Result<ResolvedNode, ResolveError> {
        let element = match expected {
            Some(kind) => Element::load_valid(self.store, id, kind).await?,
            None => Element::load(self.store, id).await?,
        }
        .ok_or_else(|| ResolveError::ElementNotFound { id: id.to_string() })?;

        let kind = element.controller();
        if !self.allowed.contains(&kind) {
            return Err(ResolveError::ForbiddenControllerKind {
                id: element.id.clone(),
                kind,
            });
        }

        let payload = match &element.kind {
            ElementKind::Content(values) => {
                let content_type = match &values.content_type {
                    Some(ct) => ContentType::load(self.store, ct).await?,
                    None => None,
                };
                let Some(content_type) = content_type else {
                    return Err(ResolveError::MissingContentType {
                        id: element.id.clone(),
                        content_type: values.content_type.clone(),
                    });
                };
                NodePayload::Content(content_type.extract(&values.fields))
            }
            ElementKind::Wrapper(values) => {
                NodePayload::Children(self.resolve_children(&values.children).await?)
            }
            ElementKind::Slug(values) => {
                let child = selector.and_then(|s| values.selectors.get(s));
                match child {
                    Some(child) => NodePayload::Selected(self.describe(child).await?),
                    None => {
                        tracing::debug!(element_id = %element.id, selector = ?selector, "Slug selector matched nothing");
                        NodePayload::Selected(None)
                    }
                }
            }
        };

        Ok(ResolvedNode {
            id: element.id,
            template: element.template,
            controller: kind,
            dynamic_id: element.dynamic_id,
            payload,
        })
    }

    /// Shallow descriptors for `ids`, in order. Missing or unreadable
    /// children are omitted; store failures abort.
    pub async fn resolve_children(&self, ids: &[String]) -> Result<Vec<ElementDescriptor>, ResolveError> {
        let described = join_all(ids.iter().map(|id| self.describe(id))).await;
        let mut children = Vec::with_capacity(described.len());
        for child in described {
            if let Some(descriptor) = child? {
                children.push(descriptor);
            }
        }
        Ok(children)
    }

    async fn describe(&self, id: &str) -> Result<Option<ElementDescriptor>, ResolveError> {
        match Element::load(self.store, id).await {
            Ok(Some(element)) => Ok(Some(ElementDescriptor::from(&element))),
            Ok(None) => {
                tracing::warn!(element_id = %id, "Skipping dangling element reference");
                metrics::record_dangling_reference();
                Ok(None)
            }
            Err(ModelError::Store(e)) => Err(ModelError::Store(e).into()),
            Err(e) => {
                tracing::warn!(element_id = %id, error = %e, "Skipping unreadable element");
                Ok(None)
            }
        }
    }
}
