//! Content elements: nodes of a site's content graph.
//!
//! An element's `controller` string selects one of the closed set of
//! [`ControllerKind`]s, and `controller_values` is parsed into the
//! matching [`ElementKind`] payload when the document is loaded.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{document_id, ModelError};
use crate::store::{collections, Document, DocumentStore, Filter, ID_FIELD};

/// Supported element controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Leaf data rendered through a content type.
    Content,
    /// Ordered list of child elements.
    Wrapper,
    /// One child chosen by a request-supplied selector.
    Slug,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 3] = [Self::Content, Self::Wrapper, Self::Slug];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Wrapper => "wrapper",
            Self::Slug => "slug",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown element controller `{0}`")]
pub struct UnknownControllerKind(pub String);

impl FromStr for ControllerKind {
    type Err = UnknownControllerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownControllerKind(s.to_string()))
    }
}

/// Values of a `content` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentValues {
    pub content_type: Option<String>,
    pub fields: Document,
}

/// Values of a `wrapper` element.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrapperValues {
    pub children: Vec<String>,
}

/// Values of a `slug` element: selector name to child id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlugValues {
    pub selectors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Content(ContentValues),
    Wrapper(WrapperValues),
    Slug(SlugValues),
}

impl ElementKind {
    pub fn controller(&self) -> ControllerKind {
        match self {
            Self::Content(_) => ControllerKind::Content,
            Self::Wrapper(_) => ControllerKind::Wrapper,
            Self::Slug(_) => ControllerKind::Slug,
        }
    }

    /// Parse `controller_values` for `kind`. Anything that does not fit the
    /// expected shape is dropped rather than rejected.
    fn parse(id: &str, kind: ControllerKind, values: Option<&Value>) -> Self {
        let object = values.and_then(Value::as_object);
        if values.is_some_and(|v| !v.is_null()) && object.is_none() {
            tracing::warn!(element_id = %id, controller = %kind, "Element values are not an object");
        }

        match kind {
            ControllerKind::Content => Self::Content(ContentValues {
                content_type: object
                    .and_then(|o| o.get("content_type"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                fields: object
                    .and_then(|o| o.get("content"))
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
            }),
            ControllerKind::Wrapper => {
                let children = match object.and_then(|o| o.get("elements")) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    Some(other) => {
                        tracing::warn!(element_id = %id, found = %other, "Wrapper children are not a list");
                        Vec::new()
                    }
                    None => Vec::new(),
                };
                Self::Wrapper(WrapperValues { children })
            }
            ControllerKind::Slug => Self::Slug(SlugValues {
                selectors: object
                    .into_iter()
                    .flatten()
                    .filter_map(|(k, v)| v.as_str().map(|child| (k.clone(), child.to_string())))
                    .collect(),
            }),
        }
    }
}

#[derive(Deserialize)]
struct RawElement {
    #[serde(rename = "_id")]
    id: String,
    controller: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    dynamic_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    classes: Option<String>,
    #[serde(default)]
    controller_values: Option<Value>,
}

/// A content node. Children are referenced by id and may be shared or cyclic.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: String,
    pub title: String,
    pub template: String,
    /// Client-side re-render target.
    pub dynamic_id: Option<String>,
    pub classes: Option<String>,
    pub kind: ElementKind,
}

impl Element {
    pub fn from_document(document: Document) -> Result<Self, ModelError> {
        let id = document_id(&document);
        let raw: RawElement =
            serde_json::from_value(Value::Object(document)).map_err(|source| ModelError::Malformed {
                collection: collections::ELEMENTS,
                id,
                source,
            })?;

        let kind: ControllerKind = raw.controller.parse().map_err(|_| ModelError::UnknownController {
            id: raw.id.clone(),
            controller: raw.controller.clone(),
        })?;

        Ok(Self {
            kind: ElementKind::parse(&raw.id, kind, raw.controller_values.as_ref()),
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            template: raw.template.unwrap_or_default(),
            dynamic_id: raw.dynamic_id.filter(|d| !d.is_empty()),
            classes: raw.classes,
        })
    }

    pub fn controller(&self) -> ControllerKind {
        self.kind.controller()
    }

    pub async fn load(store: &dyn DocumentStore, id: &str) -> Result<Option<Self>, ModelError> {
        store
            .find_by_id(collections::ELEMENTS, id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Load by id, only if the element is of the given kind.
    pub async fn load_valid(
        store: &dyn DocumentStore,
        id: &str,
        kind: ControllerKind,
    ) -> Result<Option<Self>, ModelError> {
        let filter = Filter::new().eq(ID_FIELD, id).eq("controller", kind.as_str());
        store
            .find_one(collections::ELEMENTS, &filter)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Delete an element and remove its id from every path and wrapper that
    /// lists it. Slug selectors are left dangling; readers skip them.
    pub async fn delete_cascade(store: &dyn DocumentStore, id: &str) -> Result<bool, ModelError> {
        if !store.delete(collections::ELEMENTS, id).await? {
            return Ok(false);
        }
        let reference = Value::String(id.to_string());

        let wrappers = store
            .pull_all(
                collections::ELEMENTS,
                &Filter::new().contains("controller_values.elements", id),
                "controller_values.elements",
                &reference,
            )
            .await?;
        let paths = store
            .pull_all(
                collections::PATHS,
                &Filter::new().contains("elements", id),
                "elements",
                &reference,
            )
            .await?;

        tracing::info!(element_id = %id, wrappers, paths, "Element deleted");
        Ok(true)
    }
}
