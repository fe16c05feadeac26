//! Content type schemas referenced by `content` elements.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{document_id, ModelError};
use crate::store::{collections, Document, DocumentStore};

/// One declared field of a content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, rename = "type")]
    pub field_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentType {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl ContentType {
    pub fn from_document(document: Document) -> Result<Self, ModelError> {
        let id = document_id(&document);
        serde_json::from_value(Value::Object(document)).map_err(|source| ModelError::Malformed {
            collection: collections::CONTENT_TYPES,
            id,
            source,
        })
    }

    pub async fn load(store: &dyn DocumentStore, id: &str) -> Result<Option<Self>, ModelError> {
        store
            .find_by_id(collections::CONTENT_TYPES, id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    /// Stored values of the declared fields, verbatim. Undeclared keys are
    /// not exposed; declared but unset fields are omitted.
    pub fn extract(&self, values: &Document) -> Document {
        self.fields
            .iter()
            .filter_map(|f| values.get(&f.name).map(|v| (f.name.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_declared_fields() {
        let ct = ContentType::from_document(
            json!({
                "_id": "article", "type": "Article",
                "fields": [{"name": "title"}, {"name": "body", "type": "textarea"}, {"name": "image"}]
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        let values = json!({"title": "Hello", "body": {"html": "<p>x</p>"}, "secret": 1});
        let extracted = ct.extract(values.as_object().unwrap());
        assert_eq!(Value::Object(extracted), json!({"title": "Hello", "body": {"html": "<p>x</p>"}}));
    }
}
