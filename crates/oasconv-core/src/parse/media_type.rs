use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::SchemaOrRef;

/// Media type names the converters treat specially.
pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A media type object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl MediaType {
    pub fn with_schema(schema: SchemaOrRef) -> Self {
        Self {
            schema: Some(schema),
            ..Self::default()
        }
    }
}

/// A content map: media type name to media type object, in document order.
pub type Content = IndexMap<String, MediaType>;
