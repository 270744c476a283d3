//! Swagger 2.0 document model.
//!
//! Schemas are the same [`Schema`] type the OpenAPI model uses; only the
//! envelope, parameters, responses and security definitions differ.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::operation::HttpMethod;
use super::schema::{ExclusiveBound, Schema, SchemaOrRef, SchemaType, TypeSet};
use super::security::{ApiKeyLocation, SecurityRequirement};
use super::spec::{Info, Tag};

/// Top-level Swagger 2.0 document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerSpec {
    pub swagger: String,

    pub info: Info,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default)]
    pub paths: IndexMap<String, SwaggerPathItem>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, SwaggerParameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub responses: IndexMap<String, SwaggerResponse>,

    #[serde(
        rename = "securityDefinitions",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub security_definitions: IndexMap<String, SwaggerSecurityScheme>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A Swagger path item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerPathItem {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<SwaggerOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<SwaggerOperation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SwaggerParameterOrRef>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SwaggerPathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&SwaggerOperation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    pub fn operation_mut(&mut self, method: HttpMethod) -> Option<&mut SwaggerOperation> {
        match method {
            HttpMethod::Get => self.get.as_mut(),
            HttpMethod::Put => self.put.as_mut(),
            HttpMethod::Post => self.post.as_mut(),
            HttpMethod::Delete => self.delete.as_mut(),
            HttpMethod::Options => self.options.as_mut(),
            HttpMethod::Head => self.head.as_mut(),
            HttpMethod::Patch => self.patch.as_mut(),
        }
    }

    pub fn set_operation(&mut self, method: HttpMethod, operation: SwaggerOperation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        };
        *slot = Some(operation);
    }

    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &SwaggerOperation)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(|method| self.operation(method).map(|op| (method, op)))
    }
}

/// A Swagger operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerOperation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,

    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<SwaggerParameterOrRef>,

    #[serde(default)]
    pub responses: IndexMap<String, SwaggerResponseOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// Where a Swagger parameter lives. `body` and `formData` have no OpenAPI
/// 3.x parameter counterpart; they become request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwaggerParameterLocation {
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "formData")]
    FormData,
    #[serde(rename = "body")]
    Body,
}

/// A Swagger parameter. Body parameters carry a `schema`; every other kind
/// describes its value with the flat fields below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerParameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: SwaggerParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "allowEmptyValue", skip_serializing_if = "Option::is_none")]
    pub allow_empty_value: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<bool>,

    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SwaggerParameter {
    /// A parameter named `name` in `location` with every optional field unset.
    pub fn new(name: impl Into<String>, location: SwaggerParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: false,
            schema: None,
            param_type: None,
            format: None,
            allow_empty_value: None,
            items: None,
            collection_format: None,
            default_value: None,
            maximum: None,
            exclusive_maximum: None,
            minimum: None,
            exclusive_minimum: None,
            max_length: None,
            min_length: None,
            pattern: None,
            max_items: None,
            min_items: None,
            unique_items: None,
            enum_values: Vec::new(),
            multiple_of: None,
            extensions: IndexMap::new(),
        }
    }

    /// The schema equivalent of a non-body parameter's flat fields.
    pub fn value_schema(&self) -> Schema {
        Schema {
            schema_type: self.param_type.map(TypeSet::Single),
            format: self.format.clone(),
            items: self.items.clone(),
            default_value: self.default_value.clone(),
            maximum: self.maximum.clone(),
            exclusive_maximum: self.exclusive_maximum.map(ExclusiveBound::Flag),
            minimum: self.minimum.clone(),
            exclusive_minimum: self.exclusive_minimum.map(ExclusiveBound::Flag),
            max_length: self.max_length,
            min_length: self.min_length,
            pattern: self.pattern.clone(),
            max_items: self.max_items,
            min_items: self.min_items,
            unique_items: self.unique_items,
            enum_values: self.enum_values.clone(),
            multiple_of: self.multiple_of.clone(),
            ..Schema::default()
        }
    }

    /// Copy a schema's value constraints onto the flat fields. Keywords with
    /// no flat counterpart are dropped.
    pub fn apply_value_schema(&mut self, schema: &Schema) {
        self.param_type = schema.types().into_iter().find(|t| *t != SchemaType::Null);
        self.format = schema.format.clone();
        self.items = schema.items.clone();
        self.default_value = schema.default_value.clone();
        self.maximum = schema.maximum.clone();
        self.exclusive_maximum = flag_of(schema.exclusive_maximum.as_ref());
        self.minimum = schema.minimum.clone();
        self.exclusive_minimum = flag_of(schema.exclusive_minimum.as_ref());
        self.max_length = schema.max_length;
        self.min_length = schema.min_length;
        self.pattern = schema.pattern.clone();
        self.max_items = schema.max_items;
        self.min_items = schema.min_items;
        self.unique_items = schema.unique_items;
        self.enum_values = schema.enum_values.clone();
        self.multiple_of = schema.multiple_of.clone();
    }
}

fn flag_of(bound: Option<&ExclusiveBound>) -> Option<bool> {
    match bound {
        Some(ExclusiveBound::Flag(flag)) => Some(*flag),
        _ => None,
    }
}

/// A reference or inline Swagger parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwaggerParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(SwaggerParameter),
}

/// A Swagger response header: a description plus flat value fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SwaggerHeader {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub schema: Schema,
}

/// A Swagger response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerResponse {
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, SwaggerHeader>,

    /// Example payloads keyed by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub examples: IndexMap<String, Value>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// A reference or inline Swagger response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwaggerResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(SwaggerResponse),
}

/// Swagger security scheme kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwaggerSecurityType {
    Basic,
    ApiKey,
    #[serde(rename = "oauth2")]
    OAuth2,
}

/// Swagger OAuth2 flow names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwaggerOAuthFlow {
    Implicit,
    Password,
    Application,
    AccessCode,
}

/// A Swagger security scheme definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerSecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SwaggerSecurityType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<SwaggerOAuthFlow>,

    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,

    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,

    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}
