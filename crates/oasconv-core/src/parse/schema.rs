use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A JSON Schema type keyword value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    Null,
    /// Swagger 2.0 only: file uploads in `formData` parameters and responses.
    File,
}

/// The `type` field can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSet {
    Single(SchemaType),
    Multiple(Vec<SchemaType>),
}

impl TypeSet {
    /// The type names in declaration order.
    pub fn to_vec(&self) -> Vec<SchemaType> {
        match self {
            TypeSet::Single(t) => vec![*t],
            TypeSet::Multiple(types) => types.clone(),
        }
    }
}

/// A reference, a boolean schema (`true` accepts anything, `false`
/// nothing) or an inline schema.
///
/// Keywords next to `$ref` are kept in `siblings`; 3.1 gives them meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
        #[serde(flatten)]
        siblings: IndexMap<String, Value>,
    },
    Bool(bool),
    Schema(Box<Schema>),
}

impl SchemaOrRef {
    pub fn reference(ref_path: impl Into<String>) -> Self {
        SchemaOrRef::Ref {
            ref_path: ref_path.into(),
            siblings: IndexMap::new(),
        }
    }

    pub fn inline(schema: Schema) -> Self {
        SchemaOrRef::Schema(Box::new(schema))
    }

    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SchemaOrRef::Schema(schema) => Some(schema),
            SchemaOrRef::Ref { .. } | SchemaOrRef::Bool(_) => None,
        }
    }

    pub fn ref_path(&self) -> Option<&str> {
        match self {
            SchemaOrRef::Ref { ref_path, .. } => Some(ref_path),
            SchemaOrRef::Bool(_) | SchemaOrRef::Schema(_) => None,
        }
    }
}

/// Discriminator for polymorphic schemas. Swagger 2.0 only names the
/// property; OpenAPI 3.x uses an object with an optional mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Discriminator {
    PropertyName(String),
    Object {
        #[serde(rename = "propertyName")]
        property_name: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        mapping: IndexMap<String, String>,
    },
}

impl Discriminator {
    pub fn property_name(&self) -> &str {
        match self {
            Discriminator::PropertyName(name) => name,
            Discriminator::Object { property_name, .. } => property_name,
        }
    }
}

/// `exclusiveMinimum`/`exclusiveMaximum`: a boolean flag beside the plain
/// bound in Swagger 2.0 and OpenAPI 3.0, the bound value itself in 3.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExclusiveBound {
    Flag(bool),
    Value(Number),
}

/// A JSON Schema object. One type serves all three dialects; fields that
/// only exist in some dialects are optional and skipped when absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<TypeSet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    // Object properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaOrRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "minProperties", skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(rename = "maxProperties", skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    // Array items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    // Composition
    #[serde(rename = "allOf", default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaOrRef>,

    #[serde(rename = "oneOf", default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaOrRef>,

    #[serde(rename = "anyOf", default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,

    // Enum values
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,

    // Numeric constraints
    #[serde(rename = "multipleOf", skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(rename = "exclusiveMinimum", skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ExclusiveBound>,
    #[serde(rename = "exclusiveMaximum", skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ExclusiveBound>,

    // String constraints
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(rename = "contentMediaType", skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    #[serde(rename = "contentEncoding", skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,

    // Array constraints
    #[serde(rename = "minItems", skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(rename = "maxItems", skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "uniqueItems", skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,

    // Read/Write only
    #[serde(rename = "readOnly", skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(rename = "writeOnly", skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    // Const
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    // Example (Swagger 2.0 / 3.0) and examples (3.1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,

    #[serde(rename = "externalDocs", skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml: Option<Value>,

    /// Vendor extensions and keywords this model does not name.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl Schema {
    pub fn of_type(schema_type: SchemaType) -> Self {
        Self {
            schema_type: Some(TypeSet::Single(schema_type)),
            ..Self::default()
        }
    }

    /// `{type: string, format: binary}`, the 3.0/Swagger shape of file content.
    pub fn binary_string() -> Self {
        Self {
            format: Some("binary".to_string()),
            ..Self::of_type(SchemaType::String)
        }
    }

    /// The declared type names, empty when `type` is absent.
    pub fn types(&self) -> Vec<SchemaType> {
        self.schema_type
            .as_ref()
            .map(TypeSet::to_vec)
            .unwrap_or_default()
    }

    /// Replace the type set. A single entry is written in scalar form, an
    /// empty list removes the keyword.
    pub fn set_types(&mut self, types: Vec<SchemaType>) {
        self.schema_type = match types.len() {
            0 => None,
            1 => Some(TypeSet::Single(types[0])),
            _ => Some(TypeSet::Multiple(types)),
        };
    }

    /// True when the schema declares exactly one type and it is `t`.
    pub fn is_single_type(&self, t: SchemaType) -> bool {
        self.types() == [t]
    }

    /// Direct subschemas in descent order: properties, items, `allOf`,
    /// `oneOf`, `anyOf`, schema-valued `additionalProperties`, `not`.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut SchemaOrRef> {
        let additional = match self.additional_properties.as_mut() {
            Some(AdditionalProperties::Schema(schema)) => Some(&mut **schema),
            _ => None,
        };
        self.properties
            .values_mut()
            .chain(self.items.as_deref_mut())
            .chain(self.all_of.iter_mut())
            .chain(self.one_of.iter_mut())
            .chain(self.any_of.iter_mut())
            .chain(additional)
            .chain(self.not.as_deref_mut())
    }
}

/// `additionalProperties` can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaOrRef>),
}
