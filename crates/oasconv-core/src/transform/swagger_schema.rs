//! Schema differences between Swagger 2.0 and OpenAPI 3.0.
//!
//! These rewrite a whole schema tree at once, including `$ref` nodes, since
//! every reference has to move between the `#/definitions/` and
//! `#/components/schemas/` arenas.

use serde_json::Value;

use crate::parse::ref_resolve::{OPENAPI_SCHEMAS, SWAGGER_DEFINITIONS, rewrite_ref};
use crate::parse::schema::{Discriminator, Schema, SchemaOrRef, SchemaType, TypeSet};

const X_NULLABLE: &str = "x-nullable";

/// Rewrite a Swagger schema tree into OpenAPI 3.0 form.
pub fn to_openapi(schema: &mut SchemaOrRef) {
    rewrite_tree(schema, SWAGGER_DEFINITIONS, OPENAPI_SCHEMAS, &mut node_to_openapi);
}

/// Rewrite an OpenAPI 3.0 schema tree into Swagger form.
pub fn to_swagger(schema: &mut SchemaOrRef) {
    rewrite_tree(schema, OPENAPI_SCHEMAS, SWAGGER_DEFINITIONS, &mut node_to_swagger);
}

fn rewrite_tree<F>(schema: &mut SchemaOrRef, from: &str, to: &str, node: &mut F)
where
    F: FnMut(&mut Schema),
{
    match schema {
        SchemaOrRef::Ref { ref_path, .. } => *ref_path = rewrite_ref(ref_path, from, to),
        SchemaOrRef::Bool(_) => {}
        SchemaOrRef::Schema(inner) => {
            for child in inner.children_mut() {
                rewrite_tree(child, from, to, node);
            }
            node(inner);
        }
    }
}

fn node_to_openapi(schema: &mut Schema) {
    if let Some(Value::Bool(nullable)) = schema.extensions.shift_remove(X_NULLABLE) {
        if nullable {
            schema.nullable = Some(true);
        }
    }

    if schema.schema_type == Some(TypeSet::Single(SchemaType::File)) {
        schema.schema_type = Some(TypeSet::Single(SchemaType::String));
        schema.format = Some("binary".to_string());
    }

    if let Some(Discriminator::PropertyName(name)) = &mut schema.discriminator {
        let property_name = std::mem::take(name);
        schema.discriminator = Some(Discriminator::Object {
            property_name,
            mapping: Default::default(),
        });
    }
}

fn node_to_swagger(schema: &mut Schema) {
    if schema.nullable.take() == Some(true) {
        schema.extensions.insert(X_NULLABLE.to_string(), Value::Bool(true));
    }

    if let Some(Discriminator::Object { property_name, .. }) = &mut schema.discriminator {
        let name = std::mem::take(property_name);
        schema.discriminator = Some(Discriminator::PropertyName(name));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn schema(value: Value) -> SchemaOrRef {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_swagger_schema_to_openapi() {
        let mut s = schema(json!({
            "type": "object",
            "discriminator": "kind",
            "properties": {
                "owner": {"$ref": "#/definitions/Owner"},
                "photo": {"type": "file"},
                "nickname": {"type": "string", "x-nullable": true},
                "tags": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}
            }
        }));
        to_openapi(&mut s);
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "type": "object",
                "discriminator": {"propertyName": "kind"},
                "properties": {
                    "owner": {"$ref": "#/components/schemas/Owner"},
                    "photo": {"type": "string", "format": "binary"},
                    "nickname": {"type": "string", "nullable": true},
                    "tags": {"type": "array", "items": {"$ref": "#/components/schemas/Tag"}}
                }
            })
        );
    }

    #[test]
    fn test_openapi_schema_to_swagger() {
        let mut s = schema(json!({
            "allOf": [{"$ref": "#/components/schemas/Base"}],
            "discriminator": {"propertyName": "kind", "mapping": {"a": "#/components/schemas/A"}},
            "nullable": true
        }));
        to_swagger(&mut s);
        assert_eq!(
            serde_json::to_value(&s).unwrap(),
            json!({
                "allOf": [{"$ref": "#/definitions/Base"}],
                "discriminator": "kind",
                "x-nullable": true
            })
        );
    }

    #[test]
    fn test_top_level_ref_is_rewritten() {
        let mut s = SchemaOrRef::reference("#/definitions/Pet");
        to_openapi(&mut s);
        assert_eq!(s.ref_path(), Some("#/components/schemas/Pet"));
        to_swagger(&mut s);
        assert_eq!(s.ref_path(), Some("#/definitions/Pet"));
    }
}
