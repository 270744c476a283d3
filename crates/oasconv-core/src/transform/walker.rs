//! Document-wide schema traversal.
//!
//! Every schema node reachable from the document is handed to a visitor,
//! children before parents. A `$ref` is never followed during descent: its
//! target lives in `components.schemas`, which is itself a root set, so each
//! concrete node is visited exactly once per walk and reference cycles
//! cannot loop.

use crate::parse::components::Components;
use crate::parse::media_type::Content;
use crate::parse::operation::PathItem;
use crate::parse::parameter::ParameterOrRef;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{HeaderOrRef, ResponseOrRef};
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;

/// Apply `visit` to every schema reachable from the document.
///
/// Roots are visited in this order: component schemas, component parameter
/// schemas, operation request-body content schemas, operation response
/// content schemas. After those come the remaining schema locations:
/// component request bodies, responses and headers, path-level and
/// operation-level parameters, and response headers.
pub fn walk_all_schemas<F>(spec: &mut OpenApiSpec, mut visit: F)
where
    F: FnMut(&mut Schema),
{
    let visit = &mut visit;

    if let Some(components) = spec.components.as_mut() {
        for schema in components.schemas.values_mut() {
            walk_schema_or_ref(schema, visit);
        }
        for parameter in components.parameters.values_mut() {
            walk_parameter(parameter, visit);
        }
    }

    for path_item in spec.paths.values_mut() {
        for operation in path_item.operations_mut() {
            if let Some(RequestBodyOrRef::RequestBody(body)) = operation.request_body.as_mut() {
                walk_content(&mut body.content, visit);
            }
        }
    }

    for path_item in spec.paths.values_mut() {
        for operation in path_item.operations_mut() {
            for response in operation.responses.values_mut() {
                if let ResponseOrRef::Response(response) = response {
                    walk_content(&mut response.content, visit);
                }
            }
        }
    }

    if let Some(components) = spec.components.as_mut() {
        walk_component_extras(components, visit);
    }

    for path_item in spec.paths.values_mut() {
        walk_path_item_extras(path_item, visit);
    }
}

/// Walk one schema tree in post-order: properties (in insertion order),
/// items, `allOf`, `oneOf`, `anyOf`, schema-valued `additionalProperties`,
/// `not`, and finally the node itself.
pub fn walk_schema<F>(schema: &mut Schema, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    for child in schema.children_mut() {
        walk_schema_or_ref(child, visit);
    }
    visit(schema);
}

/// Walk an optional location. `None`, references and boolean schemas are
/// no-ops.
pub fn walk_optional<F>(schema: Option<&mut SchemaOrRef>, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    if let Some(schema) = schema {
        walk_schema_or_ref(schema, visit);
    }
}

fn walk_schema_or_ref<F>(schema: &mut SchemaOrRef, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    if let SchemaOrRef::Schema(schema) = schema {
        walk_schema(schema, visit);
    }
}

fn walk_content<F>(content: &mut Content, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    for media_type in content.values_mut() {
        walk_optional(media_type.schema.as_mut(), visit);
    }
}

fn walk_parameter<F>(parameter: &mut ParameterOrRef, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    if let ParameterOrRef::Parameter(parameter) = parameter {
        walk_optional(parameter.schema.as_mut(), visit);
        walk_content(&mut parameter.content, visit);
    }
}

fn walk_header<F>(header: &mut HeaderOrRef, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    if let HeaderOrRef::Header(header) = header {
        walk_optional(header.schema.as_mut(), visit);
    }
}

fn walk_component_extras<F>(components: &mut Components, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    for body in components.request_bodies.values_mut() {
        if let RequestBodyOrRef::RequestBody(body) = body {
            walk_content(&mut body.content, visit);
        }
    }
    for response in components.responses.values_mut() {
        if let ResponseOrRef::Response(response) = response {
            walk_content(&mut response.content, visit);
            for header in response.headers.values_mut() {
                walk_header(header, visit);
            }
        }
    }
    for header in components.headers.values_mut() {
        walk_header(header, visit);
    }
}

fn walk_path_item_extras<F>(path_item: &mut PathItem, visit: &mut F)
where
    F: FnMut(&mut Schema),
{
    for parameter in path_item.parameters.iter_mut() {
        walk_parameter(parameter, visit);
    }
    for operation in path_item.operations_mut() {
        for parameter in operation.parameters.iter_mut() {
            walk_parameter(parameter, visit);
        }
        for response in operation.responses.values_mut() {
            if let ResponseOrRef::Response(response) = response {
                for header in response.headers.values_mut() {
                    walk_header(header, visit);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn titles(spec: &mut OpenApiSpec) -> Vec<String> {
        let mut seen = Vec::new();
        walk_all_schemas(spec, |schema| {
            seen.push(schema.title.clone().unwrap_or_else(|| "?".to_string()));
        });
        seen
    }

    #[test]
    fn test_post_order_within_a_schema() {
        let yaml = r#"
openapi: 3.0.4
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Root:
      title: root
      properties:
        b: {title: prop-b}
        a:
          title: prop-a
          items: {title: a-items}
      items: {title: items}
      allOf: [{title: all}]
      oneOf: [{title: one}]
      anyOf: [{title: any}]
"#;
        let mut spec = parse::from_yaml(yaml).unwrap();
        assert_eq!(
            titles(&mut spec),
            vec!["prop-b", "a-items", "prop-a", "items", "all", "one", "any", "root"]
        );
    }

    #[test]
    fn test_root_order_and_refs_not_followed() {
        let yaml = r##"
openapi: 3.0.4
info: {title: t, version: "1"}
paths:
  /pets:
    post:
      requestBody:
        content:
          application/json:
            schema: {title: body}
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Pet"}
            text/plain:
              schema: {title: text}
components:
  schemas:
    Pet:
      title: pet
      properties:
        self: {$ref: "#/components/schemas/Pet"}
  parameters:
    Limit:
      name: limit
      in: query
      schema: {title: limit}
"##;
        let mut spec = parse::from_yaml(yaml).unwrap();
        assert_eq!(titles(&mut spec), vec!["pet", "limit", "body", "text"]);
    }

    #[test]
    fn test_extra_roots_follow_the_primary_ones() {
        let yaml = r#"
openapi: 3.0.4
info: {title: t, version: "1"}
paths:
  /pets/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema: {title: path-param}
    get:
      parameters:
        - name: q
          in: query
          schema: {title: op-param}
      responses:
        "200":
          description: ok
          headers:
            X-Rate:
              schema: {title: header}
components:
  requestBodies:
    Upload:
      content:
        application/json:
          schema: {title: component-body}
"#;
        let mut spec = parse::from_yaml(yaml).unwrap();
        assert_eq!(
            titles(&mut spec),
            vec!["component-body", "path-param", "op-param", "header"]
        );
    }

    #[test]
    fn test_missing_schema_is_noop() {
        let mut calls = 0;
        walk_optional(None, &mut |_: &mut Schema| calls += 1);
        assert_eq!(calls, 0);
    }
}
