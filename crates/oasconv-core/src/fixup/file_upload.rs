//! `application/octet-stream` request bodies between 3.0 and 3.1.
//!
//! 3.1 describes a raw binary body by its media type alone; 3.0 needs an
//! explicit `{type: string, format: binary}` schema.

use crate::parse::media_type::OCTET_STREAM;
use crate::parse::request_body::{RequestBody, RequestBodyOrRef};
use crate::parse::schema::{Schema, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;

/// Remove the schema from every octet-stream request body entry. Returns the
/// number of entries changed.
pub fn clear_octet_stream_schemas(spec: &mut OpenApiSpec) -> usize {
    let mut changed = 0;
    for_each_request_body(spec, |body| {
        if let Some(media_type) = body.content.get_mut(OCTET_STREAM) {
            if media_type.schema.take().is_some() {
                changed += 1;
            }
        }
    });
    log::debug!("cleared {changed} octet-stream request body schemas");
    changed
}

/// Give every schema-less octet-stream request body entry a binary string
/// schema. Returns the number of entries changed.
pub fn add_octet_stream_schemas(spec: &mut OpenApiSpec) -> usize {
    let mut changed = 0;
    for_each_request_body(spec, |body| {
        if let Some(media_type) = body.content.get_mut(OCTET_STREAM) {
            if media_type.schema.is_none() {
                media_type.schema = Some(SchemaOrRef::inline(Schema::binary_string()));
                changed += 1;
            }
        }
    });
    log::debug!("added {changed} octet-stream request body schemas");
    changed
}

/// Inline request bodies of every operation, then those under
/// `components.requestBodies`.
fn for_each_request_body(spec: &mut OpenApiSpec, mut f: impl FnMut(&mut RequestBody)) {
    for path_item in spec.paths.values_mut() {
        for operation in path_item.operations_mut() {
            if let Some(RequestBodyOrRef::RequestBody(body)) = operation.request_body.as_mut() {
                f(body);
            }
        }
    }
    if let Some(components) = spec.components.as_mut() {
        for body in components.request_bodies.values_mut() {
            if let RequestBodyOrRef::RequestBody(body) = body {
                f(body);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const UPLOAD: &str = r#"
openapi: 3.0.4
info: {title: uploads, version: "1"}
paths:
  /files:
    put:
      requestBody:
        content:
          application/octet-stream:
            schema: {type: string, format: binary}
          application/json:
            schema: {type: object}
      responses:
        "204": {description: stored}
"#;

    fn octet_stream_schema(spec: &OpenApiSpec) -> Option<&SchemaOrRef> {
        let operation = spec.paths["/files"].put.as_ref().unwrap();
        match operation.request_body.as_ref().unwrap() {
            RequestBodyOrRef::RequestBody(body) => body.content[OCTET_STREAM].schema.as_ref(),
            RequestBodyOrRef::Ref { .. } => panic!("expected inline body"),
        }
    }

    #[test]
    fn test_clear_then_add() {
        let mut spec = parse::from_yaml(UPLOAD).unwrap();

        assert_eq!(clear_octet_stream_schemas(&mut spec), 1);
        assert!(octet_stream_schema(&spec).is_none());
        assert_eq!(clear_octet_stream_schemas(&mut spec), 0);

        assert_eq!(add_octet_stream_schemas(&mut spec), 1);
        let schema = octet_stream_schema(&spec).and_then(SchemaOrRef::as_schema).unwrap();
        assert_eq!(schema, &Schema::binary_string());
        assert_eq!(add_octet_stream_schemas(&mut spec), 0);
    }

    #[test]
    fn test_other_media_types_untouched() {
        let mut spec = parse::from_yaml(UPLOAD).unwrap();
        clear_octet_stream_schemas(&mut spec);
        let operation = spec.paths["/files"].put.as_ref().unwrap();
        let Some(RequestBodyOrRef::RequestBody(body)) = operation.request_body.as_ref() else {
            panic!("expected inline body");
        };
        assert!(body.content["application/json"].schema.is_some());
    }
}
