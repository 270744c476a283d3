use oasconv_core::{ConvertError, ResolveError, SpecVersion, convert};
use serde_json::{Value, json};

const PETSTORE_SWAGGER: &str = include_str!("fixtures/petstore-swagger.yaml");
const ORDERS_30: &str = include_str!("fixtures/orders-3.0.yaml");
const EVENTS_31: &str = include_str!("fixtures/events-3.1.json");

fn convert_value(input: &str, target: SpecVersion) -> Value {
    let output = convert(input.as_bytes(), target).expect("conversion should succeed");
    serde_json::from_slice(&output).expect("output should be JSON")
}

fn has_body_parameter(operation: &Value) -> bool {
    operation["parameters"]
        .as_array()
        .is_some_and(|params| params.iter().any(|p| p["in"] == "body"))
}

#[test]
fn swagger_inline_body_to_31() {
    let input = r#"
swagger: "2.0"
info: {title: notes, version: "1"}
consumes: [application/json]
paths:
  /notes:
    post:
      parameters:
        - name: note
          in: body
          required: true
          schema:
            type: object
            required: [text]
            properties:
              text: {type: string}
              pinned: {type: boolean}
      responses:
        "201": {description: created}
"#;
    let doc = convert_value(input, SpecVersion::OpenApi31);

    assert_eq!(doc["openapi"], "3.1.1");
    let post = &doc["paths"]["/notes"]["post"];
    assert_eq!(
        post["requestBody"]["content"]["application/json"]["schema"],
        json!({
            "type": "object",
            "required": ["text"],
            "properties": {
                "text": {"type": "string"},
                "pinned": {"type": "boolean"}
            }
        })
    );
    assert_eq!(post["requestBody"]["required"], true);
    assert!(!has_body_parameter(post));
}

#[test]
fn swagger_petstore_to_30() {
    let doc = convert_value(PETSTORE_SWAGGER, SpecVersion::OpenApi30);

    assert_eq!(doc["openapi"], "3.0.4");
    assert!(doc.get("swagger").is_none());
    assert_eq!(
        doc["servers"],
        json!([
            {"url": "https://petstore.example.com/v1"},
            {"url": "http://petstore.example.com/v1"}
        ])
    );

    let list = &doc["paths"]["/pets"]["get"];
    assert_eq!(list["parameters"][0]["schema"], json!({"type": "integer", "format": "int32"}));
    assert_eq!(list["parameters"][1]["style"], "form");
    assert_eq!(list["parameters"][1]["explode"], false);
    assert_eq!(
        list["responses"]["200"]["content"]["application/json"]["schema"]["items"]["$ref"],
        "#/components/schemas/Pet"
    );

    let create = &doc["paths"]["/pets"]["post"];
    assert_eq!(
        create["requestBody"]["content"]["application/json"]["schema"]["$ref"],
        "#/components/schemas/NewPet"
    );
    assert!(!has_body_parameter(create));

    let upload = &doc["paths"]["/pets/{petId}/photo"]["post"];
    let form = &upload["requestBody"]["content"]["multipart/form-data"]["schema"];
    assert_eq!(form["required"], json!(["file"]));
    assert_eq!(form["properties"]["file"], json!({"type": "string", "format": "binary"}));
    assert_eq!(upload["parameters"].as_array().map(Vec::len), Some(1));

    let schemas = &doc["components"]["schemas"];
    assert_eq!(schemas["Pet"]["properties"]["tag"]["nullable"], true);
    assert!(schemas["Pet"]["properties"]["tag"].get("x-nullable").is_none());
    assert_eq!(
        doc["components"]["securitySchemes"]["api_key"],
        json!({"type": "apiKey", "name": "X-API-Key", "in": "header"})
    );
}

#[test]
fn swagger_nullable_becomes_type_array_in_31() {
    let doc = convert_value(PETSTORE_SWAGGER, SpecVersion::OpenApi31);
    assert_eq!(
        doc["components"]["schemas"]["Pet"]["properties"]["tag"]["type"],
        json!(["string", "null"])
    );
}

#[test]
fn openapi_30_to_swagger() {
    let doc = convert_value(ORDERS_30, SpecVersion::Swagger);

    assert_eq!(doc["swagger"], "2.0");
    assert!(doc.get("openapi").is_none());
    assert_eq!(doc["host"], "api.example.com");
    assert_eq!(doc["basePath"], "/v2");
    assert_eq!(doc["schemes"], json!(["https"]));

    let create = &doc["paths"]["/orders"]["post"];
    assert!(create.get("requestBody").is_none());
    assert_eq!(
        create["parameters"],
        json!([{
            "name": "body",
            "in": "body",
            "required": true,
            "schema": {"$ref": "#/definitions/Order"}
        }])
    );
    assert!(
        create["consumes"]
            .as_array()
            .is_some_and(|c| c.contains(&json!("application/json")))
    );
    assert_eq!(
        create["responses"]["201"]["schema"]["$ref"],
        "#/definitions/Order"
    );

    let order = &doc["definitions"]["Order"];
    assert_eq!(order["required"], json!(["quantity"]));
    assert_eq!(order["properties"]["note"]["x-nullable"], true);
    assert!(order["properties"]["note"].get("nullable").is_none());
    assert_eq!(order["properties"]["quantity"]["exclusiveMaximum"], true);

    let bearer = &doc["securityDefinitions"]["bearer"];
    assert_eq!(bearer["type"], "apiKey");
    assert_eq!(bearer["in"], "header");
    assert_eq!(bearer["name"], "Authorization");
}

#[test]
fn openapi_30_to_31_schema_rules() {
    let doc = convert_value(ORDERS_30, SpecVersion::OpenApi31);
    assert_eq!(doc["openapi"], "3.1.1");

    let properties = &doc["components"]["schemas"]["Order"]["properties"];
    assert_eq!(properties["note"], json!({"type": ["string", "null"]}));
    assert_eq!(
        properties["quantity"],
        json!({"type": "integer", "minimum": 1, "exclusiveMaximum": 100})
    );
    assert_eq!(properties["price"], json!({"type": "number", "examples": [9.5]}));
    assert_eq!(
        doc["components"]["schemas"]["Order"]["required"],
        json!(["id", "quantity"])
    );
}

#[test]
fn openapi_30_round_trip_through_31() {
    let upgraded = convert(ORDERS_30.as_bytes(), SpecVersion::OpenApi31).unwrap();
    let restored = convert(&upgraded, SpecVersion::OpenApi30).unwrap();
    let doc: Value = serde_json::from_slice(&restored).unwrap();

    assert_eq!(doc["openapi"], "3.0.4");
    let properties = &doc["components"]["schemas"]["Order"]["properties"];
    assert_eq!(properties["note"], json!({"type": "string", "nullable": true}));
    assert_eq!(
        properties["quantity"],
        json!({"type": "integer", "minimum": 1, "maximum": 100, "exclusiveMaximum": true})
    );
    assert_eq!(properties["price"], json!({"type": "number", "example": 9.5}));
}

// A 3.0 binary string upgrades to `contentMediaType: base64`, but only
// `application/octet-stream` downgrades back to `format: binary`.
#[test]
fn binary_format_is_lost_on_round_trip_through_31() {
    let input = r#"
openapi: 3.0.4
info: {title: files, version: "1"}
paths: {}
components:
  schemas:
    Blob: {type: string, format: binary}
"#;
    let upgraded = convert_value(input, SpecVersion::OpenApi31);
    assert_eq!(
        upgraded["components"]["schemas"]["Blob"],
        json!({"type": "string", "contentMediaType": "base64"})
    );

    let upgraded = serde_json::to_vec(&upgraded).unwrap();
    let restored = convert(&upgraded, SpecVersion::OpenApi30).unwrap();
    let doc: Value = serde_json::from_slice(&restored).unwrap();
    assert_eq!(doc["components"]["schemas"]["Blob"], json!({"type": "string"}));
}

#[test]
fn openapi_31_to_30() {
    let doc = convert_value(EVENTS_31, SpecVersion::OpenApi30);

    assert_eq!(doc["openapi"], "3.0.4");
    assert!(doc.get("jsonSchemaDialect").is_none());
    assert!(doc.get("webhooks").is_none());
    assert!(doc["info"].get("summary").is_none());
    assert!(doc["info"]["license"].get("identifier").is_none());
    assert_eq!(doc["info"]["license"]["name"], "Apache 2.0");

    let upload = &doc["paths"]["/events/{id}/attachment"]["put"];
    assert_eq!(
        upload["requestBody"]["content"]["application/octet-stream"]["schema"],
        json!({"type": "string", "format": "binary"})
    );

    let properties = &doc["components"]["schemas"]["Event"]["properties"];
    assert_eq!(
        properties["score"],
        json!({"type": "number", "minimum": 0, "exclusiveMinimum": true})
    );
    assert_eq!(
        properties["payload"],
        json!({"oneOf": [
            {"type": "string", "nullable": true},
            {"type": "integer", "nullable": true}
        ]})
    );
    assert_eq!(properties["parent"], json!({"type": "string", "nullable": true}));
    assert_eq!(properties["blob"], json!({"type": "string", "format": "binary"}));
    assert_eq!(properties["tags"]["example"], json!(["a", "b"]));
    assert!(properties["tags"].get("examples").is_none());
}

#[test]
fn openapi_31_round_trip_through_30() {
    let downgraded = convert(EVENTS_31.as_bytes(), SpecVersion::OpenApi30).unwrap();
    let doc = convert_value(
        std::str::from_utf8(&downgraded).unwrap(),
        SpecVersion::OpenApi31,
    );

    assert_eq!(doc["openapi"], "3.1.1");
    let properties = &doc["components"]["schemas"]["Event"]["properties"];
    assert_eq!(properties["parent"], json!({"type": ["string", "null"]}));
    assert_eq!(properties["score"], json!({"type": "number", "exclusiveMinimum": 0}));
    assert_eq!(properties["tags"]["examples"], json!([["a", "b"]]));
}

#[test]
fn openapi_31_octet_stream_schema_cleared_on_upgrade() {
    let input = r#"
openapi: 3.0.4
info: {title: files, version: "1"}
paths:
  /files:
    put:
      requestBody:
        content:
          application/octet-stream:
            schema: {type: string, format: binary}
      responses:
        "204": {description: stored}
"#;
    let doc = convert_value(input, SpecVersion::OpenApi31);
    assert_eq!(
        doc["paths"]["/files"]["put"]["requestBody"]["content"]["application/octet-stream"],
        json!({})
    );
}

#[test]
fn identity_returns_input_unchanged() {
    let output = convert(ORDERS_30.as_bytes(), SpecVersion::OpenApi30).unwrap();
    assert_eq!(output, ORDERS_30.as_bytes());
}

#[test]
fn swagger_to_31_runs_two_steps() {
    let output = convert(PETSTORE_SWAGGER.as_bytes(), SpecVersion::OpenApi31).unwrap();
    let doc: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(doc["openapi"], "3.1.1");
    assert_eq!(
        doc["paths"]["/pets/{petId}/photo"]["post"]["requestBody"]["content"]
            ["multipart/form-data"]["schema"]["properties"]["file"],
        json!({"type": "string", "contentMediaType": "base64"})
    );
}

#[test]
fn openapi_31_to_swagger_runs_two_steps() {
    let input = r##"{
  "openapi": "3.1.1",
  "info": {"title": "t", "version": "1"},
  "paths": {
    "/items": {
      "post": {
        "requestBody": {
          "content": {
            "application/json": {"schema": {"$ref": "#/components/schemas/Item"}}
          }
        },
        "responses": {"204": {"description": "ok"}}
      }
    }
  },
  "components": {
    "schemas": {
      "Item": {"type": "object", "properties": {"label": {"type": ["string", "null"]}}}
    }
  }
}"##;
    let doc = convert_value(input, SpecVersion::Swagger);
    assert_eq!(doc["swagger"], "2.0");
    assert_eq!(
        doc["definitions"]["Item"]["properties"]["label"],
        json!({"type": "string", "x-nullable": true})
    );
    assert_eq!(
        doc["paths"]["/items"]["post"]["parameters"][0]["schema"]["$ref"],
        "#/definitions/Item"
    );
}

#[test]
fn dangling_reference_fails_the_step() {
    let input = r##"
openapi: 3.0.4
info: {title: broken, version: "1"}
paths:
  /things:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Missing"}
"##;
    let err = convert(input.as_bytes(), SpecVersion::OpenApi31).unwrap_err();
    let ConvertError::Load(errors) = &err else {
        panic!("expected a load error, got {err:?}");
    };
    assert!(matches!(
        errors.as_slice(),
        [ResolveError::RefTargetNotFound(r)] if r == "#/components/schemas/Missing"
    ));
    insta::assert_snapshot!(
        err.to_string(),
        @"errors loading document: reference target not found: #/components/schemas/Missing"
    );
}

#[test]
fn unsupported_version_is_reported() {
    let err = convert(b"swagger: \"1.0\"\n", SpecVersion::OpenApi31).unwrap_err();
    assert!(err.is_unsupported_version());
}

#[test]
fn string_formats_are_cleared_on_upgrade() {
    let input = r#"
openapi: 3.0.4
info: {title: clock, version: "1"}
paths: {}
components:
  schemas:
    Tick:
      type: object
      properties:
        at: {type: string, format: date-time}
        seq: {type: integer, format: int64}
"#;
    let doc = convert_value(input, SpecVersion::OpenApi31);
    let properties = &doc["components"]["schemas"]["Tick"]["properties"];
    assert_eq!(properties["at"], json!({"type": "string"}));
    assert_eq!(properties["seq"], json!({"type": "integer", "format": "int64"}));
}

#[test]
fn reference_siblings_survive_conversion() {
    let input = r##"{
  "openapi": "3.1.0",
  "info": {"title": "t", "version": "1"},
  "paths": {},
  "components": {
    "schemas": {
      "A": {"type": "string"},
      "B": {
        "type": "object",
        "properties": {
          "a": {
            "$ref": "#/components/schemas/A",
            "description": "the a side",
            "x-order": 1
          }
        }
      }
    }
  }
}"##;
    let doc = convert_value(input, SpecVersion::OpenApi30);
    assert_eq!(
        doc["components"]["schemas"]["B"]["properties"]["a"],
        json!({
            "$ref": "#/components/schemas/A",
            "description": "the a side",
            "x-order": 1
        })
    );

    let swagger = convert_value(input, SpecVersion::Swagger);
    assert_eq!(
        swagger["definitions"]["B"]["properties"]["a"]["$ref"],
        "#/definitions/A"
    );
    assert_eq!(
        swagger["definitions"]["B"]["properties"]["a"]["description"],
        "the a side"
    );
}

#[test]
fn boolean_schemas_pass_through() {
    let input = r##"{
  "openapi": "3.1.0",
  "info": {"title": "t", "version": "1"},
  "paths": {},
  "components": {
    "schemas": {
      "Anything": {"type": "array", "items": true},
      "Never": false,
      "Open": {
        "type": ["object", "null"],
        "properties": {"extra": true}
      }
    }
  }
}"##;
    let doc = convert_value(input, SpecVersion::OpenApi30);
    let schemas = &doc["components"]["schemas"];
    assert_eq!(schemas["Anything"], json!({"type": "array", "items": true}));
    assert_eq!(schemas["Never"], json!(false));
    assert_eq!(
        schemas["Open"],
        json!({"type": "object", "nullable": true, "properties": {"extra": true}})
    );
}
