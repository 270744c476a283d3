use oasconv_core::{ParseError, SpecVersion, detect};

const PETSTORE_SWAGGER: &str = include_str!("fixtures/petstore-swagger.yaml");
const ORDERS_30: &str = include_str!("fixtures/orders-3.0.yaml");
const EVENTS_31: &str = include_str!("fixtures/events-3.1.json");

#[test]
fn detect_fixtures() {
    assert_eq!(detect(PETSTORE_SWAGGER.as_bytes()).unwrap(), SpecVersion::Swagger);
    assert_eq!(detect(ORDERS_30.as_bytes()).unwrap(), SpecVersion::OpenApi30);
    assert_eq!(detect(EVENTS_31.as_bytes()).unwrap(), SpecVersion::OpenApi31);
}

#[test]
fn detect_every_supported_patch_version() {
    for version in ["3.0.0", "3.0.1", "3.0.2", "3.0.3", "3.0.4"] {
        let doc = format!("{{\"openapi\": \"{version}\"}}");
        assert_eq!(detect(doc.as_bytes()).unwrap(), SpecVersion::OpenApi30, "{version}");
    }
    for version in ["3.1.0", "3.1.1"] {
        let doc = format!("openapi: {version}\n");
        assert_eq!(detect(doc.as_bytes()).unwrap(), SpecVersion::OpenApi31, "{version}");
    }
}

#[test]
fn detect_unquoted_swagger_number() {
    assert_eq!(detect(b"swagger: 2.0\n").unwrap(), SpecVersion::Swagger);
}

#[test]
fn detect_openapi_field_wins() {
    let doc = b"swagger: '2.0'\nopenapi: 3.0.1\n";
    assert_eq!(detect(doc).unwrap(), SpecVersion::OpenApi30);
}

#[test]
fn detect_unsupported_version() {
    let err = detect(b"swagger: \"1.0\"\n").unwrap_err();
    assert!(matches!(&err, ParseError::UnsupportedVersion(v) if v == "1.0"));
    insta::assert_snapshot!(err.to_string(), @"unsupported document version: 1.0");

    let err = detect(b"{\"openapi\": \"3.2.0\"}").unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "3.2.0"));
}

#[test]
fn detect_without_version_field() {
    assert!(matches!(
        detect(b"info: {title: t}\n").unwrap_err(),
        ParseError::MissingVersion
    ));
}

#[test]
fn detect_reports_parse_errors() {
    assert!(matches!(
        detect(b"not: [valid").unwrap_err(),
        ParseError::Yaml(_)
    ));
    assert!(matches!(
        detect(b"{\"openapi\": \"3.0.1\"").unwrap_err(),
        ParseError::Json(_)
    ));
}
