use serde::Serialize;
use serde_json::Value;

use crate::error::ResolveError;

/// Arena prefixes for each dialect's reusable definitions.
pub const OPENAPI_SCHEMAS: &str = "#/components/schemas/";
pub const OPENAPI_PARAMETERS: &str = "#/components/parameters/";
pub const OPENAPI_RESPONSES: &str = "#/components/responses/";
pub const OPENAPI_REQUEST_BODIES: &str = "#/components/requestBodies/";
pub const SWAGGER_DEFINITIONS: &str = "#/definitions/";
pub const SWAGGER_PARAMETERS: &str = "#/parameters/";
pub const SWAGGER_RESPONSES: &str = "#/responses/";

/// Keys whose values are user data rather than document structure. A `$ref`
/// key inside them is not a reference.
const DATA_KEYS: &[&str] = &["example", "examples", "default", "enum", "const"];

/// Keys whose values are maps keyed by user-chosen names. Those names are
/// never keywords, even when they read `example` or `default`.
const NAMED_MAP_KEYS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "schemas",
    "parameters",
    "responses",
    "requestBodies",
    "headers",
    "paths",
];

/// Check that every local `$ref` in a document points at something that
/// exists. All dangling references are reported together.
///
/// External references (anything not starting with `#`) are left alone.
pub fn check_local_refs<T: Serialize>(document: &T) -> Result<(), Vec<ResolveError>> {
    let root = match serde_json::to_value(document) {
        Ok(root) => root,
        Err(e) => return Err(vec![ResolveError::InvalidRefFormat(e.to_string())]),
    };

    let mut refs = Vec::new();
    collect_refs(&root, false, &mut refs);

    let errors: Vec<ResolveError> = refs
        .into_iter()
        .filter_map(|ref_path| check_ref(&root, ref_path).err())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `named` is set while walking a map whose keys are names, not keywords.
fn collect_refs<'a>(value: &'a Value, named: bool, refs: &mut Vec<&'a str>) {
    match value {
        Value::Object(map) if named => {
            for child in map.values() {
                collect_refs(child, false, refs);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                let key = key.as_str();
                if key == "$ref" {
                    if let Value::String(ref_path) = child {
                        refs.push(ref_path);
                    }
                } else if !DATA_KEYS.contains(&key) && !key.starts_with("x-") {
                    collect_refs(child, NAMED_MAP_KEYS.contains(&key), refs);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_refs(item, false, refs);
            }
        }
        _ => {}
    }
}

fn check_ref(root: &Value, ref_path: &str) -> Result<(), ResolveError> {
    let Some(fragment) = ref_path.strip_prefix('#') else {
        return Ok(());
    };
    if fragment.is_empty() {
        return Ok(());
    }
    if !fragment.starts_with('/') {
        return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
    }
    match root.pointer(fragment) {
        Some(_) => Ok(()),
        None => Err(ResolveError::RefTargetNotFound(ref_path.to_string())),
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name,
/// undoing JSON Pointer escaping.
pub fn parse_ref_name(ref_path: &str, prefix: &str) -> Result<String, ResolveError> {
    let name = ref_path
        .strip_prefix(prefix)
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if name.is_empty() || name.contains('/') {
        return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
    }
    Ok(name.replace("~1", "/").replace("~0", "~"))
}

/// Build a reference to `name` in the arena at `prefix`, applying JSON
/// Pointer escaping.
pub fn make_ref(prefix: &str, name: &str) -> String {
    format!("{prefix}{}", name.replace('~', "~0").replace('/', "~1"))
}

/// Move a reference from one arena to another, e.g. `#/definitions/Pet` to
/// `#/components/schemas/Pet`. References outside `from` are returned as is.
pub fn rewrite_ref(ref_path: &str, from: &str, to: &str) -> String {
    match ref_path.strip_prefix(from) {
        Some(rest) => format!("{to}{rest}"),
        None => ref_path.to_string(),
    }
}
