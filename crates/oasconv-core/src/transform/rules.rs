//! Per-node schema rewrites between the OpenAPI 3.0 and 3.1 schema dialects.
//!
//! Every rule looks at a single node and never its children; the walker
//! takes care of reaching every node. Rules are idempotent.

use serde_json::Number;

use crate::parse::schema::{ExclusiveBound, Schema, SchemaOrRef, SchemaType};

/// Written to `contentMediaType` when a 3.0 binary or byte string is upgraded.
pub const UPGRADED_BINARY_MEDIA_TYPE: &str = "base64";

/// The `contentMediaType` value recognised as binary content on downgrade.
///
/// This differs from [`UPGRADED_BINARY_MEDIA_TYPE`], so `format: binary`
/// does not survive a 3.0 → 3.1 → 3.0 round trip.
pub const DOWNGRADED_BINARY_MEDIA_TYPE: &str = "application/octet-stream";

/// The encoding name shared by `format: base64` and `contentEncoding`.
pub const BASE64: &str = "base64";

/// A single schema rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaRule {
    NullableToTypeArray,
    TypeArrayToNullable,
    ExclusiveBoundsToValues,
    ExclusiveBoundsToFlags,
    ExampleToExamples,
    ExamplesToExample,
    FormatToContentFields,
    ContentFieldsToFormat,
    DropReadOnlyRequired,
}

/// Rules applied to each node when upgrading 3.0 to 3.1, in order.
pub const UPGRADE_30_TO_31: &[SchemaRule] = &[
    SchemaRule::NullableToTypeArray,
    SchemaRule::ExclusiveBoundsToValues,
    SchemaRule::ExampleToExamples,
    SchemaRule::FormatToContentFields,
];

/// Rules applied to each node when downgrading 3.1 to 3.0, in order.
pub const DOWNGRADE_31_TO_30: &[SchemaRule] = &[
    SchemaRule::TypeArrayToNullable,
    SchemaRule::ExclusiveBoundsToFlags,
    SchemaRule::ExamplesToExample,
    SchemaRule::ContentFieldsToFormat,
];

/// Rules applied to each node before a 3.0 document is converted to Swagger.
pub const DOWNGRADE_30_TO_SWAGGER: &[SchemaRule] = &[SchemaRule::DropReadOnlyRequired];

impl SchemaRule {
    pub fn apply(self, schema: &mut Schema) {
        match self {
            SchemaRule::NullableToTypeArray => nullable_to_type_array(schema),
            SchemaRule::TypeArrayToNullable => type_array_to_nullable(schema),
            SchemaRule::ExclusiveBoundsToValues => exclusive_bounds_to_values(schema),
            SchemaRule::ExclusiveBoundsToFlags => exclusive_bounds_to_flags(schema),
            SchemaRule::ExampleToExamples => example_to_examples(schema),
            SchemaRule::ExamplesToExample => examples_to_example(schema),
            SchemaRule::FormatToContentFields => format_to_content_fields(schema),
            SchemaRule::ContentFieldsToFormat => content_fields_to_format(schema),
            SchemaRule::DropReadOnlyRequired => drop_read_only_required(schema),
        }
    }
}

/// Apply `rules` to one node in order.
pub fn apply_rules(rules: &[SchemaRule], schema: &mut Schema) {
    for rule in rules {
        rule.apply(schema);
    }
}

/// `nullable: true` becomes a `"null"` entry in the type set. The `nullable`
/// keyword is removed either way.
pub fn nullable_to_type_array(schema: &mut Schema) {
    if schema.nullable.take() != Some(true) {
        return;
    }
    let mut types = schema.types();
    if !types.contains(&SchemaType::Null) {
        types.push(SchemaType::Null);
    }
    schema.set_types(types);
}

/// A multi-entry type set becomes something 3.0 can express.
///
/// `[T, "null"]` collapses to `type: T, nullable: true`. Any other set of two
/// or more types moves into `oneOf`, one branch per non-null type, each
/// branch nullable when the set contained `"null"`.
pub fn type_array_to_nullable(schema: &mut Schema) {
    let types = schema.types();
    if types.len() < 2 {
        return;
    }

    let nullable = types.contains(&SchemaType::Null);
    let non_null: Vec<SchemaType> = types
        .into_iter()
        .filter(|t| *t != SchemaType::Null)
        .collect();

    if nullable && non_null.len() == 1 {
        schema.set_types(non_null);
        schema.nullable = Some(true);
        return;
    }

    if !schema.one_of.is_empty() {
        log::warn!(
            "replacing existing oneOf ({} branches) with one branch per type",
            schema.one_of.len()
        );
    }
    schema.one_of = non_null
        .into_iter()
        .map(|t| {
            SchemaOrRef::inline(Schema {
                nullable: nullable.then_some(true),
                ..Schema::of_type(t)
            })
        })
        .collect();
    schema.schema_type = None;
}

/// A `true` exclusivity flag takes the bound's value and the plain bound is
/// cleared. A `false` flag is dropped.
pub fn exclusive_bounds_to_values(schema: &mut Schema) {
    flag_to_value(&mut schema.minimum, &mut schema.exclusive_minimum);
    flag_to_value(&mut schema.maximum, &mut schema.exclusive_maximum);
}

fn flag_to_value(bound: &mut Option<Number>, exclusive: &mut Option<ExclusiveBound>) {
    match exclusive {
        Some(ExclusiveBound::Flag(true)) => {
            // A flag with no bound constrains nothing.
            *exclusive = bound.take().map(ExclusiveBound::Value);
        }
        Some(ExclusiveBound::Flag(false)) => *exclusive = None,
        _ => {}
    }
}

/// A numeric exclusive bound becomes the plain bound plus a `true` flag.
pub fn exclusive_bounds_to_flags(schema: &mut Schema) {
    value_to_flag(&mut schema.minimum, &mut schema.exclusive_minimum);
    value_to_flag(&mut schema.maximum, &mut schema.exclusive_maximum);
}

fn value_to_flag(bound: &mut Option<Number>, exclusive: &mut Option<ExclusiveBound>) {
    if let Some(ExclusiveBound::Value(value)) = exclusive {
        *bound = Some(value.clone());
        *exclusive = Some(ExclusiveBound::Flag(true));
    }
}

/// A single `example` becomes a one-element `examples` list.
pub fn example_to_examples(schema: &mut Schema) {
    if let Some(example) = schema.example.take() {
        schema.examples = Some(vec![example]);
    }
}

/// The first of `examples` becomes `example`. Any others are lost.
pub fn examples_to_example(schema: &mut Schema) {
    let Some(examples) = schema.examples.take() else {
        return;
    };
    if examples.len() > 1 {
        log::warn!("dropping {} extra schema examples", examples.len() - 1);
    }
    if let Some(first) = examples.into_iter().next() {
        schema.example = Some(first);
    }
}

/// String formats describing encoded content move to the 3.1 content
/// keywords. Only single-type string schemas are touched, and their
/// `format` is cleared whatever its value.
pub fn format_to_content_fields(schema: &mut Schema) {
    if !schema.is_single_type(SchemaType::String) {
        return;
    }
    match schema.format.take().as_deref() {
        Some("binary" | "byte") => {
            schema.content_media_type = Some(UPGRADED_BINARY_MEDIA_TYPE.to_string());
        }
        Some(BASE64) => schema.content_encoding = Some(BASE64.to_string()),
        Some(other) => log::debug!("dropping string format {other:?}"),
        None => {}
    }
}

/// The 3.1 content keywords on a string schema become a `format`. Both
/// keywords are removed whatever their value.
pub fn content_fields_to_format(schema: &mut Schema) {
    if !schema.is_single_type(SchemaType::String) {
        return;
    }
    if schema.content_media_type.take().as_deref() == Some(DOWNGRADED_BINARY_MEDIA_TYPE) {
        schema.format = Some("binary".to_string());
    }
    if schema.content_encoding.take().as_deref() == Some(BASE64) {
        schema.format = Some(BASE64.to_string());
    }
}

/// Remove names from `required` whose inline property schema is read-only.
/// Referenced properties are kept.
pub fn drop_read_only_required(schema: &mut Schema) {
    if schema.required.is_empty() {
        return;
    }
    let properties = &schema.properties;
    schema.required.retain(|name| {
        !properties
            .get(name)
            .and_then(SchemaOrRef::as_schema)
            .is_some_and(|property| property.read_only == Some(true))
    });
}
