//! OpenAPI 3.1 → OpenAPI 3.0.

use crate::error::ConvertError;
use crate::fixup;
use crate::parse;
use crate::parse::spec::OpenApiSpec;
use crate::transform::{self, rules};
use crate::version::SpecVersion;

pub const STEP: &str = "OpenAPI 3.1 to OpenAPI 3.0";

pub fn convert(data: &[u8]) -> Result<Vec<u8>, ConvertError> {
    let mut spec: OpenApiSpec = parse::load(data, STEP)?;
    downgrade(&mut spec);
    parse::render(&spec)
}

/// Downgrade a parsed 3.1 document in place.
pub fn downgrade(spec: &mut OpenApiSpec) {
    fixup::set_version(spec, SpecVersion::OpenApi30);
    fixup::add_octet_stream_schemas(spec);
    transform::apply_to_document(spec, rules::DOWNGRADE_31_TO_30);
    fixup::strip_31_fields(spec);
}
