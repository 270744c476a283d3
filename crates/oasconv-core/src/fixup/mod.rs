//! Document-level rewrites that are not local to a single schema node.

pub mod dialect_fields;
pub mod file_upload;
pub mod request_body;
pub mod upload_format;

pub use dialect_fields::{set_version, strip_31_fields};
pub use file_upload::{add_octet_stream_schemas, clear_octet_stream_schemas};
pub use request_body::{
    BodyContentLocation, BodyContents, extract_request_body_content, insert_body_parameters,
};
pub use upload_format::fix_upload_formats;
