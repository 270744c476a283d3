//! Conversion between Swagger 2.0, OpenAPI 3.0 and OpenAPI 3.1 documents.
//!
//! [`convert`] detects the input dialect and moves the document one dialect
//! at a time toward the requested one.

pub mod config;
pub mod convert;
pub mod error;
pub mod fixup;
pub mod format;
pub mod parse;
pub mod transform;
pub mod version;

pub use convert::convert;
pub use error::{ConvertError, ParseError, ResolveError};
pub use format::TextFormat;
pub use version::{SpecVersion, detect};
