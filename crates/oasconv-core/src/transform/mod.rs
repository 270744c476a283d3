pub mod rules;
pub mod swagger_schema;
pub mod walker;

pub use rules::{SchemaRule, apply_rules};
pub use walker::walk_all_schemas;

use crate::parse::spec::OpenApiSpec;

/// Apply `rules`, in order, to every schema node in the document.
pub fn apply_to_document(spec: &mut OpenApiSpec, rules: &[SchemaRule]) {
    let mut visited = 0usize;
    walk_all_schemas(spec, |schema| {
        apply_rules(rules, schema);
        visited += 1;
    });
    log::debug!("applied {} schema rules to {visited} nodes", rules.len());
}
