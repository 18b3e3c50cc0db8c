//! Transitive closure of component schema references.
//!
//! Given one operation fragment and the bundled document, collects every
//! `#/components/schemas/<Name>` definition reachable by `$ref` so the
//! operation can be serialized without dangling references.

use serde_json::{Map, Value};

/// Prefix of a local component schema reference.
const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Reference pointer key.
const REF_KEY: &str = "$ref";

/// An operation fragment together with the schemas it depends on.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaClosure {
    /// The raw operation object.
    pub operation_spec: Value,
    /// Reachable schemas in discovery order, each exactly once.
    pub schemas: Map<String, Value>,
}

impl SchemaClosure {
    /// Compute the closure of `operation_spec` against `document`.
    #[must_use]
    pub fn new(operation_spec: Value, document: &Value) -> Self {
        let schemas = resolve_refs(&operation_spec, document);
        Self {
            operation_spec,
            schemas,
        }
    }
}

/// Collect all component schemas transitively referenced from `fragment`.
///
/// References to schemas missing from `components.schemas` are skipped.
/// Cycles terminate because a schema is recorded before its own definition
/// is walked.
#[must_use]
pub fn resolve_refs(fragment: &Value, document: &Value) -> Map<String, Value> {
    let mut collected = Map::new();
    if let Some(schemas) = document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    {
        collect(fragment, schemas, &mut collected);
    }
    collected
}

fn collect(node: &Value, schemas: &Map<String, Value>, collected: &mut Map<String, Value>) {
    match node {
        Value::Array(items) => {
            for item in items {
                collect(item, schemas, collected);
            }
        }
        Value::Object(map) => {
            for (key, value) in map {
                if key == REF_KEY
                    && let Some(name) = value.as_str().and_then(schema_ref_name)
                {
                    if collected.contains_key(name) {
                        continue;
                    }
                    if let Some(definition) = schemas.get(name) {
                        collected.insert(name.to_owned(), definition.clone());
                        collect(definition, schemas, collected);
                    }
                } else {
                    collect(value, schemas, collected);
                }
            }
        }
        _ => {}
    }
}

/// Extract `<Name>` from `#/components/schemas/<Name>`.
fn schema_ref_name(pointer: &str) -> Option<&str> {
    pointer
        .strip_prefix(SCHEMA_REF_PREFIX)
        .and_then(|rest| rest.rsplit('/').next())
        .filter(|name| !name.is_empty())
}
