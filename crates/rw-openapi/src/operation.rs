//! HTTP operations extracted from a bundled OpenAPI document.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP method of an OpenAPI operation.
///
/// Serialized in lower case, matching the keys of an OpenAPI path item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parse a path item key into a method. Returns `None` for non-method keys.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "patch" => Some(Self::Patch),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Path item key (lower case).
    #[must_use]
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key().to_ascii_uppercase())
    }
}

/// A single HTTP operation with its owning path item.
///
/// Operations are created once per document load and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    /// Raw templated path (e.g. `/api/v1/business/{bizId}/queues`).
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Human-readable title.
    pub display_name: String,
    /// Operation description, falling back to the path item description.
    pub description: Option<String>,
    /// The owning path item object.
    pub path_item: Value,
    /// The operation object.
    pub operation: Value,
}

impl Operation {
    /// Reference identifying this operation inside its document.
    #[must_use]
    pub fn reference(&self) -> OperationRef {
        OperationRef {
            path: self.path.clone(),
            method: self.method,
        }
    }
}

/// Lightweight pointer to an operation: `paths[path][method]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationRef {
    /// Raw templated path.
    pub path: String,
    /// HTTP method.
    pub method: HttpMethod,
}

impl OperationRef {
    /// Look up the operation object in a bundled document.
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        document
            .get("paths")?
            .get(&self.path)?
            .get(self.method.as_key())
    }
}

/// Extract every operation from the document's `paths`, in document order.
///
/// A missing or malformed `paths` object yields an empty list.
#[must_use]
pub fn extract_operations(document: &Value) -> Vec<Operation> {
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut operations = Vec::new();
    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        for (key, operation) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            if !operation.is_object() {
                continue;
            }
            operations.push(Operation {
                path: path.clone(),
                method,
                display_name: display_name(path, operation),
                description: description(operation, path_item),
                path_item: path_item.clone(),
                operation: operation.clone(),
            });
        }
    }

    tracing::debug!(count = operations.len(), "extracted operations");
    operations
}

fn display_name(path: &str, operation: &Value) -> String {
    string_field(operation, "summary")
        .or_else(|| string_field(operation, "operationId"))
        .unwrap_or_else(|| path.to_owned())
}

/// The operation's own description wins even when empty.
fn description(operation: &Value, path_item: &Value) -> Option<String> {
    operation
        .get("description")
        .filter(|v| !v.is_null())
        .or_else(|| path_item.get("description"))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}
