//! Standalone operation documents and their plain-text rendering.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::operation::OperationRef;
use crate::refs::SchemaClosure;

/// A self-contained OpenAPI fragment for one operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandaloneDocument {
    /// Raw templated path.
    pub path: String,
    /// Upper-case HTTP method.
    pub method: String,
    /// The operation object.
    pub operation: Value,
    /// Schemas the operation depends on.
    pub components: Components,
}

/// `components` section of a [`StandaloneDocument`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Components {
    pub schemas: Map<String, Value>,
}

impl StandaloneDocument {
    /// Build the standalone document for `operation` from the bundled document.
    ///
    /// A missing operation degrades to an empty operation object.
    #[must_use]
    pub fn build(operation: &OperationRef, document: &Value) -> Self {
        let spec = operation
            .resolve(document)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        let closure = SchemaClosure::new(spec, document);

        Self {
            path: operation.path.clone(),
            method: operation.method.to_string(),
            operation: closure.operation_spec,
            components: Components {
                schemas: closure.schemas,
            },
        }
    }
}

/// Render the plain-text export of one operation page.
///
/// ````text
/// # <title> [<METHOD> <path>] (Reference: <url>)
///
/// ## Description
/// <description>
///
/// ## OpenAPI Specification
/// ```json
/// { ... }
/// ```
/// ````
///
/// The title is omitted when empty or equal to the raw path.
#[must_use]
pub fn operation_text(
    title: &str,
    description: Option<&str>,
    reference_url: &str,
    document: &StandaloneDocument,
) -> String {
    let heading = if title.is_empty() || title == document.path {
        String::new()
    } else {
        format!("{title} ")
    };
    let description = match description {
        Some(text) if !text.is_empty() => format!("\n## Description\n{text}\n"),
        _ => String::new(),
    };
    // Serializing a tree of JSON values cannot fail.
    let json = serde_json::to_string_pretty(document).unwrap_or_default();

    format!(
        "# {heading}[{} {}] (Reference: {reference_url})\n{description}\n## OpenAPI Specification\n```json\n{json}\n```",
        document.method, document.path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::HttpMethod;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bundled() -> Value {
        json!({
            "paths": {
                "/api/v1/users/{id}": {
                    "get": {
                        "summary": "Get user",
                        "responses": { "200": { "content": { "application/json": {
                            "schema": { "$ref": "#/components/schemas/User" }
                        } } } }
                    }
                }
            },
            "components": { "schemas": {
                "User": { "type": "object" },
                "Other": { "type": "string" }
            } }
        })
    }

    fn user_ref() -> OperationRef {
        OperationRef {
            path: "/api/v1/users/{id}".to_owned(),
            method: HttpMethod::Get,
        }
    }

    #[test]
    fn test_standalone_document_shape() {
        let doc = StandaloneDocument::build(&user_ref(), &bundled());
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["path"], "/api/v1/users/{id}");
        assert_eq!(value["method"], "GET");
        assert_eq!(value["operation"]["summary"], "Get user");
        assert_eq!(
            value["components"],
            json!({ "schemas": { "User": { "type": "object" } } })
        );
    }

    #[test]
    fn test_standalone_document_missing_operation() {
        let op = OperationRef {
            path: "/nope".to_owned(),
            method: HttpMethod::Post,
        };
        let doc = StandaloneDocument::build(&op, &bundled());

        assert_eq!(doc.operation, json!({}));
        assert!(doc.components.schemas.is_empty());
    }

    #[test]
    fn test_operation_text_layout() {
        let op = OperationRef {
            path: "/ping".to_owned(),
            method: HttpMethod::Get,
        };
        let doc = StandaloneDocument::build(&op, &json!({ "paths": { "/ping": { "get": {} } } }));

        let text = operation_text("Ping", Some("Health check"), "https://docs.test/ping", &doc);

        let expected = r#"# Ping [GET /ping] (Reference: https://docs.test/ping)

## Description
Health check

## OpenAPI Specification
```json
{
  "path": "/ping",
  "method": "GET",
  "operation": {},
  "components": {
    "schemas": {}
  }
}
```"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn test_operation_text_without_description() {
        let doc = StandaloneDocument::build(&user_ref(), &bundled());
        let text = operation_text("Get user", None, "/u", &doc);

        assert!(text.starts_with("# Get user [GET /api/v1/users/{id}] (Reference: /u)\n\n## OpenAPI Specification\n"));
        assert!(!text.contains("## Description"));
    }

    #[test]
    fn test_operation_text_omits_title_equal_to_path() {
        let doc = StandaloneDocument::build(&user_ref(), &bundled());
        let text = operation_text("/api/v1/users/{id}", None, "/u", &doc);

        assert!(text.starts_with("# [GET /api/v1/users/{id}]"));
    }
}
