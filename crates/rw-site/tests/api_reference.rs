//! End-to-end: OpenAPI document on disk -> page tree -> plain-text exports.

use pretty_assertions::assert_eq;
use rw_openapi::{CachedSource, FallbackSource, FileSource, PlanOptions};
use rw_site::{ApiSite, NavItem, SiteConfig};
use serde_json::{Value, json};
use tempfile::TempDir;

fn bundled_document() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": { "title": "Test API", "version": "1" },
        "paths": {
            "/api/v1/business/{bizId}/queues": {
                "description": "Queue collection",
                "get": {
                    "summary": "List queues",
                    "responses": { "200": { "content": { "application/json": {
                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Queue" } }
                    } } } }
                }
            },
            "/api/v1/business/{bizId}/queues/{queueId}": {
                "get": {
                    "summary": "Get queue",
                    "responses": { "200": { "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/Queue" }
                    } } } }
                }
            },
            "/api/v1/business/{bizId}/queues/outbound/call": {
                "post": {
                    "operationId": "initiateCall",
                    "requestBody": { "content": { "application/json": {
                        "schema": { "$ref": "#/components/schemas/CallRequest" }
                    } } }
                }
            },
            "/health": {
                "get": {}
            }
        },
        "components": { "schemas": {
            "Queue": {
                "type": "object",
                "properties": { "parent": { "$ref": "#/components/schemas/Queue" } }
            },
            "CallRequest": {
                "type": "object",
                "properties": {
                    "queue": { "$ref": "#/components/schemas/Queue" },
                    "agent": { "$ref": "#/components/schemas/Agent" }
                }
            },
            "Unused": { "type": "string" }
        } }
    })
}

fn site_config() -> SiteConfig {
    SiteConfig {
        base_dir: "developers/api/v1".to_owned(),
        site_url: "https://docs.example.com".to_owned(),
        plan: PlanOptions::default(),
    }
}

fn write_document(dir: &TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, serde_json::to_string(&bundled_document()).unwrap()).unwrap();
    path
}

#[test]
fn test_build_from_local_fallback() {
    let tmp = TempDir::new().unwrap();
    let local = write_document(&tmp, "v1.json");
    let source = CachedSource::new(FallbackSource::new(
        FileSource::new(tmp.path().join("missing-remote.json")),
        FileSource::new(local),
    ));

    let site = ApiSite::load(&source, &site_config()).unwrap();

    let paths: Vec<_> = site
        .tree()
        .ordered_pages()
        .into_iter()
        .map(|p| p.document_path.as_str())
        .collect();
    assert_eq!(
        paths,
        vec![
            "business/queues/queues.mdx",
            "business/queues/queueId.mdx",
            "business/queues/outbound/call.mdx",
            "health.mdx",
        ]
    );
}

#[test]
fn test_navigation_tree() {
    let tmp = TempDir::new().unwrap();
    let site = ApiSite::load(&FileSource::new(write_document(&tmp, "v1.json")), &site_config())
        .unwrap();

    let nav = site.navigation();
    assert_eq!(nav.len(), 2);
    assert_eq!(nav[0].title, "business");
    assert_eq!(nav[0].url, None);

    let queues = &nav[0].children[0];
    assert_eq!(queues.title, "List queues");
    assert_eq!(
        queues.url.as_deref(),
        Some("/developers/api/v1/business/queues/queues")
    );
    let child_titles: Vec<_> = queues.children.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(child_titles, vec!["Get queue", "outbound"]);

    assert_eq!(
        nav[1],
        NavItem {
            title: "/health".to_owned(),
            url: Some("/developers/api/v1/health".to_owned()),
            children: Vec::new(),
        }
    );
}

#[test]
fn test_standalone_documents_are_self_contained() {
    let tmp = TempDir::new().unwrap();
    let site = ApiSite::load(&FileSource::new(write_document(&tmp, "v1.json")), &site_config())
        .unwrap();

    let call = site
        .tree()
        .get_page("business/queues/outbound/call.mdx")
        .unwrap();
    let standalone = site.standalone(call);

    // Agent is referenced but absent from components, so it is dropped.
    let names: Vec<_> = standalone.components.schemas.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["CallRequest", "Queue"]);

    let health = site.tree().get_page("health.mdx").unwrap();
    assert!(site.standalone(health).components.schemas.is_empty());
}

#[test]
fn test_full_text_export() {
    let tmp = TempDir::new().unwrap();
    let site = ApiSite::load(&FileSource::new(write_document(&tmp, "v1.json")), &site_config())
        .unwrap();

    let full = site.full_text();
    let headers: Vec<_> = full.lines().filter(|l| l.starts_with("# ")).collect();
    assert_eq!(
        headers,
        vec![
            "# List queues [GET /api/v1/business/{bizId}/queues] (Reference: https://docs.example.com/developers/api/v1/business/queues/queues)",
            "# Get queue [GET /api/v1/business/{bizId}/queues/{queueId}] (Reference: https://docs.example.com/developers/api/v1/business/queues/queueId)",
            "# initiateCall [POST /api/v1/business/{bizId}/queues/outbound/call] (Reference: https://docs.example.com/developers/api/v1/business/queues/outbound/call)",
            "# [GET /health] (Reference: https://docs.example.com/developers/api/v1/health)",
        ]
    );
    assert!(full.contains("## Description\nQueue collection\n"));
}

#[test]
fn test_yaml_document() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("v1.yaml");
    std::fs::write(
        &path,
        "paths:\n  /api/v1/ping:\n    get:\n      summary: Ping\n",
    )
    .unwrap();

    let site = ApiSite::load(&FileSource::new(path), &site_config()).unwrap();
    assert_eq!(site.tree().len(), 1);
    assert!(site.page_text_by_slug(&["ping"]).is_some());
}
