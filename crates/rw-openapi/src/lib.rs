//! OpenAPI reference pages for RW.
//!
//! Turns a bundled OpenAPI document into documentation pages:
//!
//! - [`extract_operations`]: flat list of [`Operation`]s from `paths`
//! - [`plan_pages`]: normalized, collision-free document paths with
//!   folder/leaf classification, handed to a [`PageSink`] by [`register_pages`]
//! - [`resolve_refs`] / [`StandaloneDocument`]: minimal self-contained
//!   fragment per operation (operation body plus reachable component schemas)
//! - [`operation_text`]: plain-text export of one operation page
//! - [`DocumentSource`]: where the bundled document comes from
//!
//! # Example
//!
//! ```
//! use rw_openapi::{PlanOptions, extract_operations, plan_pages};
//! use serde_json::json;
//!
//! let document = json!({
//!     "paths": {
//!         "/api/v1/business/{b}/queues": { "get": { "summary": "List queues" } },
//!         "/api/v1/business/{b}/queues/{q}/call": { "post": { "summary": "Call" } }
//!     }
//! });
//!
//! let operations = extract_operations(&document);
//! let pages = plan_pages(&operations, &PlanOptions::default()).unwrap();
//!
//! assert_eq!(pages[0].document_path, "business/queues/queues.mdx");
//! assert_eq!(pages[1].document_path, "business/queues/q/call.mdx");
//! ```

mod llm;
mod operation;
mod path;
mod plan;
mod refs;
mod source;

pub use llm::{Components, StandaloneDocument, operation_text};
pub use operation::{HttpMethod, Operation, OperationRef, extract_operations};
pub use path::{DEFAULT_PATH_PREFIX, FolderIndex, document_path, last_segment, normalize_path};
pub use plan::{
    CollisionPolicy, PageDescriptor, PageInfo, PageKind, PageSink, PlanError, PlanOptions,
    PlannedPage, plan_pages, register_pages,
};
pub use refs::{SchemaClosure, resolve_refs};
pub use source::{
    CachedSource, DocumentSource, FallbackSource, FileSource, HttpSource, SourceError, StaticSource,
};
