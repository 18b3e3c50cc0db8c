//! Page planning: from a batch of operations to document paths.
//!
//! Planning is a two-pass batch transform. The first pass normalizes every
//! operation path; the second classifies each normalized path as a folder or
//! a leaf against the whole batch and picks its final document path. Folder
//! decisions therefore need all operations up front.

use std::collections::HashMap;

use serde::Serialize;

use crate::operation::{HttpMethod, Operation, OperationRef};
use crate::path::{DEFAULT_PATH_PREFIX, FolderIndex, document_path, normalize_path};

/// What to do when two operations resolve to the same document path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Abort planning with [`PlanError::DuplicatePath`].
    #[default]
    Error,
    /// Rename the later page to `<stem>-<method>.<ext>`.
    AppendMethod,
}

/// Options controlling page planning.
#[derive(Clone, Debug)]
pub struct PlanOptions {
    /// Version prefix stripped from raw paths.
    pub path_prefix: String,
    /// File extension of generated documents (without dot).
    pub extension: String,
    /// Identifier of the source document, passed through to the page sink.
    pub schema_id: String,
    /// Collision handling.
    pub on_collision: CollisionPolicy,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            path_prefix: DEFAULT_PATH_PREFIX.to_owned(),
            extension: "mdx".to_owned(),
            schema_id: "api".to_owned(),
            on_collision: CollisionPolicy::Error,
        }
    }
}

/// Error returned when planning fails.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Two operations resolved to the same document path.
    #[error("duplicate document path {path}: {first} and {second}")]
    DuplicatePath {
        /// The contested document path.
        path: String,
        /// Operation that claimed the path first (`METHOD path`).
        first: String,
        /// Operation that collided with it.
        second: String,
    },
}

/// The placement decided for one operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedPage {
    /// Operation this page documents.
    pub operation: OperationRef,
    /// Normalized path (e.g. `business/queues`).
    pub normalized_path: String,
    /// Whether other operations nest beneath this path.
    pub is_folder: bool,
    /// Unique document path (e.g. `business/queues/queues.mdx`).
    pub document_path: String,
    /// Page title.
    pub title: String,
    /// Page description.
    pub description: Option<String>,
}

/// Title and description of a generated page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Kind of generated page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Operation,
}

/// Registration payload handed to a [`PageSink`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    /// Document path, unique within the sink.
    pub path: String,
    /// Identifier of the source document.
    #[serde(rename = "schemaId")]
    pub schema_id: String,
    pub info: PageInfo,
    #[serde(rename = "type")]
    pub kind: PageKind,
    /// The documented operation.
    pub item: OperationRef,
}

/// Receiver of generated pages (typically a navigation tree).
pub trait PageSink {
    /// Error returned when a page cannot be registered.
    type Error;

    /// Register one page keyed by its document path.
    fn create(&mut self, page: PageDescriptor) -> Result<(), Self::Error>;
}

/// Plan document paths for a batch of operations.
///
/// Output order follows input order. An empty batch plans nothing.
pub fn plan_pages(
    operations: &[Operation],
    options: &PlanOptions,
) -> Result<Vec<PlannedPage>, PlanError> {
    let normalized: Vec<String> = operations
        .iter()
        .map(|op| normalize_path(&op.path, &options.path_prefix))
        .collect();

    let folders = FolderIndex::new(normalized.iter().map(String::as_str));

    let mut claimed: HashMap<String, String> = HashMap::with_capacity(operations.len());
    let mut pages = Vec::with_capacity(operations.len());

    for (op, normalized_path) in operations.iter().zip(normalized) {
        let is_folder = folders.is_folder(&normalized_path);
        let mut path = document_path(&normalized_path, is_folder, &options.extension);
        let label = operation_label(op.method, &op.path);

        if let Some(first) = claimed.get(&path) {
            match options.on_collision {
                CollisionPolicy::Error => {
                    return Err(PlanError::DuplicatePath {
                        path,
                        first: first.clone(),
                        second: label,
                    });
                }
                CollisionPolicy::AppendMethod => {
                    let renamed = with_method_suffix(&path, &options.extension, op.method);
                    tracing::debug!(from = %path, to = %renamed, "renamed colliding page");
                    if let Some(first) = claimed.get(&renamed) {
                        return Err(PlanError::DuplicatePath {
                            path: renamed,
                            first: first.clone(),
                            second: label,
                        });
                    }
                    path = renamed;
                }
            }
        }

        claimed.insert(path.clone(), label);
        tracing::debug!(path = %op.path, document = %path, is_folder, "planned page");

        pages.push(PlannedPage {
            operation: op.reference(),
            normalized_path,
            is_folder,
            document_path: path,
            title: op.display_name.clone(),
            description: op.description.clone(),
        });
    }

    Ok(pages)
}

/// Hand every planned page to `sink`, stopping at the first sink error.
///
/// Takes the options the pages were planned with, so descriptors carry the
/// same `schema_id`.
pub fn register_pages<S: PageSink>(
    pages: &[PlannedPage],
    options: &PlanOptions,
    sink: &mut S,
) -> Result<(), S::Error> {
    for page in pages {
        sink.create(PageDescriptor {
            path: page.document_path.clone(),
            schema_id: options.schema_id.clone(),
            info: PageInfo {
                title: page.title.clone(),
                description: page.description.clone(),
            },
            kind: PageKind::Operation,
            item: page.operation.clone(),
        })?;
    }
    Ok(())
}

fn operation_label(method: HttpMethod, path: &str) -> String {
    format!("{method} {path}")
}

fn with_method_suffix(path: &str, extension: &str, method: HttpMethod) -> String {
    let suffix = format!(".{extension}");
    let stem = path.strip_suffix(&suffix).unwrap_or(path);
    format!("{stem}-{}{suffix}", method.as_key())
}
