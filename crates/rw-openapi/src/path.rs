//! Path normalization and folder classification.
//!
//! API paths are deep and parameter-heavy. Normalization turns them into
//! readable document paths:
//!
//! ```text
//! /api/v1/business/{bizId}/queues/{queueId}  ->  business/queues/queueId
//! ```
//!
//! Interior template parameters collapse away, a terminal parameter stays as
//! a leaf name with braces stripped.

use std::collections::HashSet;

/// Default version prefix stripped from raw API paths.
pub const DEFAULT_PATH_PREFIX: &str = "/api/v1/";

/// Normalize a raw templated API path into a slash-joined segment sequence.
///
/// Never fails: a missing prefix is a no-op and empty, `.` and `..` segments
/// are dropped, so malformed input degrades to a short or empty path that
/// stays below the API root.
///
/// # Examples
///
/// ```
/// use rw_openapi::normalize_path;
///
/// assert_eq!(
///     normalize_path("/api/v1/business/{bizId}/queues/{queueId}", "/api/v1/"),
///     "business/queues/queueId"
/// );
/// assert_eq!(normalize_path("/health", "/api/v1/"), "health");
/// ```
#[must_use]
pub fn normalize_path(raw: &str, prefix: &str) -> String {
    let stripped = if prefix.is_empty() {
        raw
    } else {
        raw.strip_prefix(prefix).unwrap_or(raw)
    };

    let segments: Vec<&str> = stripped.split('/').collect();
    let last = segments.len() - 1;

    segments
        .iter()
        .enumerate()
        .filter_map(|(index, segment)| match template_name(segment) {
            Some(name) if index == last => Some(name),
            Some(_) => None,
            None => Some(*segment),
        })
        .filter(|segment| !is_dot_or_empty(segment))
        .collect::<Vec<_>>()
        .join("/")
}

/// Empty, `.` and `..` segments never reach a document path.
fn is_dot_or_empty(segment: &str) -> bool {
    matches!(segment, "" | "." | "..")
}

/// Return the parameter name if `segment` is a `{name}` template.
fn template_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

/// Last slash-delimited segment of a normalized path.
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Classifies normalized paths of one batch as folders or leaves.
///
/// A path is a folder iff another path in the batch starts with `<path>/`.
/// The check is prefix-exact (`queue` is not a parent of `queues`) and
/// irreflexive (a path never parents itself, even when duplicated).
pub struct FolderIndex {
    parents: HashSet<String>,
}

impl FolderIndex {
    /// Build the index from every normalized path of the batch.
    pub fn new<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut parents = HashSet::new();
        for path in paths {
            // Every proper slash-delimited prefix of a path is a parent.
            for (pos, _) in path.match_indices('/') {
                if pos > 0 {
                    parents.insert(path[..pos].to_owned());
                }
            }
        }
        Self { parents }
    }

    /// Whether some other path in the batch nests beneath `path`.
    #[must_use]
    pub fn is_folder(&self, path: &str) -> bool {
        !path.is_empty() && self.parents.contains(path)
    }
}

/// Build the document path for a normalized path.
///
/// Folders repeat their last segment as the file name so the folder can host
/// its own landing page: `business/queues` -> `business/queues/queues.mdx`.
#[must_use]
pub fn document_path(normalized: &str, is_folder: bool, extension: &str) -> String {
    if is_folder {
        format!("{normalized}/{}.{extension}", last_segment(normalized))
    } else {
        format!("{normalized}.{extension}")
    }
}
