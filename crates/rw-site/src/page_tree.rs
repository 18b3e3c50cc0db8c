//! Navigation tree of generated API pages.
//!
//! Pages are registered by document path (e.g. `business/queues/q/call.mdx`).
//! Each directory of a document path becomes a folder node. A page whose file
//! stem equals its folder's name (`business/queues/queues.mdx`) becomes the
//! folder's landing page instead of a child.
//!
//! # Architecture
//!
//! Nodes are stored in a flat `Vec<Node>` with children tracked by indices,
//! pages in a separate `Vec<TreePage>`. This provides:
//! - O(1) document path and URL lookups via `HashMap` indices
//! - insertion-ordered children without re-sorting

use std::collections::{HashMap, HashSet};

use rw_openapi::{OperationRef, PageDescriptor, PageSink};
use serde::Serialize;

/// Error returned when a page cannot be inserted.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// A page with the same document path already exists.
    #[error("page already registered: {0}")]
    Duplicate(String),
}

/// A page registered in the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePage {
    /// Document path as registered (e.g. `business/queues/queues.mdx`).
    pub document_path: String,
    /// URL path with leading slash (e.g. `/developers/api/v1/business/queues/queues`).
    pub url: String,
    /// Page title.
    pub title: String,
    /// Page description.
    pub description: Option<String>,
    /// The documented operation.
    pub operation: OperationRef,
}

/// Navigation item with children for UI tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display title.
    pub title: String,
    /// Link target. `None` for folders without a landing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Child navigation items.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

#[derive(Debug)]
enum Node {
    Folder {
        name: String,
        index: Option<usize>,
    },
    Page(usize),
}

/// Navigation tree populated through [`PageSink::create`].
#[derive(Debug)]
pub struct PageTree {
    base_url: String,
    extension: String,
    pages: Vec<TreePage>,
    nodes: Vec<Node>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    folders: HashMap<String, usize>,
    document_index: HashMap<String, usize>,
    url_index: HashMap<String, usize>,
}

impl PageTree {
    /// Create an empty tree.
    ///
    /// # Arguments
    ///
    /// * `base_dir` - URL directory all pages live under (e.g. `developers/api/v1`)
    /// * `extension` - Document extension stripped from URLs (e.g. `mdx`)
    #[must_use]
    pub fn new(base_dir: &str, extension: &str) -> Self {
        let base_dir = base_dir.trim_matches('/');
        let base_url = if base_dir.is_empty() {
            String::new()
        } else {
            format!("/{base_dir}")
        };

        Self {
            base_url,
            extension: extension.to_owned(),
            pages: Vec::new(),
            nodes: Vec::new(),
            children: Vec::new(),
            roots: Vec::new(),
            folders: HashMap::new(),
            document_index: HashMap::new(),
            url_index: HashMap::new(),
        }
    }

    /// Number of registered pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no pages are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get page by document path.
    #[must_use]
    pub fn get_page(&self, document_path: &str) -> Option<&TreePage> {
        self.document_index
            .get(document_path)
            .map(|&i| &self.pages[i])
    }

    /// Get page by URL path (with leading slash).
    #[must_use]
    pub fn page_by_url(&self, url: &str) -> Option<&TreePage> {
        self.url_index.get(url).map(|&i| &self.pages[i])
    }

    /// Get page by slug segments relative to the base URL.
    #[must_use]
    pub fn page_by_slug(&self, slug: &[&str]) -> Option<&TreePage> {
        self.page_by_url(&format!("{}/{}", self.base_url, slug.join("/")))
    }

    /// Pages in navigation order.
    ///
    /// Depth-first: a folder yields its landing page first, then its children
    /// in insertion order. Each page appears once.
    #[must_use]
    pub fn ordered_pages(&self) -> Vec<&TreePage> {
        fn visit<'a>(
            tree: &'a PageTree,
            idx: usize,
            seen: &mut HashSet<usize>,
            out: &mut Vec<&'a TreePage>,
        ) {
            match &tree.nodes[idx] {
                Node::Page(page) => {
                    if seen.insert(*page) {
                        out.push(&tree.pages[*page]);
                    }
                }
                Node::Folder { index, .. } => {
                    if let Some(page) = index
                        && seen.insert(*page)
                    {
                        out.push(&tree.pages[*page]);
                    }
                    for &child in &tree.children[idx] {
                        visit(tree, child, seen, out);
                    }
                }
            }
        }

        let mut seen = HashSet::with_capacity(self.pages.len());
        let mut out = Vec::with_capacity(self.pages.len());
        for &root in &self.roots {
            visit(self, root, &mut seen, &mut out);
        }
        out
    }

    /// Build the navigation tree for UI presentation.
    #[must_use]
    pub fn navigation(&self) -> Vec<NavItem> {
        self.roots.iter().map(|&i| self.nav_item(i)).collect()
    }

    fn nav_item(&self, idx: usize) -> NavItem {
        match &self.nodes[idx] {
            Node::Page(page) => {
                let page = &self.pages[*page];
                NavItem {
                    title: page.title.clone(),
                    url: Some(page.url.clone()),
                    children: Vec::new(),
                }
            }
            Node::Folder { name, index } => {
                let landing = index.map(|i| &self.pages[i]);
                NavItem {
                    title: landing.map_or_else(|| name.clone(), |p| p.title.clone()),
                    url: landing.map(|p| p.url.clone()),
                    children: self.children[idx]
                        .iter()
                        .map(|&child| self.nav_item(child))
                        .collect(),
                }
            }
        }
    }

    /// URL for a document path: base URL plus the path without extension.
    fn url_for(&self, document_path: &str) -> String {
        let suffix = format!(".{}", self.extension);
        let stem = document_path.strip_suffix(&suffix).unwrap_or(document_path);
        format!("{}/{stem}", self.base_url)
    }

    /// Return the folder node for `dir`, creating missing ancestors.
    fn ensure_folder(&mut self, dir: &str) -> usize {
        if let Some(&idx) = self.folders.get(dir) {
            return idx;
        }

        let (parent, name) = match dir.rsplit_once('/') {
            Some((parent, name)) => (Some(self.ensure_folder(parent)), name),
            None => (None, dir),
        };

        let idx = self.push_node(
            Node::Folder {
                name: name.to_owned(),
                index: None,
            },
            parent,
        );
        self.folders.insert(dir.to_owned(), idx);
        idx
    }

    fn push_node(&mut self, node: Node, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.children.push(Vec::new());
        match parent {
            Some(p) => self.children[p].push(idx),
            None => self.roots.push(idx),
        }
        idx
    }
}

impl PageSink for PageTree {
    type Error = TreeError;

    fn create(&mut self, page: PageDescriptor) -> Result<(), TreeError> {
        if self.document_index.contains_key(&page.path) {
            return Err(TreeError::Duplicate(page.path));
        }

        let url = self.url_for(&page.path);
        let page_idx = self.pages.len();
        self.pages.push(TreePage {
            document_path: page.path.clone(),
            url: url.clone(),
            title: page.info.title,
            description: page.info.description,
            operation: page.item,
        });
        self.document_index.insert(page.path.clone(), page_idx);
        self.url_index.insert(url, page_idx);

        let (dir, file) = page.path.rsplit_once('/').unwrap_or(("", page.path.as_str()));
        let suffix = format!(".{}", self.extension);
        let stem = file.strip_suffix(&suffix).unwrap_or(file);

        if dir.is_empty() {
            self.push_node(Node::Page(page_idx), None);
            return Ok(());
        }

        let folder = self.ensure_folder(dir);
        if let Node::Folder { name, index } = &mut self.nodes[folder]
            && index.is_none()
            && name.as_str() == stem
        {
            *index = Some(page_idx);
            return Ok(());
        }

        self.push_node(Node::Page(page_idx), Some(folder));
        Ok(())
    }
}
