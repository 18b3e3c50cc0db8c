//! API reference site: bundled document plus its page tree.
//!
//! [`ApiSite`] runs the whole build for one document: extract operations,
//! plan document paths, register them into a [`PageTree`], and render the
//! plain-text exports on demand.
//!
//! # Thread Safety
//!
//! `ApiSite` is immutable after construction. Text exports compute each
//! page's schema closure independently, so the full export renders pages in
//! parallel.

use std::sync::Arc;

use rayon::prelude::*;
use rw_openapi::{
    DocumentSource, PlanError, PlanOptions, SourceError, StandaloneDocument, extract_operations,
    operation_text, plan_pages, register_pages,
};
use serde_json::Value;

use crate::page_tree::{NavItem, PageTree, TreeError, TreePage};

/// Error returned when building the site fails.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The OpenAPI document could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// Two operations resolved to the same page.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// The page tree rejected a page.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Configuration for [`ApiSite`].
#[derive(Clone, Debug, Default)]
pub struct SiteConfig {
    /// URL directory the API pages live under (e.g. `developers/api/v1`).
    pub base_dir: String,
    /// Public site URL used for canonical references (e.g. `https://docs.example.com`).
    ///
    /// Empty to emit site-relative references.
    pub site_url: String,
    /// Page planning options.
    pub plan: PlanOptions,
}

/// A built API reference: the bundled document and its navigation tree.
#[derive(Debug)]
pub struct ApiSite {
    document: Arc<Value>,
    tree: PageTree,
    site_url: String,
}

impl ApiSite {
    /// Load the document from `source` and build the site.
    pub fn load(source: &dyn DocumentSource, config: &SiteConfig) -> Result<Self, SiteError> {
        let document = source.load()?;
        Self::from_document(document, config)
    }

    /// Build the site from an already loaded document.
    ///
    /// An empty document produces an empty tree.
    pub fn from_document(document: Arc<Value>, config: &SiteConfig) -> Result<Self, SiteError> {
        let operations = extract_operations(&document);
        let pages = plan_pages(&operations, &config.plan)?;

        let mut tree = PageTree::new(&config.base_dir, &config.plan.extension);
        register_pages(&pages, &config.plan, &mut tree)?;

        tracing::info!(
            operations = operations.len(),
            folders = pages.iter().filter(|p| p.is_folder).count(),
            "built API reference tree"
        );

        Ok(Self {
            document,
            tree,
            site_url: config.site_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The page tree.
    #[must_use]
    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    /// Navigation tree for UI presentation.
    #[must_use]
    pub fn navigation(&self) -> Vec<NavItem> {
        self.tree.navigation()
    }

    /// Canonical URL of a page.
    #[must_use]
    pub fn reference_url(&self, page: &TreePage) -> String {
        format!("{}{}", self.site_url, page.url)
    }

    /// Standalone OpenAPI fragment for a page's operation.
    #[must_use]
    pub fn standalone(&self, page: &TreePage) -> StandaloneDocument {
        StandaloneDocument::build(&page.operation, &self.document)
    }

    /// Plain-text export of one page.
    #[must_use]
    pub fn page_text(&self, page: &TreePage) -> String {
        operation_text(
            &page.title,
            page.description.as_deref(),
            &self.reference_url(page),
            &self.standalone(page),
        )
    }

    /// Plain-text export of one page addressed by slug.
    #[must_use]
    pub fn page_text_by_slug(&self, slug: &[&str]) -> Option<String> {
        self.tree.page_by_slug(slug).map(|page| self.page_text(page))
    }

    /// Plain-text export of every page in navigation order, blank-line separated.
    #[must_use]
    pub fn full_text(&self) -> String {
        self.tree
            .ordered_pages()
            .par_iter()
            .map(|page| self.page_text(page))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
