//! API reference page tree and plain-text exports for RW.
//!
//! This crate provides:
//! - [`PageTree`]: navigation tree populated from planned API pages
//! - [`ApiSite`]: one built reference (document + tree) with plain-text exports
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use rw_openapi::StaticSource;
//! use rw_site::{ApiSite, SiteConfig};
//! use serde_json::json;
//!
//! let source = StaticSource::new(json!({
//!     "paths": { "/api/v1/ping": { "get": { "summary": "Ping" } } }
//! }));
//! let site = ApiSite::load(&source, &SiteConfig::default())?;
//!
//! let text = site.page_text_by_slug(&["ping"]).unwrap();
//! assert!(text.starts_with("# Ping [GET /api/v1/ping]"));
//! # Ok(())
//! # }
//! ```

mod page_tree;
mod site;

pub use page_tree::{NavItem, PageTree, TreeError, TreePage};
pub use site::{ApiSite, SiteConfig, SiteError};
