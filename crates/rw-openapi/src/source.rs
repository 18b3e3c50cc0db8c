//! Sources of the bundled OpenAPI document.
//!
//! The usual setup fetches the document from the running API and falls back
//! to a local copy checked into the docs repository:
//!
//! ```ignore
//! let source = CachedSource::new(FallbackSource::new(
//!     HttpSource::new("https://app.example.com/openapi/v1.json", Duration::from_secs(30)),
//!     FileSource::new("v1.json"),
//! ));
//! let document = source.load()?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use ureq::Agent;

/// Error returned when a document cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        /// Requested URL.
        url: String,
        #[source]
        source: ureq::Error,
    },

    /// Server returned an error status.
    #[error("HTTP error from {url}: {status} - {body}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error reading a local document.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Document path.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid JSON document.
    #[error("invalid JSON in {origin}: {source}")]
    Json {
        /// URL or file path of the document.
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid YAML document.
    #[error("invalid YAML in {}: {source}", path.display())]
    Yaml {
        /// Document path.
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Both the primary and the fallback source failed.
    #[error("no OpenAPI document available: {primary}; fallback: {fallback}")]
    Exhausted {
        /// Error from the primary source.
        primary: Box<SourceError>,
        /// Error from the fallback source.
        fallback: Box<SourceError>,
    },
}

/// Provider of a bundled OpenAPI document.
pub trait DocumentSource: Send + Sync {
    /// Load the document.
    fn load(&self) -> Result<Arc<Value>, SourceError>;

    /// Human-readable origin (URL or path) for logs.
    fn origin(&self) -> String;
}

/// Fetches the document over HTTP.
pub struct HttpSource {
    agent: Agent,
    url: String,
    snapshot: Option<PathBuf>,
    max_bytes: u64,
}

impl HttpSource {
    /// Create a source for `url` with a global request timeout.
    #[must_use]
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            url: url.into(),
            snapshot: None,
            max_bytes: u64::MAX,
        }
    }

    /// Reject response bodies larger than `max_bytes`.
    ///
    /// Unlimited by default: bundled documents routinely exceed the HTTP
    /// client's own 10 MiB body limit.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Write every successfully fetched document to `path`.
    ///
    /// Keeps the local fallback copy fresh. Write failures are logged only.
    #[must_use]
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot = Some(path.into());
        self
    }

    fn write_snapshot(&self, document: &Value) {
        let Some(path) = &self.snapshot else {
            return;
        };
        let result = serde_json::to_vec_pretty(document)
            .map_err(std::io::Error::other)
            .and_then(|bytes| std::fs::write(path, bytes));
        match result {
            Ok(()) => tracing::debug!(path = %path.display(), "wrote OpenAPI snapshot"),
            Err(e) => tracing::warn!(path = %path.display(), "failed to write OpenAPI snapshot: {e}"),
        }
    }
}

impl DocumentSource for HttpSource {
    fn load(&self) -> Result<Arc<Value>, SourceError> {
        tracing::info!(url = %self.url, "fetching OpenAPI document");

        let response = self
            .agent
            .get(&self.url)
            .header("Accept", "application/json")
            .call()
            .map_err(|source| SourceError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(SourceError::HttpStatus {
                url: self.url.clone(),
                status,
                body,
            });
        }

        let text = body_reader
            .with_config()
            .limit(self.max_bytes)
            .read_to_string()
            .map_err(|source| SourceError::Http {
                url: self.url.clone(),
                source,
            })?;
        let document: Value = serde_json::from_str(&text).map_err(|source| SourceError::Json {
            origin: self.url.clone(),
            source,
        })?;

        self.write_snapshot(&document);
        Ok(Arc::new(document))
    }

    fn origin(&self) -> String {
        self.url.clone()
    }
}

/// Reads the document from a local JSON or YAML file.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_yaml(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
    }
}

impl DocumentSource for FileSource {
    fn load(&self) -> Result<Arc<Value>, SourceError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let document: Value = if Self::is_yaml(&self.path) {
            serde_yaml::from_str(&content).map_err(|source| SourceError::Yaml {
                path: self.path.clone(),
                source,
            })?
        } else {
            serde_json::from_str(&content).map_err(|source| SourceError::Json {
                origin: self.path.display().to_string(),
                source,
            })?
        };

        tracing::debug!(path = %self.path.display(), "loaded local OpenAPI document");
        Ok(Arc::new(document))
    }

    fn origin(&self) -> String {
        self.path.display().to_string()
    }
}

/// Tries `primary` first and falls back to `fallback` on any error.
pub struct FallbackSource {
    primary: Box<dyn DocumentSource>,
    fallback: Box<dyn DocumentSource>,
}

impl FallbackSource {
    #[must_use]
    pub fn new(primary: impl DocumentSource + 'static, fallback: impl DocumentSource + 'static) -> Self {
        Self {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        }
    }
}

impl DocumentSource for FallbackSource {
    fn load(&self) -> Result<Arc<Value>, SourceError> {
        let primary = match self.primary.load() {
            Ok(document) => return Ok(document),
            Err(e) => e,
        };

        tracing::warn!(
            "failed to load OpenAPI document from {}, falling back to {}: {primary}",
            self.primary.origin(),
            self.fallback.origin()
        );

        self.fallback.load().map_err(|fallback| SourceError::Exhausted {
            primary: Box::new(primary),
            fallback: Box::new(fallback),
        })
    }

    fn origin(&self) -> String {
        format!("{} (fallback: {})", self.primary.origin(), self.fallback.origin())
    }
}

/// Memoizes the first successful load of an inner source.
///
/// Failed loads are not cached, the next call retries.
pub struct CachedSource<S> {
    inner: S,
    cached: Mutex<Option<Arc<Value>>>,
}

impl<S: DocumentSource> CachedSource<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }
}

impl<S: DocumentSource> DocumentSource for CachedSource<S> {
    fn load(&self) -> Result<Arc<Value>, SourceError> {
        let mut cached = self
            .cached
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(document) = cached.as_ref() {
            return Ok(Arc::clone(document));
        }

        let document = self.inner.load()?;
        *cached = Some(Arc::clone(&document));
        Ok(document)
    }

    fn origin(&self) -> String {
        self.inner.origin()
    }
}

/// In-memory document, mostly useful in tests.
pub struct StaticSource(Arc<Value>);

impl StaticSource {
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self(Arc::new(document))
    }
}

impl DocumentSource for StaticSource {
    fn load(&self) -> Result<Arc<Value>, SourceError> {
        Ok(Arc::clone(&self.0))
    }

    fn origin(&self) -> String {
        "<memory>".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    /// Source that fails a fixed number of times before succeeding.
    struct FlakySource {
        failures_left: AtomicUsize,
        calls: Arc<AtomicUsize>,
    }

    impl DocumentSource for FlakySource {
        fn load(&self) -> Result<Arc<Value>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failures_left.load(Ordering::SeqCst) > 0 {
                self.failures_left.fetch_sub(1, Ordering::SeqCst);
                return Err(missing_file());
            }
            Ok(Arc::new(json!({ "openapi": "3.1.0" })))
        }

        fn origin(&self) -> String {
            "flaky".to_owned()
        }
    }

    fn missing_file() -> SourceError {
        FileSource::new("/nonexistent/openapi.json").load().unwrap_err()
    }

    #[test]
    fn test_file_source_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v1.json");
        std::fs::write(&path, r#"{"openapi":"3.1.0","paths":{}}"#).unwrap();

        let document = FileSource::new(&path).load().unwrap();
        assert_eq!(*document, json!({ "openapi": "3.1.0", "paths": {} }));
    }

    #[test]
    fn test_file_source_yaml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v1.yaml");
        std::fs::write(&path, "openapi: 3.1.0\npaths:\n  /ping:\n    get:\n      summary: Ping\n").unwrap();

        let document = FileSource::new(&path).load().unwrap();
        assert_eq!(document["paths"]["/ping"]["get"]["summary"], "Ping");
    }

    #[test]
    fn test_file_source_missing_file() {
        let err = missing_file();
        assert!(matches!(err, SourceError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/openapi.json"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileSource::new(&path).load().unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }

    #[test]
    fn test_fallback_uses_primary_when_available() {
        let source = FallbackSource::new(
            StaticSource::new(json!({ "from": "primary" })),
            StaticSource::new(json!({ "from": "fallback" })),
        );
        assert_eq!(source.load().unwrap()["from"], "primary");
    }

    #[test]
    fn test_fallback_on_primary_error() {
        let source = FallbackSource::new(
            FileSource::new("/nonexistent/remote.json"),
            StaticSource::new(json!({ "from": "fallback" })),
        );
        assert_eq!(source.load().unwrap()["from"], "fallback");
    }

    #[test]
    fn test_fallback_exhausted_reports_both_errors() {
        let source = FallbackSource::new(
            FileSource::new("/nonexistent/remote.json"),
            FileSource::new("/nonexistent/local.json"),
        );

        let err = source.load().unwrap_err();
        assert!(matches!(err, SourceError::Exhausted { .. }));
        let msg = err.to_string();
        assert!(msg.contains("remote.json"));
        assert!(msg.contains("local.json"));
    }

    #[test]
    fn test_cached_source_loads_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CachedSource::new(FlakySource {
            failures_left: AtomicUsize::new(0),
            calls: Arc::clone(&calls),
        });

        let first = source.load().unwrap();
        let second = source.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cached_source_retries_after_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = CachedSource::new(FlakySource {
            failures_left: AtomicUsize::new(1),
            calls: Arc::clone(&calls),
        });

        assert!(source.load().is_err());
        assert!(source.load().is_ok());
        assert!(source.load().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_http_source_unreachable_host_is_http_error() {
        let source = HttpSource::new("http://127.0.0.1:9/openapi.json", Duration::from_secs(2));

        let err = source.load().unwrap_err();
        assert!(matches!(err, SourceError::Http { .. }), "got {err:?}");
    }

    /// Serve one canned HTTP response on a local port and return its URL.
    fn serve_once(status: &str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            // The client may hang up early when it rejects the body.
            let _ = stream.write_all(response.as_bytes());
        });

        format!("http://{addr}/openapi.json")
    }

    fn http_source(url: &str) -> HttpSource {
        HttpSource::new(url, Duration::from_secs(10))
    }

    #[test]
    fn test_http_source_error_status() {
        let url = serve_once("500 Internal Server Error", "boom".to_owned());

        let err = http_source(&url).load().unwrap_err();
        match err {
            SourceError::HttpStatus { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_http_source_invalid_json() {
        let url = serve_once("200 OK", "<html>".to_owned());

        let err = http_source(&url).load().unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }), "got {err:?}");
    }

    #[test]
    fn test_http_source_writes_snapshot() {
        let tmp = TempDir::new().unwrap();
        let snapshot = tmp.path().join("v1.json");
        let url = serve_once("200 OK", r#"{"openapi":"3.1.0","paths":{}}"#.to_owned());

        let document = http_source(&url).with_snapshot(&snapshot).load().unwrap();

        assert_eq!(*document, json!({ "openapi": "3.1.0", "paths": {} }));
        let written = FileSource::new(&snapshot).load().unwrap();
        assert_eq!(written, document);
    }

    #[test]
    fn test_http_source_snapshot_failure_is_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let snapshot = tmp.path().join("missing-dir").join("v1.json");
        let url = serve_once("200 OK", r#"{"openapi":"3.1.0"}"#.to_owned());

        let document = http_source(&url).with_snapshot(&snapshot).load().unwrap();

        assert_eq!(document["openapi"], "3.1.0");
        assert!(!snapshot.exists());
    }

    #[test]
    fn test_http_source_loads_large_document() {
        // Larger than the HTTP client's default 10 MiB body limit.
        let padding = "x".repeat(11 * 1024 * 1024);
        let body = json!({ "openapi": "3.1.0", "x-padding": padding }).to_string();
        let url = serve_once("200 OK", body);

        let document = http_source(&url).load().unwrap();
        assert_eq!(document["openapi"], "3.1.0");
    }

    #[test]
    fn test_http_source_max_bytes() {
        let body = json!({ "openapi": "3.1.0", "x-padding": "x".repeat(4096) }).to_string();
        let url = serve_once("200 OK", body);

        let err = http_source(&url).with_max_bytes(1024).load().unwrap_err();
        assert!(matches!(err, SourceError::Http { .. }), "got {err:?}");
    }
}
