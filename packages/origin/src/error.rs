//! Typed errors for the origin pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Security-related errors, primarily for SSRF protection.
///
/// Returned by the URL safety gate before any network I/O is attempted.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, metadata services)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// Host is our own storage domain (asset already migrated)
    #[error("own storage host: {0}")]
    StorageHost(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Errors that can occur while fetching a remote page or image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Safety gate rejected the URL; no network call was made
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Upstream responded with a non-success status
    #[error("upstream returned {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    /// Response is not the expected content type
    #[error("unsupported content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    /// Request exceeded its deadline
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body was empty
    #[error("empty body from: {url}")]
    EmptyBody { url: String },

    /// Response body exceeded the size limit
    #[error("body of {size} bytes exceeds limit of {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Errors from the object-storage collaborator.
///
/// The asset migrator swallows all of these; they surface only in logs.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage API rejected the upload
    #[error("storage upload failed with {status}: {detail}")]
    UploadStatus { status: u16, detail: String },

    /// Transport-level failure talking to storage
    #[error("storage network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for security checks.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
