//! Press-release origin extraction and asset migration.
//!
//! Given a third-party article URL, this library safely fetches the page,
//! extracts structured article data through a cascade of heuristics,
//! discovers embedded images, re-hosts qualifying ones on our own object
//! storage, and rewrites references so published content never depends on
//! third-party hosts.
//!
//! The pipeline is a linear, stateless, idempotent transform:
//!
//! 1. [`security::UrlPolicy`] gates every outbound URL (SSRF defense)
//! 2. [`fetch::OriginFetcher`] retrieves the page / image bytes
//! 3. [`document::ExtractedDocument`] runs the field cascade
//! 4. [`images::discover_images`] finds embeddable images
//! 5. [`migrate::ImageMigrator`] re-hosts them and rewrites the body
//!
//! Extraction never fails (missing fields are reported as gaps), and image
//! migration never fails the caller (a broken image host costs only its own
//! image).
//!
//! # Modules
//!
//! - [`security`] - URL safety gate
//! - [`fetch`] - bounded-time HTTP fetching
//! - [`extract`] - per-field heuristic cascades
//! - [`text`] - HTML to plain text
//! - [`images`] - image discovery
//! - [`storage`] - object-storage collaborator
//! - [`migrate`] - asset migration and URL rewriting
//! - [`testing`] - mocks for the network seams

pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod images;
pub mod migrate;
pub mod security;
pub mod storage;
pub mod testing;
pub mod text;

// Re-export core types at crate root
pub use document::{DocumentField, ExtractedDocument};
pub use error::{FetchError, SecurityError, StorageError};
pub use fetch::{FetchedPage, ImageBytes, ImageSource, OriginFetcher};
pub use images::discover_images;
pub use migrate::{ImageMigrator, MigrationOutcome, PreparedContent, MAX_MIGRATIONS_PER_PASS};
pub use security::UrlPolicy;
pub use storage::{ObjectStore, SecretString, SupabaseStorage};
pub use text::to_plain_text;
