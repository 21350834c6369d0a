//! Pressroom API service: press-import preview and the article write path
//! with publish-time asset migration.

pub mod articles;
pub mod config;
pub mod notify;
pub mod server;

pub use config::Config;
