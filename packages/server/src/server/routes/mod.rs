// HTTP routes
pub mod articles;
pub mod health;
pub mod press;

pub use articles::{create_article_handler, update_article_handler};
pub use health::health_handler;
pub use press::origin_preview_handler;
