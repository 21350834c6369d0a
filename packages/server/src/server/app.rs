//! Application setup and router assembly.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use origin::{ImageMigrator, ImageSource, ObjectStore, OriginFetcher, SecretString,
    SupabaseStorage, UrlPolicy};

use crate::articles::{ArticleStore, MemoryArticleStore};
use crate::config::Config;
use crate::notify::Notifier;
use crate::server::routes::{
    create_article_handler, health_handler, origin_preview_handler, update_article_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<OriginFetcher>,
    pub migrator: Arc<ImageMigrator>,
    pub articles: Arc<dyn ArticleStore>,
    pub notifier: Arc<Notifier>,
}

/// Wire the pipeline from configuration.
pub fn build_state(config: &Config) -> AppState {
    let policy = UrlPolicy::new();
    let fetcher = Arc::new(OriginFetcher::new(policy.clone()));
    let storage: Arc<dyn ObjectStore> = Arc::new(SupabaseStorage::new(
        config.storage_url.clone(),
        config.storage_bucket.clone(),
        SecretString::new(config.storage_service_key.clone()),
    ));
    let migrator = Arc::new(ImageMigrator::new(
        fetcher.clone() as Arc<dyn ImageSource>,
        storage,
        policy,
    ));

    AppState {
        fetcher,
        migrator,
        articles: Arc::new(MemoryArticleStore::new()),
        notifier: Arc::new(Notifier::new(
            config.site_url.clone(),
            config.newsletter_auto_send,
        )),
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/press/origin", get(origin_preview_handler))
        .route(
            "/api/articles",
            post(create_article_handler).patch(update_article_handler),
        )
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
