//! Article write path.
//!
//! When an article's status lands on published, external body/thumbnail
//! images are migrated synchronously before the store write commits; the
//! post-publish side effects run after the response, un-awaited. Migration
//! failures never block the write - affected images keep their original
//! third-party URLs.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::articles::{Article, ArticlePatch, ArticleStatus, ArticleStore, StoreError};
use crate::server::app::AppState;
use crate::server::routes::press::error_reply;

/// Which post-publish effects a status change triggers.
#[derive(Debug, PartialEq, Eq)]
pub enum PublishEffects {
    /// Status did not land on published
    None,
    /// Re-save of an already published article: refresh the index only
    IndexOnly,
    /// Fresh publish: index plus newsletter
    IndexAndNewsletter,
}

/// Decide the side effects from the stored state and the incoming status.
pub fn publish_effects(was_published: bool, new_status: Option<ArticleStatus>) -> PublishEffects {
    match new_status {
        Some(ArticleStatus::Published) if !was_published => PublishEffects::IndexAndNewsletter,
        Some(ArticleStatus::Published) => PublishEffects::IndexOnly,
        _ => PublishEffects::None,
    }
}

/// POST /api/articles
pub async fn create_article_handler(
    Extension(state): Extension<AppState>,
    Json(mut article): Json<Article>,
) -> Response {
    if article.status == ArticleStatus::Published {
        let prepared = state
            .migrator
            .prepare_publish(&article.body, &article.thumbnail)
            .await;
        article.body = prepared.body;
        article.thumbnail = prepared.thumbnail;
    }

    match state.articles.insert(article.clone()).await {
        Ok(()) => {
            info!(article_id = %article.id, status = ?article.status, "article created");
            if article.status == ArticleStatus::Published {
                state.notifier.spawn_publish_effects(article, true);
            }
            Json(json!({ "success": true })).into_response()
        }
        Err(StoreError::Duplicate { id }) => {
            error_reply(StatusCode::CONFLICT, format!("이미 존재하는 기사입니다: {id}"))
        }
        Err(e) => {
            warn!(error = %e, "article create failed");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "서버 오류가 발생했습니다.",
            )
        }
    }
}

#[derive(Deserialize)]
pub struct UpdateArticleRequest {
    pub id: String,
    #[serde(flatten)]
    pub patch: ArticlePatch,
}

/// PATCH /api/articles
pub async fn update_article_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<UpdateArticleRequest>,
) -> Response {
    let existing = match state.articles.get(&request.id).await {
        Ok(article) => article,
        Err(StoreError::NotFound { id }) => {
            return error_reply(StatusCode::NOT_FOUND, format!("기사를 찾을 수 없습니다: {id}"));
        }
        Err(e) => {
            warn!(error = %e, "article lookup failed");
            return error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "서버 오류가 발생했습니다.",
            );
        }
    };

    let was_published = existing.status == ArticleStatus::Published;
    let effects = publish_effects(was_published, request.patch.status);
    let mut patch = request.patch;

    if patch.status == Some(ArticleStatus::Published) {
        // Migrate against the effective content: patched fields if present,
        // otherwise what is already stored.
        let body = patch.body.as_deref().unwrap_or(&existing.body);
        let thumbnail = patch.thumbnail.as_deref().unwrap_or(&existing.thumbnail);
        let prepared = state.migrator.prepare_publish(body, thumbnail).await;
        patch.body = Some(prepared.body);
        patch.thumbnail = Some(prepared.thumbnail);
    }

    match state.articles.update(&request.id, patch).await {
        Ok(updated) => {
            info!(article_id = %updated.id, effects = ?effects, "article updated");
            match effects {
                PublishEffects::IndexAndNewsletter => {
                    state.notifier.spawn_publish_effects(updated, true)
                }
                PublishEffects::IndexOnly => state.notifier.spawn_publish_effects(updated, false),
                PublishEffects::None => {}
            }
            Json(json!({ "success": true })).into_response()
        }
        Err(e) => {
            warn!(error = %e, "article update failed");
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                "서버 오류가 발생했습니다.",
            )
        }
    }
}
