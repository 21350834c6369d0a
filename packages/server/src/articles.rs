//! Article model and the persistence collaborator.
//!
//! Persistence itself is external to this service; it is consumed through
//! the [`ArticleStore`] trait. The pipeline only ever mutates an article's
//! `body` and `thumbnail`; every other field belongs to the store's owner.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use thiserror::Error;

/// Publication state of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

/// An article as the write path sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub thumbnail: String,
    pub status: ArticleStatus,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    /// Origin page this article was imported from, if any
    #[serde(default)]
    pub source_url: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// Partial update for an article.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub thumbnail: Option<String>,
    pub status: Option<ArticleStatus>,
    pub author: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("article not found: {id}")]
    NotFound { id: String },

    #[error("article already exists: {id}")]
    Duplicate { id: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence collaborator for articles.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Article>;

    async fn insert(&self, article: Article) -> StoreResult<()>;

    /// Apply a patch and return the updated article.
    async fn update(&self, id: &str, patch: ArticlePatch) -> StoreResult<Article>;
}

/// In-memory store, used in tests and local development.
#[derive(Default)]
pub struct MemoryArticleStore {
    articles: RwLock<HashMap<String, Article>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn get(&self, id: &str) -> StoreResult<Article> {
        self.articles
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    async fn insert(&self, article: Article) -> StoreResult<()> {
        let mut articles = self.articles.write().unwrap();
        if articles.contains_key(&article.id) {
            return Err(StoreError::Duplicate {
                id: article.id.clone(),
            });
        }
        articles.insert(article.id.clone(), article);
        Ok(())
    }

    async fn update(&self, id: &str, patch: ArticlePatch) -> StoreResult<Article> {
        let mut articles = self.articles.write().unwrap();
        let article = articles
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        if let Some(title) = patch.title {
            article.title = title;
        }
        if let Some(body) = patch.body {
            article.body = body;
        }
        if let Some(thumbnail) = patch.thumbnail {
            article.thumbnail = thumbnail;
        }
        if let Some(status) = patch.status {
            article.status = status;
        }
        if let Some(author) = patch.author {
            article.author = author;
        }
        if let Some(summary) = patch.summary {
            article.summary = summary;
        }
        article.updated_at = Utc::now();

        Ok(article.clone())
    }
}
