//! Post-publish side effects: search-index notification and newsletter
//! dispatch.
//!
//! Both are fired without awaiting completion; the publish response returns
//! before they finish, and failures are logged and dropped. A publish
//! always succeeds regardless of what these collaborators do.

use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use crate::articles::Article;

#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    site_url: String,
    newsletter_auto_send: bool,
}

impl Notifier {
    pub fn new(site_url: impl Into<String>, newsletter_auto_send: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            site_url: site_url.into(),
            newsletter_auto_send,
        }
    }

    /// Ping the search-index endpoint about a published/updated article.
    async fn notify_search_index(&self, article_id: &str) {
        let article_url = format!("{}/article/{}", self.site_url, article_id);
        let endpoint = format!("{}/api/seo/index-now", self.site_url);
        let result = self
            .client
            .post(&endpoint)
            .json(&json!({ "url": article_url, "action": "URL_UPDATED" }))
            .timeout(Duration::from_secs(10))
            .send()
            .await;
        match result {
            Ok(_) => debug!(article_id = %article_id, "search index notified"),
            Err(e) => warn!(article_id = %article_id, error = %e, "search index notification failed"),
        }
    }

    /// Trigger the newsletter dispatch for a newly published article.
    async fn notify_newsletter(&self, article: &Article) {
        if !self.newsletter_auto_send {
            return;
        }
        let article_url = format!("{}/article/{}", self.site_url, article.id);
        let summary = if article.summary.is_empty() {
            &article.title
        } else {
            &article.summary
        };
        let endpoint = format!("{}/api/newsletter/send", self.site_url);
        let result = self
            .client
            .post(&endpoint)
            .json(&json!({
                "subject": article.title,
                "content": format!("{summary}\n\n{article_url}"),
            }))
            .timeout(Duration::from_secs(10))
            .send()
            .await;
        match result {
            Ok(_) => debug!(article_id = %article.id, "newsletter dispatch triggered"),
            Err(e) => warn!(article_id = %article.id, error = %e, "newsletter dispatch failed"),
        }
    }

    /// Fire the post-publish effects without awaiting them.
    pub fn spawn_publish_effects(&self, article: Article, include_newsletter: bool) {
        let notifier = self.clone();
        tokio::spawn(async move {
            notifier.notify_search_index(&article.id).await;
            if include_newsletter {
                notifier.notify_newsletter(&article).await;
            }
        });
    }
}
