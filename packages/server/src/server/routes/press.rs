//! Press-import preview endpoint.
//!
//! Takes a third-party URL, fetches it through the safety gate, and returns
//! the extracted article fields for the import UI to pre-fill. Extraction
//! itself never fails; empty fields mean no heuristic matched and the UI
//! degrades accordingly.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use origin::{ExtractedDocument, FetchError};

use crate::server::app::AppState;

#[derive(Deserialize)]
pub struct OriginQuery {
    pub url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginPreview {
    success: bool,
    url: String,
    title: String,
    date: String,
    thumbnail: String,
    body_html: String,
    body_text: String,
    images: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorReply {
    pub success: bool,
    pub error: String,
}

pub fn error_reply(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorReply {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// GET /api/press/origin?url=...
pub async fn origin_preview_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<OriginQuery>,
) -> Response {
    let Some(url) = query.url.filter(|u| !u.is_empty()) else {
        return error_reply(StatusCode::BAD_REQUEST, "url 파라미터가 필요합니다.");
    };

    let page = match state.fetcher.fetch_page(&url).await {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %url, error = %e, "origin fetch failed");
            let (status, message) = map_fetch_error(&e);
            return error_reply(status, message);
        }
    };

    let doc = ExtractedDocument::extract(&page.html, &page.final_url);
    if !doc.missing.is_empty() {
        debug!(url = %url, missing = ?doc.missing, "extraction left fields empty");
    }

    Json(OriginPreview {
        success: true,
        url: doc.final_url,
        title: doc.title,
        date: doc.published_date,
        thumbnail: doc.thumbnail_url,
        body_html: doc.body_html,
        body_text: doc.body_text,
        images: doc.images,
    })
    .into_response()
}

/// HTTP mapping: 400 for gated URLs, 502 for upstream faults, 500 otherwise.
fn map_fetch_error(error: &FetchError) -> (StatusCode, String) {
    match error {
        FetchError::Security(_) => (
            StatusCode::BAD_REQUEST,
            "허용되지 않는 URL입니다.".to_string(),
        ),
        FetchError::UpstreamStatus { status, .. } => (
            StatusCode::BAD_GATEWAY,
            format!("원문 페이지 응답 오류: {status}"),
        ),
        FetchError::UnsupportedContentType { .. } => (
            StatusCode::BAD_GATEWAY,
            "HTML 페이지가 아닙니다.".to_string(),
        ),
        FetchError::Timeout { .. } | FetchError::Network(_) => (
            StatusCode::BAD_GATEWAY,
            "원문을 가져오는데 실패했습니다.".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "서버 오류가 발생했습니다.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use origin::SecurityError;

    #[test]
    fn test_unsafe_url_maps_to_400() {
        let err = FetchError::Security(SecurityError::BlockedHost("localhost".to_string()));
        let (status, _) = map_fetch_error(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_upstream_status_maps_to_502() {
        let err = FetchError::UpstreamStatus {
            url: "http://x".to_string(),
            status: 404,
        };
        let (status, message) = map_fetch_error(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(message.contains("404"));
    }

    #[test]
    fn test_non_html_maps_to_502() {
        let err = FetchError::UnsupportedContentType {
            content_type: "application/pdf".to_string(),
        };
        let (status, _) = map_fetch_error(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_timeout_maps_to_502() {
        let err = FetchError::Timeout {
            url: "http://x".to_string(),
        };
        let (status, _) = map_fetch_error(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
