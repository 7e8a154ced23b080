//! Publishing destinations. All of them take the same [`PublishRequest`];
//! which one a run uses is a configuration choice.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::fetch::map_reqwest_error;
use crate::FetchError;

pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BLOGGER_API_BASE: &str = "https://www.googleapis.com/blogger/v3";

/// Characters of a rejected reply kept in the error message.
const ERROR_BODY_PREVIEW: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest<'a> {
    pub title: &'a str,
    pub html: &'a str,
    pub source_url: Option<&'a str>,
    pub published: Option<DateTime<Utc>>,
    /// Ask the destination to keep the post unpublished.
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PublishReceipt {
    /// Location of the new post, when the destination reports one.
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish request failed: {0}")]
    Request(#[from] FetchError),
    #[error("destination rejected the post with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("could not encode the post: {0}")]
    Encode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishReceipt, PublishError>;
}

fn build_client(timeout: Duration) -> Result<reqwest::Client, PublishError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| PublishError::Request(map_reqwest_error(err)))
}

async fn post_json(
    request: reqwest::RequestBuilder,
    payload: &serde_json::Value,
) -> Result<bytes::Bytes, PublishError> {
    let response = request
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(payload)?)
        .send()
        .await
        .map_err(map_reqwest_error)?;

    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let preview: String = String::from_utf8_lossy(&body)
            .chars()
            .take(ERROR_BODY_PREVIEW)
            .collect();
        return Err(PublishError::Rejected {
            status: status.as_u16(),
            body: preview,
        });
    }
    Ok(body)
}

/// Blogger v3 `posts.insert`, authenticated with an OAuth bearer token.
#[derive(Debug, Clone)]
pub struct BloggerPublisher {
    client: reqwest::Client,
    api_base: String,
    blog_id: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct BloggerPost {
    #[serde(default)]
    url: Option<String>,
}

impl BloggerPublisher {
    pub fn new(
        api_base: impl Into<String>,
        blog_id: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_base: api_base.into(),
            blog_id: blog_id.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl Publisher for BloggerPublisher {
    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishReceipt, PublishError> {
        let endpoint = format!(
            "{}/blogs/{}/posts/?isDraft={}",
            self.api_base.trim_end_matches('/'),
            self.blog_id,
            request.draft
        );
        let payload = json!({
            "kind": "blogger#post",
            "blog": { "id": self.blog_id },
            "title": request.title,
            "content": request.html,
        });

        let http = self.client.post(endpoint).bearer_auth(&self.token);
        let body = post_json(http, &payload).await?;
        let url = serde_json::from_slice::<BloggerPost>(&body)
            .ok()
            .and_then(|post| post.url);
        Ok(PublishReceipt { url })
    }
}

/// Generic automation webhook (e.g. a Zapier catch hook) receiving
/// `{title, html, source_url, published}`.
#[derive(Debug, Clone)]
pub struct WebhookPublisher {
    client: reqwest::Client,
    url: String,
}

impl WebhookPublisher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishReceipt, PublishError> {
        let payload = json!({
            "title": request.title,
            "html": request.html,
            "source_url": request.source_url.unwrap_or_default(),
            "published": request.published.map(|p| p.to_rfc3339()).unwrap_or_default(),
        });
        post_json(self.client.post(&self.url), &payload).await?;
        Ok(PublishReceipt::default())
    }
}
