use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use thiserror::Error;

use crate::fetch::map_reqwest_error;
use crate::FetchError;

pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(#[from] FetchError),
    #[error("translation service returned an unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Maps a short piece of text into the target language.
///
/// Callers keep each request within the backend's size ceiling; see
/// [`relay_core::split`].
#[async_trait::async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError>;
}

/// Client for the public Google Translate web endpoint with automatic source
/// language detection.
#[derive(Debug, Clone)]
pub struct GoogleWebTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleWebTranslator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TranslateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait::async_trait]
impl Translator for GoogleWebTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client", "gtx")
            .append_pair("sl", "auto")
            .append_pair("tl", target_language)
            .append_pair("dt", "t")
            .append_pair("q", text)
            .finish();

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded;charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::Request(FetchError::new(
                crate::FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            )));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let reply: Value = serde_json::from_slice(&bytes)
            .map_err(|err| TranslateError::UnexpectedReply(err.to_string()))?;
        parse_reply(&reply)
            .ok_or_else(|| TranslateError::UnexpectedReply("no translated sentences".into()))
    }
}

/// The reply is `[[["translated", "source", ...], ...], ...]`; the first
/// element of every sentence array is concatenated.
fn parse_reply(reply: &Value) -> Option<String> {
    let sentences = reply.get(0)?.as_array()?;
    let translated: String = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect();
    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}
