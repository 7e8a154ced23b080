#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use relay_core::FeedEntry;
use relay_engine::{
    Clock, FailureKind, FeedError, FeedSource, FetchError, FetchMetadata, FetchOutput, Fetcher,
    ObjectStore, PublishError, PublishReceipt, PublishRequest, Publisher, StoreError,
    TranslateError, Translator,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

pub fn fixed_clock() -> Clock {
    Arc::new(|| Utc.timestamp_opt(1_700_000_000, 0).unwrap())
}

pub fn entry(id: &str, title: &str, summary: &str) -> FeedEntry {
    FeedEntry {
        id: Some(id.to_string()),
        link: Some(format!("https://source.example/{id}")),
        title: Some(title.to_string()),
        summary_html: Some(summary.to_string()),
        published_at: None,
    }
}

/// Prefixes every text with `[lang]`, or fails every call.
#[derive(Clone, Default)]
pub struct FakeTranslator {
    pub fail: bool,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeTranslator {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, TranslateError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(TranslateError::UnexpectedReply("service unavailable".into()));
        }
        Ok(format!("[{target_language}]{text}"))
    }
}

#[derive(Clone, Default)]
pub struct FakeFeed {
    pub entries: Vec<FeedEntry>,
    pub unreachable: bool,
}

#[async_trait::async_trait]
impl FeedSource for FakeFeed {
    async fn fetch(&self, _url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        if self.unreachable {
            return Err(FeedError::Parse("connection refused".into()));
        }
        Ok(self.entries.clone())
    }
}

/// Serves fixed bytes per URL; unknown URLs answer with HTTP 404.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    pub responses: HashMap<String, Vec<u8>>,
}

#[async_trait::async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        match self.responses.get(url) {
            Some(bytes) => Ok(FetchOutput {
                bytes: bytes.clone(),
                metadata: FetchMetadata {
                    original_url: url.to_string(),
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("image/png".into()),
                    byte_len: bytes.len() as u64,
                },
            }),
            None => Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: "not found".into(),
            }),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    pub fail: bool,
    pub objects: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryStore {
    pub fn names(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bytes: Bytes, name: &str) -> Result<String, StoreError> {
        if self.fail {
            return Err(StoreError::Rejected {
                name: name.to_string(),
                status: 503,
            });
        }
        self.objects
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.to_vec()));
        Ok(format!("https://img.example/{name}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub title: String,
    pub html: String,
    pub draft: bool,
}

/// Records posts; titles listed in `reject` fail with HTTP 500.
#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub reject: Vec<String>,
    pub posts: Arc<Mutex<Vec<PublishedPost>>>,
}

impl RecordingPublisher {
    pub fn posts(&self) -> Vec<PublishedPost> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, request: &PublishRequest<'_>) -> Result<PublishReceipt, PublishError> {
        if self.reject.iter().any(|t| request.title.contains(t.as_str())) {
            return Err(PublishError::Rejected {
                status: 500,
                body: "internal error".into(),
            });
        }
        let mut posts = self.posts.lock().unwrap();
        posts.push(PublishedPost {
            title: request.title.to_string(),
            html: request.html.to_string(),
            draft: request.draft,
        });
        Ok(PublishReceipt {
            url: Some(format!("https://blog.example/p/{}", posts.len())),
        })
    }
}
