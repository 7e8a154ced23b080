//! Destinations for rehosted images.

use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;

use crate::fetch::map_reqwest_error;
use crate::persist::{AtomicFileWriter, PersistError};
use crate::FetchError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage write failed: {0}")]
    Persist(#[from] PersistError),
    #[error("storage request failed: {0}")]
    Request(#[from] FetchError),
    #[error("storage rejected object {name} with status {status}")]
    Rejected { name: String, status: u16 },
}

/// Stores bytes under a suggested name and returns where they can be read.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bytes: Bytes, name: &str) -> Result<String, StoreError>;
}

fn public_url(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Writes objects into a local directory served elsewhere under `public_base`.
#[derive(Debug, Clone)]
pub struct LocalDirStore {
    writer: AtomicFileWriter,
    public_base: String,
}

impl LocalDirStore {
    pub fn new(dir: PathBuf, public_base: impl Into<String>) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            public_base: public_base.into(),
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for LocalDirStore {
    async fn put(&self, bytes: Bytes, name: &str) -> Result<String, StoreError> {
        self.writer.write(name, &bytes)?;
        Ok(public_url(&self.public_base, name))
    }
}

/// Uploads objects with `PUT {endpoint}/{name}`.
///
/// The returned URL is the `url` field of a JSON reply when the service sends
/// one, otherwise `{public_base}/{name}`.
#[derive(Debug, Clone)]
pub struct HttpPutStore {
    client: reqwest::Client,
    endpoint: String,
    public_base: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutReply {
    url: String,
}

impl HttpPutStore {
    pub fn new(
        endpoint: impl Into<String>,
        public_base: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(map_reqwest_error)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            public_base: public_base.into(),
            token,
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for HttpPutStore {
    async fn put(&self, bytes: Bytes, name: &str) -> Result<String, StoreError> {
        let mut request = self
            .client
            .put(public_url(&self.endpoint, name))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        let url = serde_json::from_slice::<PutReply>(&body)
            .map(|reply| reply.url)
            .unwrap_or_else(|_| public_url(&self.public_base, name));
        Ok(url)
    }
}
