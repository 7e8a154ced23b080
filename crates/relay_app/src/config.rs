//! Run configuration for the `feed-relay` binary.
//!
//! Values are layered: built-in defaults, then the RON file, then the
//! environment variables the relay has always honoured, then CLI flags.
//! [`AppConfig::validate`] runs before any network traffic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use relay_engine::{
    PipelineConfig, TranslationSettings, DEFAULT_BLOGGER_API_BASE, DEFAULT_CHUNK_BUDGET,
    DEFAULT_ENTRY_PAUSE, DEFAULT_MAX_ITEMS, DEFAULT_PUBLISH_TIMEOUT, DEFAULT_TRANSLATE_ENDPOINT,
    DEFAULT_TRANSLATE_PAUSE,
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::cli::Args;

pub const DEFAULT_STATE_FILE: &str = "posted_titles.json";
pub const DEFAULT_IMAGE_DIR: &str = "images";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("environment variable {name} has an invalid value {value:?}")]
    InvalidEnv { name: &'static str, value: String },
    #[error("both ZAPIER_WEBHOOK_URL and BLOG_ID are set; configure a single destination")]
    ConflictingDestinations,
    #[error("no feed URL configured (feed_url, FEED_URL or --feed-url)")]
    MissingFeedUrl,
    #[error("no destination configured (ZAPIER_WEBHOOK_URL, or BLOG_ID with BLOGGER_TOKEN)")]
    MissingDestination,
    #[error("{field} is not a valid http(s) URL: {value:?}")]
    InvalidUrl { field: &'static str, value: String },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

/// Where translated posts go.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum DestinationConfig {
    Blogger {
        #[serde(default = "default_blogger_api_base")]
        api_base: String,
        blog_id: String,
        token: String,
    },
    Webhook {
        url: String,
    },
}

/// Where rehosted images go.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum StorageConfig {
    LocalDir {
        dir: PathBuf,
        public_base: String,
    },
    HttpPut {
        endpoint: String,
        public_base: String,
        #[serde(default)]
        token: Option<String>,
    },
}

impl StorageConfig {
    fn public_base_mut(&mut self) -> &mut String {
        match self {
            StorageConfig::LocalDir { public_base, .. } | StorageConfig::HttpPut { public_base, .. } => {
                public_base
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub feed_url: String,
    pub state_file: PathBuf,
    pub max_items: usize,
    pub target_language: String,
    pub chunk_budget: usize,
    pub translate_pause_ms: u64,
    pub translate_endpoint: String,
    pub entry_pause_ms: u64,
    pub publish_timeout_secs: u64,
    pub draft: bool,
    pub rehost_images: bool,
    pub image_url_prefix: Option<String>,
    pub destination: Option<DestinationConfig>,
    /// Without storage, images are published with their original sources.
    pub storage: Option<StorageConfig>,
    pub log_file: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            max_items: DEFAULT_MAX_ITEMS,
            target_language: "fa".to_string(),
            chunk_budget: DEFAULT_CHUNK_BUDGET,
            translate_pause_ms: millis(DEFAULT_TRANSLATE_PAUSE),
            translate_endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            entry_pause_ms: millis(DEFAULT_ENTRY_PAUSE),
            publish_timeout_secs: DEFAULT_PUBLISH_TIMEOUT.as_secs(),
            draft: true,
            rehost_images: true,
            image_url_prefix: None,
            destination: None,
            storage: None,
            log_file: None,
            verbose: false,
        }
    }
}

fn default_blogger_api_base() -> String {
    DEFAULT_BLOGGER_API_BASE.to_string()
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl AppConfig {
    /// Reads the RON file at `path`.
    ///
    /// A missing file yields the defaults unless the user named it
    /// explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Ok(config)
    }

    /// Builds the effective configuration: file, environment, then flags.
    pub fn resolve(args: &Args) -> Result<Self, ConfigError> {
        let (path, explicit) = args.config_path();
        let mut config = Self::load(&path, explicit)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Applies the environment overrides. `lookup` returns the value of a
    /// variable, if set.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(url) = var("FEED_URL") {
            self.feed_url = url;
        }
        if let Some(path) = var("POSTED_FILE") {
            self.state_file = PathBuf::from(path);
        }
        if let Some(value) = var("MAX_ITEMS") {
            self.max_items = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: "MAX_ITEMS",
                value,
            })?;
        }
        if let Some(value) = var("SLEEP_BETWEEN") {
            let pause = value
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or(ConfigError::InvalidEnv {
                    name: "SLEEP_BETWEEN",
                    value,
                })?;
            self.translate_pause_ms = millis(pause);
        }
        if let Some(lang) = var("TARGET_LANG") {
            self.target_language = lang;
        }

        let webhook = var("ZAPIER_WEBHOOK_URL");
        let blog_id = var("BLOG_ID");
        let token = var("BLOGGER_TOKEN");
        if webhook.is_some() && blog_id.is_some() {
            return Err(ConfigError::ConflictingDestinations);
        }
        if let Some(url) = webhook {
            self.destination = Some(DestinationConfig::Webhook { url });
        } else if blog_id.is_some() || token.is_some() {
            self.destination = Some(match self.destination.take() {
                Some(DestinationConfig::Blogger {
                    api_base,
                    blog_id: current_id,
                    token: current_token,
                }) => DestinationConfig::Blogger {
                    api_base,
                    blog_id: blog_id.unwrap_or(current_id),
                    token: token.unwrap_or(current_token),
                },
                _ => DestinationConfig::Blogger {
                    api_base: default_blogger_api_base(),
                    blog_id: blog_id.unwrap_or_default(),
                    token: token.unwrap_or_default(),
                },
            });
        }

        if let Some(dir) = var("IMAGE_STORE_DIR") {
            let public_base = self
                .storage
                .as_mut()
                .map(|storage| storage.public_base_mut().clone())
                .unwrap_or_default();
            self.storage = Some(StorageConfig::LocalDir {
                dir: PathBuf::from(dir),
                public_base,
            });
        }
        if let Some(base) = var("IMAGE_PUBLIC_BASE") {
            match &mut self.storage {
                Some(storage) => *storage.public_base_mut() = base,
                None => {
                    self.storage = Some(StorageConfig::LocalDir {
                        dir: PathBuf::from(DEFAULT_IMAGE_DIR),
                        public_base: base,
                    })
                }
            }
        }
        Ok(())
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.feed_url {
            self.feed_url = url.clone();
        }
        if let Some(path) = &args.state {
            self.state_file = path.clone();
        }
        if let Some(max_items) = args.max_items {
            self.max_items = max_items;
        }
        if args.publish {
            self.draft = false;
        }
        if args.verbose {
            self.verbose = true;
        }
        if let Some(path) = &args.log_file {
            self.log_file = Some(path.clone());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::MissingFeedUrl);
        }
        require_http_url("feed_url", &self.feed_url)?;
        if self.max_items == 0 {
            return Err(ConfigError::Zero { field: "max_items" });
        }
        if self.chunk_budget == 0 {
            return Err(ConfigError::Zero {
                field: "chunk_budget",
            });
        }
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "target_language",
            });
        }
        require_http_url("translate_endpoint", &self.translate_endpoint)?;

        match &self.destination {
            None => return Err(ConfigError::MissingDestination),
            Some(DestinationConfig::Webhook { url }) => require_http_url("webhook url", url)?,
            Some(DestinationConfig::Blogger {
                api_base,
                blog_id,
                token,
            }) => {
                require_http_url("blogger api_base", api_base)?;
                if blog_id.trim().is_empty() {
                    return Err(ConfigError::Empty { field: "BLOG_ID" });
                }
                if token.trim().is_empty() {
                    return Err(ConfigError::Empty {
                        field: "BLOGGER_TOKEN",
                    });
                }
            }
        }

        if self.rehost_images {
            match &self.storage {
                None => {}
                Some(StorageConfig::LocalDir { public_base, .. }) => {
                    if public_base.trim().is_empty() {
                        return Err(ConfigError::Empty {
                            field: "IMAGE_PUBLIC_BASE",
                        });
                    }
                }
                Some(StorageConfig::HttpPut { endpoint, .. }) => {
                    require_http_url("storage endpoint", endpoint)?;
                }
            }
        }
        Ok(())
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            feed_url: self.feed_url.clone(),
            max_items: self.max_items,
            translation: TranslationSettings {
                target_language: self.target_language.clone(),
                chunk_budget: self.chunk_budget,
                pause: Duration::from_millis(self.translate_pause_ms),
            },
            entry_pause: Duration::from_millis(self.entry_pause_ms),
            draft: self.draft,
            rehost_images: self.rehost_images,
            image_url_prefix: self.image_url_prefix.clone(),
        }
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

fn require_http_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
        }),
    }
}
