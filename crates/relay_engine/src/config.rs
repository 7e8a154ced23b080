use std::time::Duration;

use crate::html_translate::TranslationSettings;

pub const DEFAULT_MAX_ITEMS: usize = 5;
pub const DEFAULT_ENTRY_PAUSE: Duration = Duration::from_millis(500);

/// Everything a [`crate::Pipeline`] run needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub feed_url: String,
    /// Entries taken from the head of the feed per run.
    pub max_items: usize,
    pub translation: TranslationSettings,
    /// Pause after each successful publish.
    pub entry_pause: Duration,
    /// Passed through to the publisher.
    pub draft: bool,
    pub rehost_images: bool,
    /// Prepended to every URL returned by the object store.
    pub image_url_prefix: Option<String>,
}

impl PipelineConfig {
    pub fn default_with_feed(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            max_items: DEFAULT_MAX_ITEMS,
            translation: TranslationSettings::default(),
            entry_pause: DEFAULT_ENTRY_PAUSE,
            draft: true,
            rehost_images: true,
            image_url_prefix: None,
        }
    }
}
