use std::sync::Arc;

use chrono::{DateTime, Utc};
use relay_core::{
    FeedEntry, IdentityKey, Outcome, PublishRecord, Stage, DESTINATION_SENT_FLAG,
};
use relay_logging::{relay_debug, relay_error, relay_info, relay_warn};
use thiserror::Error;

use crate::config::PipelineConfig;
use crate::dedup::DedupStore;
use crate::feed::{FeedError, FeedSource};
use crate::fetch::Fetcher;
use crate::html_translate::HtmlTranslator;
use crate::images::ImageRehoster;
use crate::links::LinkStripper;
use crate::publish::{PublishRequest, Publisher};
use crate::storage::ObjectStore;
use crate::translate::Translator;
use crate::{EntryReport, EntryResult, RunReport};

/// Source of the current time; injectable so stored names and records are
/// reproducible in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// External services a run talks to.
pub struct Collaborators {
    pub feed: Box<dyn FeedSource>,
    pub translator: Box<dyn Translator>,
    pub fetcher: Box<dyn Fetcher>,
    /// Image storage; without one, images keep their original sources.
    pub store: Option<Box<dyn ObjectStore>>,
    pub publisher: Box<dyn Publisher>,
}

/// Errors that end a run before any entry is processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feed {url} could not be read: {source}")]
    Feed {
        url: String,
        #[source]
        source: FeedError,
    },
}

/// Sequential feed-to-destination relay.
///
/// Entries are handled one at a time in feed order. Only entries whose
/// identity is absent from the dedup store are processed, and an entry is
/// recorded only after the publisher accepted it.
pub struct Pipeline {
    config: PipelineConfig,
    collaborators: Collaborators,
    dedup: DedupStore,
    load_warnings: Vec<String>,
    clock: Clock,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, collaborators: Collaborators, dedup: Outcome<DedupStore>) -> Self {
        Self {
            config,
            collaborators,
            dedup: dedup.value,
            load_warnings: dedup.warnings,
            clock: system_clock(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    /// Runs one pass over the feed.
    ///
    /// Only an unreadable feed is an error; per-entry problems are reported
    /// in the returned [`RunReport`].
    pub async fn run(&mut self) -> Result<RunReport, PipelineError> {
        let Pipeline {
            config,
            collaborators,
            dedup,
            load_warnings,
            clock,
        } = self;
        let config: &PipelineConfig = config;

        relay_info!("Fetching feed {}", config.feed_url);
        let entries = collaborators
            .feed
            .fetch(&config.feed_url)
            .await
            .map_err(|source| PipelineError::Feed {
                url: config.feed_url.clone(),
                source,
            })?;
        if entries.is_empty() {
            relay_warn!("Feed {} has no entries", config.feed_url);
        }

        let mut report = RunReport {
            entries: Vec::new(),
            warnings: std::mem::take(load_warnings),
        };
        let mut run = EntryRun {
            config,
            links: LinkStripper,
            rehoster: collaborators
                .store
                .as_deref()
                .filter(|_| config.rehost_images)
                .map(|store| {
                    ImageRehoster::new(
                        collaborators.fetcher.as_ref(),
                        store,
                        config.image_url_prefix.as_deref(),
                        clock.clone(),
                    )
                }),
            translator: HtmlTranslator::new(
                collaborators.translator.as_ref(),
                config.translation.clone(),
            ),
            publisher: collaborators.publisher.as_ref(),
            clock: clock.clone(),
        };

        for entry in entries.into_iter().take(config.max_items) {
            let entry_report = run.process(entry, dedup).await;
            let published = matches!(entry_report.result, EntryResult::Published { .. });
            report.entries.push(entry_report);
            if published && !config.entry_pause.is_zero() {
                tokio::time::sleep(config.entry_pause).await;
            }
        }

        relay_info!(
            "Run finished: {} published, {} skipped, {} failed, {} degraded",
            report.published(),
            report.skipped(),
            report.failed(),
            report.degraded()
        );
        Ok(report)
    }
}

/// Per-run state shared by all entries of that run.
struct EntryRun<'a> {
    config: &'a PipelineConfig,
    links: LinkStripper,
    rehoster: Option<ImageRehoster<'a>>,
    translator: HtmlTranslator<'a>,
    publisher: &'a dyn Publisher,
    clock: Clock,
}

impl EntryRun<'_> {
    async fn process(&mut self, entry: FeedEntry, dedup: &mut DedupStore) -> EntryReport {
        let title = entry.title_text().to_string();
        let key = IdentityKey::of(&entry);
        let mut stage = Stage::Fetched;
        advance(&key, &mut stage, Stage::Keyed);

        if dedup.contains_entry(&key, &entry) {
            relay_info!("Skipping already published entry {:?}", truncate(&title));
            advance(&key, &mut stage, Stage::Skipped);
            return EntryReport {
                key,
                title,
                stage,
                result: EntryResult::Skipped,
            };
        }

        let mut warnings = Vec::new();

        let body = self.links.strip(entry.summary_text());
        advance(&key, &mut stage, Stage::LinksStripped);

        let body = match &self.rehoster {
            Some(rehoster) => rehoster
                .rehost(&body, &title, entry.link.as_deref())
                .await
                .into_value(&mut warnings),
            None => body,
        };
        advance(&key, &mut stage, Stage::ImagesRehosted);

        let translated_title = self.translator.translate_text(&title).await.into_value(&mut warnings);
        advance(&key, &mut stage, Stage::TitleTranslated);

        let translated_body = self.translator.translate_document(&body).await.into_value(&mut warnings);
        advance(&key, &mut stage, Stage::BodyTranslated);

        let request = PublishRequest {
            title: &translated_title,
            html: &translated_body,
            source_url: entry.link.as_deref(),
            published: entry.published_at,
            draft: self.config.draft,
        };
        let receipt = match self.publisher.publish(&request).await {
            Ok(receipt) => receipt,
            Err(err) => {
                relay_error!("Publishing {:?} failed: {}", truncate(&title), err);
                return EntryReport {
                    key,
                    title,
                    stage,
                    result: EntryResult::PublishFailed {
                        reason: err.to_string(),
                    },
                };
            }
        };
        advance(&key, &mut stage, Stage::Published);

        let destination = receipt
            .url
            .unwrap_or_else(|| DESTINATION_SENT_FLAG.to_string());
        relay_info!("Published {:?} -> {}", truncate(&title), destination);

        let record = PublishRecord {
            source_title: title.clone(),
            translated_title,
            destination: destination.clone(),
            sent_at: (self.clock)().timestamp(),
            source_link: entry.link.clone(),
        };
        let result = match dedup.record(key.clone(), record) {
            Ok(_) => {
                advance(&key, &mut stage, Stage::Recorded);
                EntryResult::Published {
                    destination,
                    warnings,
                }
            }
            Err(err) => {
                relay_error!(
                    "Published {:?} but could not persist the dedup record: {}",
                    truncate(&title),
                    err
                );
                EntryResult::RecordFailed {
                    destination,
                    reason: err.to_string(),
                }
            }
        };

        EntryReport {
            key,
            title,
            stage,
            result,
        }
    }
}

fn advance(key: &IdentityKey, stage: &mut Stage, next: Stage) {
    let short = key.as_str().get(..12).unwrap_or(key.as_str());
    relay_debug!("entry {}: {} -> {}", short, stage, next);
    *stage = next;
}

fn truncate(title: &str) -> String {
    title.chars().take(80).collect()
}
