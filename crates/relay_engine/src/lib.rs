//! Feed relay engine: collaborators, HTML rewriting and the publish pipeline.
mod config;
mod dedup;
mod dom;
mod feed;
mod fetch;
mod filename;
mod html_translate;
mod images;
mod links;
mod persist;
mod pipeline;
mod publish;
mod storage;
mod translate;
mod types;

pub use config::{PipelineConfig, DEFAULT_ENTRY_PAUSE, DEFAULT_MAX_ITEMS};
pub use dedup::DedupStore;
pub use feed::{parse_feed, FeedError, FeedSource, HttpFeedSource};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::rehosted_image_name;
pub use html_translate::{
    HtmlTranslator, TranslationSettings, DEFAULT_CHUNK_BUDGET, DEFAULT_TRANSLATE_PAUSE,
};
pub use images::ImageRehoster;
pub use links::LinkStripper;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{system_clock, Clock, Collaborators, Pipeline, PipelineError};
pub use publish::{
    BloggerPublisher, PublishError, PublishReceipt, PublishRequest, Publisher, WebhookPublisher,
    DEFAULT_BLOGGER_API_BASE, DEFAULT_PUBLISH_TIMEOUT,
};
pub use storage::{HttpPutStore, LocalDirStore, ObjectStore, StoreError};
pub use translate::{GoogleWebTranslator, TranslateError, Translator, DEFAULT_TRANSLATE_ENDPOINT};
pub use types::{
    EntryReport, EntryResult, FailureKind, FetchError, FetchMetadata, FetchOutput, RunReport,
    RunStatus,
};
