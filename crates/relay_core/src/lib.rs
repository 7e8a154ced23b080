//! Feed relay core: pure data model, identity and text segmentation.
mod chunk;
mod entry;
mod identity;
mod outcome;
mod record;
mod stage;

pub use chunk::{split, TextSegment};
pub use entry::FeedEntry;
pub use identity::IdentityKey;
pub use outcome::Outcome;
pub use record::{PublishRecord, DESTINATION_SENT_FLAG};
pub use stage::Stage;
