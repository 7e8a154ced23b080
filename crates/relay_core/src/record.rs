use serde::{Deserialize, Serialize};

/// What the destination reported back, or a flag when it reports nothing.
pub const DESTINATION_SENT_FLAG: &str = "sent";

/// Proof that an entry was republished. Written once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRecord {
    pub source_title: String,
    pub translated_title: String,
    /// URL returned by the destination, or [`DESTINATION_SENT_FLAG`].
    pub destination: String,
    pub sent_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
}
