use std::fmt;

use relay_core::{IdentityKey, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// How a single entry ended within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryResult {
    /// Already recorded in the dedup store.
    Skipped,
    /// Published and recorded. `warnings` lists local fallbacks taken.
    Published {
        destination: String,
        warnings: Vec<String>,
    },
    /// The destination rejected the entry; nothing was recorded.
    PublishFailed { reason: String },
    /// Published, but the dedup store could not be persisted.
    RecordFailed { destination: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub key: IdentityKey,
    pub title: String,
    /// Last stage reached.
    pub stage: Stage,
    pub result: EntryResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    PartialFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub entries: Vec<EntryReport>,
    /// Warnings raised before any entry was processed, e.g. a corrupt store.
    pub warnings: Vec<String>,
}

impl RunReport {
    pub fn published(&self) -> usize {
        self.count(|r| matches!(r, EntryResult::Published { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, EntryResult::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| {
            matches!(
                r,
                EntryResult::PublishFailed { .. } | EntryResult::RecordFailed { .. }
            )
        })
    }

    /// Entries that published with at least one local fallback.
    pub fn degraded(&self) -> usize {
        self.count(|r| matches!(r, EntryResult::Published { warnings, .. } if !warnings.is_empty()))
    }

    pub fn status(&self) -> RunStatus {
        if self.failed() == 0 {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure
        }
    }

    fn count(&self, pred: impl Fn(&EntryResult) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.result)).count()
    }
}
