use std::fmt;

use sha1::{Digest, Sha1};

use crate::FeedEntry;

/// Upper bound on the characters of the debug rendering hashed when an
/// entry has no usable identity field.
const FALLBACK_DUMP_CHARS: usize = 200;

/// Stable identity of a feed entry: lowercase hex SHA-1 of its identity hint.
///
/// SHA-1 keeps keys written by earlier relay versions valid.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derives the key from the first non-blank of `id`, `link`, `title`.
    ///
    /// Entries with none of those hash a bounded dump of the whole entry.
    pub fn of(entry: &FeedEntry) -> Self {
        let hint = [&entry.id, &entry.link, &entry.title]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.trim().is_empty());

        match hint {
            Some(value) => Self::from_hint(value),
            None => {
                let dump: String = format!("{entry:?}").chars().take(FALLBACK_DUMP_CHARS).collect();
                Self::from_hint(&dump)
            }
        }
    }

    /// Hashes a raw identity hint (an id, link or title).
    pub fn from_hint(hint: &str) -> Self {
        let digest = Sha1::digest(hint.as_bytes());
        let mut hex = String::with_capacity(digest.len() * 2);
        for byte in digest.iter() {
            use std::fmt::Write;
            let _ = write!(&mut hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Wraps an already computed key, e.g. one read back from persisted state.
    pub fn from_persisted(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
