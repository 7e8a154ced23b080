use chrono::{DateTime, Utc};

/// One syndicated item, normalized from whatever the feed format provided.
///
/// Every field is optional: feeds in the wild omit any of them. Empty or
/// whitespace-only strings are stored as `None` by [`FeedEntry::normalized`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedEntry {
    pub id: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub summary_html: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedEntry {
    /// Drops empty and whitespace-only text fields.
    pub fn normalized(self) -> Self {
        Self {
            id: non_blank(self.id),
            link: non_blank(self.link),
            title: non_blank(self.title),
            summary_html: non_blank(self.summary_html),
            published_at: self.published_at,
        }
    }

    /// Trimmed title, or an empty string when the entry has none.
    pub fn title_text(&self) -> &str {
        self.title.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn summary_text(&self) -> &str {
        self.summary_html.as_deref().unwrap_or_default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
