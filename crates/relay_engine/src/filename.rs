use url::Url;

const TITLE_PREFIX_CHARS: usize = 20;
const FALLBACK_PREFIX: &str = "image";
const FALLBACK_EXTENSION: &str = "jpg";
const MAX_EXTENSION_LEN: usize = 5;

/// Object name for a rehosted image:
/// `{title_prefix}_{index}_{timestamp_millis}.{ext}`.
///
/// The prefix is the first 20 characters of the title with whitespace and
/// characters unsafe in file or object names replaced by `_`. The extension
/// comes from the last path segment of `source`, ignoring query and fragment.
pub fn rehosted_image_name(title: &str, index: usize, timestamp_millis: i64, source: &Url) -> String {
    let prefix = title_prefix(title);
    let ext = source_extension(source).unwrap_or_else(|| FALLBACK_EXTENSION.to_string());
    format!("{prefix}_{index}_{timestamp_millis}.{ext}")
}

fn title_prefix(title: &str) -> String {
    let prefix: String = title
        .trim()
        .chars()
        .take(TITLE_PREFIX_CHARS)
        .map(|c| {
            if c.is_whitespace() || is_forbidden(c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    if prefix.trim_matches('_').is_empty() {
        FALLBACK_PREFIX.to_string()
    } else {
        prefix
    }
}

fn source_extension(source: &Url) -> Option<String> {
    let segment = source.path_segments()?.last()?;
    let (_, ext) = segment.rsplit_once('.')?;
    let valid = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

fn is_forbidden(c: char) -> bool {
    matches!(c,
        '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '#' | '%' | '&' | '\0'..='\u{1F}'
    )
}
