//! Translation of HTML documents node by node.
//!
//! Only text content changes; tags, attributes and the text of `code`, `pre`,
//! `script` and `style` elements are carried over as they are. Every text node
//! is segmented with [`relay_core::split`] before it reaches the translator,
//! and a failed segment keeps its source text.

use std::time::{Duration, Instant};

use ego_tree::NodeId;
use relay_core::{split, Outcome};
use relay_logging::{relay_trace, relay_warn};
use scraper::node::{Node, Text};

use crate::dom;
use crate::translate::Translator;

/// Elements whose direct text content is never translated.
const SKIP_TAGS: &[&str] = &["code", "pre", "script", "style"];

pub const DEFAULT_CHUNK_BUDGET: usize = 4000;
pub const DEFAULT_TRANSLATE_PAUSE: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSettings {
    pub target_language: String,
    /// Maximum characters per translation request.
    pub chunk_budget: usize,
    /// Minimum spacing between two translation requests.
    pub pause: Duration,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            target_language: "fa".to_string(),
            chunk_budget: DEFAULT_CHUNK_BUDGET,
            pause: DEFAULT_TRANSLATE_PAUSE,
        }
    }
}

pub struct HtmlTranslator<'a> {
    translator: &'a dyn Translator,
    settings: TranslationSettings,
    last_request: Option<Instant>,
}

#[derive(Default)]
struct Tally {
    translated: usize,
    warnings: Vec<String>,
}

impl<'a> HtmlTranslator<'a> {
    pub fn new(translator: &'a dyn Translator, settings: TranslationSettings) -> Self {
        Self {
            translator,
            settings,
            last_request: None,
        }
    }

    /// Translates plain text such as an entry title.
    ///
    /// When nothing could be translated the input is returned unchanged.
    pub async fn translate_text(&mut self, text: &str) -> Outcome<String> {
        if text.trim().is_empty() {
            return Outcome::clean(text.to_string());
        }
        let mut tally = Tally::default();
        let translated = self.translate_plain(text, &mut tally).await;
        Outcome::degraded(translated, tally.warnings)
    }

    /// Translates every eligible text node of an HTML fragment.
    ///
    /// Whitespace-only nodes and nodes directly inside [`SKIP_TAGS`] are left
    /// alone. If no segment at all could be translated the input string is
    /// returned byte for byte, never a partially re-serialized copy.
    pub async fn translate_document(&mut self, html: &str) -> Outcome<String> {
        let mut doc = dom::parse_fragment(html);
        let targets: Vec<(NodeId, String)> = doc
            .tree
            .root()
            .descendants()
            .filter_map(|node| {
                let text = node.value().as_text()?;
                if text.trim().is_empty() {
                    return None;
                }
                if dom::parent_element_name(&node).is_some_and(|name| SKIP_TAGS.contains(&name)) {
                    return None;
                }
                Some((node.id(), String::from(&**text)))
            })
            .collect();

        let mut tally = Tally::default();
        let mut replacements = Vec::with_capacity(targets.len());
        for (id, text) in targets {
            let translated = self.translate_plain(&text, &mut tally).await;
            replacements.push((id, translated));
        }

        if tally.translated == 0 {
            return Outcome::degraded(html.to_string(), tally.warnings);
        }

        for (id, translated) in replacements {
            if let Some(mut node) = doc.tree.get_mut(id) {
                *node.value() = Node::Text(Text {
                    text: translated.as_str().into(),
                });
            }
        }
        Outcome::degraded(dom::serialize_fragment(&doc), tally.warnings)
    }

    async fn translate_plain(&mut self, text: &str, tally: &mut Tally) -> String {
        let mut out = String::with_capacity(text.len());
        for segment in split(text, self.settings.chunk_budget) {
            out.push_str(&self.translate_segment(segment.text, tally).await);
        }
        out
    }

    /// Translates the trimmed core of `segment`, re-attaching its leading and
    /// trailing whitespace, which translation backends drop.
    async fn translate_segment(&mut self, segment: &str, tally: &mut Tally) -> String {
        let core = segment.trim();
        if core.is_empty() {
            return segment.to_string();
        }
        let lead = &segment[..segment.len() - segment.trim_start().len()];
        let trail = &segment[segment.trim_end().len()..];

        self.pace().await;
        let result = self
            .translator
            .translate(core, &self.settings.target_language)
            .await;
        self.last_request = Some(Instant::now());

        match result {
            Ok(translated) => {
                relay_trace!("Translated segment of {} chars", core.chars().count());
                tally.translated += 1;
                format!("{lead}{translated}{trail}")
            }
            Err(err) => {
                let warning = format!("segment translation failed, keeping source text: {err}");
                relay_warn!("{}", warning);
                tally.warnings.push(warning);
                segment.to_string()
            }
        }
    }

    async fn pace(&self) {
        if let Some(last) = self.last_request {
            let elapsed = last.elapsed();
            if elapsed < self.settings.pause {
                tokio::time::sleep(self.settings.pause - elapsed).await;
            }
        }
    }
}
