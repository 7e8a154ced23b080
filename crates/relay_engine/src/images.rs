//! Rehosting of images referenced by an entry body.
//!
//! Each `<img>` with a non-empty `src` is downloaded, stored through an
//! [`ObjectStore`] and its `src` rewritten to the stored location. Any image
//! that cannot be fetched or stored keeps its original `src`.
//!
//! Storing is not idempotent: every call writes new objects with fresh
//! timestamps. Reprocessing is prevented by the dedup store, so an image is
//! only stored twice when a run stops between rehosting and recording; the
//! earlier copy is then left orphaned.

use bytes::Bytes;
use ego_tree::NodeId;
use relay_core::Outcome;
use relay_logging::{relay_debug, relay_warn};
use scraper::node::Node;
use url::Url;

use crate::dom;
use crate::fetch::Fetcher;
use crate::filename::rehosted_image_name;
use crate::pipeline::Clock;
use crate::storage::ObjectStore;

pub struct ImageRehoster<'a> {
    fetcher: &'a dyn Fetcher,
    store: &'a dyn ObjectStore,
    url_prefix: Option<&'a str>,
    clock: Clock,
}

impl<'a> ImageRehoster<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        store: &'a dyn ObjectStore,
        url_prefix: Option<&'a str>,
        clock: Clock,
    ) -> Self {
        Self {
            fetcher,
            store,
            url_prefix,
            clock,
        }
    }

    /// Rehosts the images of `html` in document order.
    ///
    /// `title_hint` names the stored objects; `base_url` (usually the entry
    /// link) resolves relative sources. Non-HTTP sources such as `data:` URIs
    /// are left as they are.
    pub async fn rehost(&self, html: &str, title_hint: &str, base_url: Option<&str>) -> Outcome<String> {
        let mut doc = dom::parse_fragment(html);
        let images: Vec<(NodeId, String)> = doc
            .tree
            .root()
            .descendants()
            .filter(|node| dom::is_element(node, "img"))
            .filter_map(|node| {
                let src = node.value().as_element()?.attr("src")?.trim();
                (!src.is_empty()).then(|| (node.id(), src.to_string()))
            })
            .collect();

        if images.is_empty() {
            return Outcome::clean(html.to_string());
        }

        let base = base_url.and_then(|b| Url::parse(b).ok());
        let mut warnings = Vec::new();
        let mut rewrites = Vec::new();
        for (index, (id, src)) in images.into_iter().enumerate() {
            match self.rehost_one(index, &src, title_hint, base.as_ref()).await {
                Ok(Some(new_src)) => rewrites.push((id, new_src)),
                Ok(None) => {}
                Err(warning) => {
                    relay_warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        if rewrites.is_empty() {
            return Outcome::degraded(html.to_string(), warnings);
        }

        for (id, new_src) in rewrites {
            set_src(&mut doc, id, &new_src);
        }
        Outcome::degraded(dom::serialize_fragment(&doc), warnings)
    }

    /// `Ok(None)` means the source is deliberately left alone.
    async fn rehost_one(
        &self,
        index: usize,
        src: &str,
        title_hint: &str,
        base: Option<&Url>,
    ) -> Result<Option<String>, String> {
        let url = match dom::resolve_url(src, base) {
            Some(url) => url,
            None => return Err(format!("image {index}: cannot resolve source {src:?}")),
        };
        if !matches!(url.scheme(), "http" | "https") {
            relay_debug!("image {}: skipping {} source", index, url.scheme());
            return Ok(None);
        }

        let fetched = self
            .fetcher
            .fetch(url.as_str())
            .await
            .map_err(|err| format!("image {index}: fetch of {url} failed: {err}"))?;

        let name = rehosted_image_name(title_hint, index, (self.clock)().timestamp_millis(), &url);
        let stored = self
            .store
            .put(Bytes::from(fetched.bytes), &name)
            .await
            .map_err(|err| format!("image {index}: storing {name} failed: {err}"))?;

        relay_debug!("image {}: {} rehosted as {}", index, url, stored);
        let new_src = match self.url_prefix {
            Some(prefix) => format!("{prefix}{stored}"),
            None => stored,
        };
        Ok(Some(new_src))
    }
}

fn set_src(doc: &mut scraper::Html, id: NodeId, new_src: &str) {
    if let Some(mut node) = doc.tree.get_mut(id) {
        if let Node::Element(element) = node.value() {
            for (name, value) in element.attrs.iter_mut() {
                if &*name.local == "src" {
                    *value = new_src.into();
                }
            }
        }
    }
}
