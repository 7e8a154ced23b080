use ego_tree::{NodeId, Tree};
use scraper::node::Node;

use crate::dom;

/// Removes hyperlink wrapping while keeping the anchor's content in place.
///
/// `<p>Hello <a href="x">world</a></p>` becomes `<p>Hello world</p>`; nested
/// formatting inside the anchor is kept, everything else is untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinkStripper;

impl LinkStripper {
    pub fn strip(&self, html: &str) -> String {
        let mut doc = dom::parse_fragment(html);
        let anchors: Vec<NodeId> = doc
            .tree
            .root()
            .descendants()
            .filter(|node| dom::is_element(node, "a"))
            .map(|node| node.id())
            .collect();

        if anchors.is_empty() {
            return html.to_string();
        }

        for anchor in anchors {
            unwrap_node(&mut doc.tree, anchor);
        }
        dom::serialize_fragment(&doc)
    }
}

/// Moves the children of `id` in front of it, in order, then detaches it.
fn unwrap_node(tree: &mut Tree<Node>, id: NodeId) {
    let children: Vec<NodeId> = match tree.get(id) {
        Some(node) => node.children().map(|child| child.id()).collect(),
        None => return,
    };
    if let Some(mut node) = tree.get_mut(id) {
        for child in children {
            node.insert_id_before(child);
        }
        node.detach();
    }
}
