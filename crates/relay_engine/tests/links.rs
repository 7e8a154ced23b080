use pretty_assertions::assert_eq;
use relay_engine::LinkStripper;

fn visible_text(html: &str) -> String {
    let doc = scraper::Html::parse_fragment(html);
    doc.root_element().text().collect()
}

#[test]
fn anchor_is_replaced_by_its_text() {
    let out = LinkStripper.strip("<p>Hello <a href='x'>world</a></p>");
    assert_eq!(out, "<p>Hello world</p>");
}

#[test]
fn nested_formatting_survives() {
    let out = LinkStripper.strip(r#"<p>See <a href="/a"><b>bold</b> and <i>italic</i></a>!</p>"#);
    assert_eq!(out, "<p>See <b>bold</b> and <i>italic</i>!</p>");
}

#[test]
fn images_inside_links_are_kept() {
    let out = LinkStripper.strip(r#"<a href="https://x.example"><img src="https://x.example/a.png"></a>"#);
    assert_eq!(out, r#"<img src="https://x.example/a.png">"#);
}

#[test]
fn visible_text_is_unchanged_and_no_anchor_remains() {
    let html = r#"<div><p>One <a href="1">two</a> three</p><ul><li><a href="2">four <em>five</em></a></li></ul></div>"#;
    let out = LinkStripper.strip(html);
    assert!(!out.contains("<a"));
    assert!(!out.contains("href"));
    assert_eq!(visible_text(&out), visible_text(html));
}

#[test]
fn malformed_markup_does_not_fail() {
    let out = LinkStripper.strip("<p>Broken <a href='x'>link <b>bold</p>");
    assert!(!out.contains("<a"));
    assert!(out.contains("Broken"));
    assert!(out.contains("link"));
    assert!(out.contains("bold"));
}

#[test]
fn html_without_anchors_is_returned_verbatim() {
    let html = "<p class='intro'>No links here</p>";
    assert_eq!(LinkStripper.strip(html), html);
}
