use notifier_engine::{ContentTransformer, MarkdownTransformer, TransformedBody};
use pretty_assertions::assert_eq;

fn transform(html: &str) -> TransformedBody {
    MarkdownTransformer::new().transform(html)
}

#[test]
fn figure_image_is_extracted_and_removed_from_body() {
    let output = transform(r#"<figure><img src="http://x/y.png"></figure><p>Hello</p>"#);

    assert_eq!(output.markdown, "Hello");
    assert_eq!(output.image_url.as_deref(), Some("http://x/y.png"));
}

#[test]
fn body_without_figures_keeps_links_and_has_no_image() {
    let output = transform(r#"<p>Hello <a href="http://z">world</a></p>"#);

    assert_eq!(output.markdown, "Hello [world](http://z)");
    assert_eq!(output.image_url, None);
}

#[test]
fn all_figures_are_removed_and_first_image_wins() {
    let html = r#"
        <figure class="quote"><blockquote>No picture here</blockquote></figure>
        <p>Intro</p>
        <figure><img src="https://cdn.example/first.jpg"><figcaption>One</figcaption></figure>
        <figure><img src="https://cdn.example/second.jpg"><figcaption>Two</figcaption></figure>
        <p>Outro</p>
    "#;

    let output = transform(html);

    assert_eq!(output.markdown, "Intro\nOutro");
    assert_eq!(output.image_url.as_deref(), Some("https://cdn.example/first.jpg"));
}

#[test]
fn figure_image_without_src_is_ignored() {
    let output = transform(r#"<figure><img alt="missing"></figure><p>Text</p>"#);

    assert_eq!(output.markdown, "Text");
    assert_eq!(output.image_url, None);
}

#[test]
fn inline_images_are_dropped_without_placeholder() {
    let output = transform(r#"<p>Before<img src="/pic.jpg" alt="pic"> after</p>"#);

    assert_eq!(output.markdown, "Before after");
    assert_eq!(output.image_url, None);
}

#[test]
fn internal_anchor_links_keep_only_their_text() {
    let output = transform(r##"<p>Jump <a href="#rules">to the rules</a> now</p>"##);

    assert_eq!(output.markdown, "Jump to the rules now");
}

#[test]
fn paragraphs_and_breaks_use_single_newlines() {
    let output = transform("<p>First line<br>second line</p><p>Next paragraph</p>");

    assert_eq!(output.markdown, "First line\nsecond line\nNext paragraph");
}

#[test]
fn long_lines_are_not_wrapped() {
    let sentence = "word ".repeat(60);
    let output = transform(&format!("<p>{sentence}</p>"));

    assert!(!output.markdown.contains('\n'));
    assert_eq!(output.markdown, sentence.trim());
}

#[test]
fn headings_lists_and_emphasis_render_as_markdown() {
    let html = "<h2>Rules</h2>\
        <p>Read <strong>carefully </strong>and <em>quickly</em>.</p>\
        <ul><li>Stay together</li><li>Keep <code>phone</code> on<ol><li>charged</li><li>silent</li></ol></li></ul>";

    let output = transform(html);

    assert_eq!(
        output.markdown,
        "## Rules\nRead **carefully** and _quickly_.\n* Stay together\n* Keep `phone` on\n  1. charged\n  2. silent"
    );
}

#[test]
fn blockquotes_are_prefixed() {
    let output = transform("<blockquote><p>Line one</p><p>Line two</p></blockquote>");

    assert_eq!(output.markdown, "> Line one\n> Line two");
}

#[test]
fn relative_urls_resolve_against_base() {
    let transformer = MarkdownTransformer::with_base_url("https://jotihunt.example/article/");
    let output = transformer.transform(
        r#"<figure><img src="/media/map.png"></figure><p><a href="/rules">Rules</a></p>"#,
    );

    assert_eq!(output.markdown, "[Rules](https://jotihunt.example/rules)");
    assert_eq!(
        output.image_url.as_deref(),
        Some("https://jotihunt.example/media/map.png")
    );
}

#[test]
fn malformed_markup_is_recovered() {
    let output = transform("<p>Unclosed <b>bold <i>both</p></b><div><span>tail");

    assert!(output.markdown.contains("Unclosed"));
    assert!(output.markdown.contains("bold"));
    assert!(output.markdown.contains("tail"));
}

#[test]
fn scripts_and_styles_are_skipped() {
    let output = transform("<style>p { color: red }</style><p>Visible</p><script>alert(1)</script>");

    assert_eq!(output.markdown, "Visible");
}

#[test]
fn entities_are_decoded() {
    let output = transform("<p>Fish &amp; chips &lt;3</p>");

    assert_eq!(output.markdown, "Fish & chips <3");
}

#[test]
fn empty_input_yields_empty_body() {
    assert_eq!(transform(""), TransformedBody::default());
    assert_eq!(transform("   \n"), TransformedBody::default());
}

#[test]
fn transformation_is_deterministic() {
    let html = r#"<figure><img src="a.png"></figure><p><a href="https://det.example/page">Det</a></p>"#;

    assert_eq!(transform(html), transform(html));
}
