use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Readable body of an article plus the image lifted out of its first figure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformedBody {
    pub markdown: String,
    pub image_url: Option<String>,
}

pub trait ContentTransformer: Send + Sync {
    fn transform(&self, html: &str) -> TransformedBody;
}

/// Converts rich-text article bodies into chat-flavoured Markdown.
///
/// - every `<figure>` is removed; the first image found in one becomes the
///   representative image
/// - links are kept as `[text](url)`, same-document anchors keep only their text
/// - inline images are dropped
/// - blocks are separated by a single newline, lines are never wrapped
#[derive(Debug, Clone, Default)]
pub struct MarkdownTransformer {
    base_url: Option<Url>,
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative link and image URLs are resolved against `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    fn visit_node(&self, node: NodeRef<'_, Node>, ctx: &mut ConversionContext) {
        match node.value() {
            Node::Text(text) => ctx.append_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, ctx);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit_node(child, ctx);
                }
            }
        }
    }

    fn visit_element(&self, element: ElementRef, ctx: &mut ConversionContext) {
        let tag = element.value().name().to_ascii_lowercase();
        if let Some(level) = heading_level(&tag) {
            ctx.ensure_newline();
            ctx.push_str(&"#".repeat(level));
            ctx.push_char(' ');
            self.visit_children(element, ctx);
            ctx.ensure_newline();
            return;
        }

        match tag.as_str() {
            "a" => self.handle_anchor(element, ctx),
            "img" => {
                // inline images are not rendered
            }
            "br" => ctx.line_break(),
            "hr" => {
                ctx.ensure_newline();
                ctx.push_str("---");
                ctx.ensure_newline();
            }
            "strong" | "b" => self.wrap_inline(element, ctx, "**"),
            "em" | "i" => self.wrap_inline(element, ctx, "_"),
            "code" => self.wrap_inline(element, ctx, "`"),
            "pre" => {
                ctx.ensure_newline();
                ctx.push_str("```\n");
                ctx.push_str(element.text().collect::<String>().trim_matches('\n'));
                ctx.ensure_newline();
                ctx.push_str("```");
                ctx.ensure_newline();
            }
            "ul" | "ol" => {
                ctx.ensure_newline();
                ctx.lists.push(if tag == "ol" {
                    ListKind::Ordered(0)
                } else {
                    ListKind::Unordered
                });
                self.visit_children(element, ctx);
                ctx.lists.pop();
                ctx.ensure_newline();
            }
            "li" => {
                ctx.ensure_newline();
                ctx.push_list_marker();
                self.visit_children(element, ctx);
                ctx.ensure_newline();
            }
            "blockquote" => {
                ctx.ensure_newline();
                let start = ctx.builder.len();
                self.visit_children(element, ctx);
                let quoted = ctx.take_from(start);
                for line in quoted.trim().lines() {
                    ctx.push_str("> ");
                    ctx.push_str(line.trim_end());
                    ctx.push_char('\n');
                }
            }
            "td" | "th" => {
                ctx.append_text(" ");
                self.visit_children(element, ctx);
                ctx.append_text(" ");
            }
            "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "figcaption"
            | "table" | "tr" | "address" | "dl" | "dt" | "dd" => {
                ctx.ensure_newline();
                self.visit_children(element, ctx);
                ctx.ensure_newline();
            }
            "script" | "style" | "noscript" | "iframe" | "template" | "head" | "figure" => {
                // skip scripting and presentation-only sections
            }
            _ => self.visit_children(element, ctx),
        }
    }

    fn visit_children(&self, element: ElementRef, ctx: &mut ConversionContext) {
        for child in element.children() {
            self.visit_node(child, ctx);
        }
    }

    fn handle_anchor(&self, element: ElementRef, ctx: &mut ConversionContext) {
        let start = ctx.builder.len();
        self.visit_children(element, ctx);
        let Some(target) = element
            .value()
            .attr("href")
            .and_then(|href| link_target(href, self.base_url.as_ref()))
        else {
            return;
        };
        ctx.rewrap(start, |text| {
            if text.is_empty() {
                format!("<{target}>")
            } else {
                format!("[{text}]({target})")
            }
        });
    }

    fn wrap_inline(&self, element: ElementRef, ctx: &mut ConversionContext, mark: &str) {
        let start = ctx.builder.len();
        self.visit_children(element, ctx);
        ctx.rewrap(start, |text| {
            if text.is_empty() {
                String::new()
            } else {
                format!("{mark}{text}{mark}")
            }
        });
    }
}

impl ContentTransformer for MarkdownTransformer {
    fn transform(&self, html: &str) -> TransformedBody {
        if html.trim().is_empty() {
            return TransformedBody::default();
        }

        let mut fragment = Html::parse_fragment(html);
        let image_url = strip_figures(&mut fragment)
            .map(|src| resolve_url(&src, self.base_url.as_ref()));

        let mut ctx = ConversionContext::default();
        for child in fragment.tree.root().children() {
            self.visit_node(child, &mut ctx);
        }

        TransformedBody {
            markdown: ctx.into_markdown(),
            image_url,
        }
    }
}

/// Detaches every `<figure>` from the tree and returns the `src` of the first
/// image found in one of them.
fn strip_figures(fragment: &mut Html) -> Option<String> {
    let (Ok(figure_sel), Ok(img_sel)) = (Selector::parse("figure"), Selector::parse("img")) else {
        return None;
    };

    let mut image_url = None;
    let mut figure_ids = Vec::new();
    for figure in fragment.select(&figure_sel) {
        if image_url.is_none() {
            image_url = figure
                .select(&img_sel)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(str::to_string);
        }
        figure_ids.push(figure.id());
    }

    for id in figure_ids {
        if let Some(mut node) = fragment.tree.get_mut(id) {
            node.detach();
        }
    }
    image_url
}

fn heading_level(tag: &str) -> Option<usize> {
    match tag {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Target for a rendered link, or `None` when only the text should remain.
fn link_target(href: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") {
        return None;
    }
    Some(resolve_url(trimmed, base))
}

fn resolve_url(reference: &str, base: Option<&Url>) -> String {
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    base.and_then(|base| base.join(reference).ok())
        .map(String::from)
        .unwrap_or_else(|| reference.to_string())
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(usize),
}

#[derive(Default)]
struct ConversionContext {
    builder: String,
    last_char: Option<char>,
    lists: Vec<ListKind>,
}

impl ConversionContext {
    fn into_markdown(self) -> String {
        self.builder.trim().to_string()
    }

    fn append_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn ensure_newline(&mut self) {
        self.trim_trailing_spaces();
        if self.last_char == Some('\n') || self.builder.is_empty() {
            return;
        }
        self.push_char('\n');
    }

    fn line_break(&mut self) {
        self.trim_trailing_spaces();
        self.push_char('\n');
    }

    fn push_list_marker(&mut self) {
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(ListKind::Ordered(counter)) => {
                *counter += 1;
                format!("{counter}. ")
            }
            Some(ListKind::Unordered) | None => "* ".to_string(),
        };
        self.push_str(&"  ".repeat(depth));
        self.push_str(&marker);
    }

    fn push_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.push_char(ch);
        }
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }

    fn trim_trailing_spaces(&mut self) {
        while self.builder.ends_with(' ') {
            self.builder.pop();
        }
        self.last_char = self.builder.chars().last();
    }

    /// Removes and returns everything written since `start`.
    fn take_from(&mut self, start: usize) -> String {
        let tail = self.builder.split_off(start);
        self.last_char = self.builder.chars().last();
        tail
    }

    /// Replaces the output since `start` with `render(trimmed_output)`,
    /// keeping the surrounding whitespace.
    fn rewrap(&mut self, start: usize, render: impl FnOnce(&str) -> String) {
        let inner = self.take_from(start);
        let text = inner.trim();
        if inner.starts_with(char::is_whitespace) {
            self.append_text(" ");
        }
        let rendered = render(text);
        self.push_str(&rendered);
        if !text.is_empty() && inner.ends_with(char::is_whitespace) {
            self.append_text(" ");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{link_target, resolve_url};
    use url::Url;

    #[test]
    fn fragment_and_script_links_have_no_target() {
        assert_eq!(link_target("#section-2", None), None);
        assert_eq!(link_target("javascript:void(0)", None), None);
        assert_eq!(link_target("   ", None), None);
    }

    #[test]
    fn absolute_urls_are_kept_verbatim() {
        assert_eq!(resolve_url("http://z", None), "http://z");
    }

    #[test]
    fn relative_urls_resolve_against_base() {
        let base = Url::parse("https://example.com/article/").unwrap();
        assert_eq!(
            resolve_url("/files/map.pdf", Some(&base)),
            "https://example.com/files/map.pdf"
        );
        assert_eq!(resolve_url("/files/map.pdf", None), "/files/map.pdf");
    }
}
