//! Read-only page document: tree queries, visibility and rendered text.

use scraper::{html::Select, ElementRef, Html, Node, Selector};
use tracing::debug;

use crate::extraction::visibility::{StyleVisibility, Visibility, VisibilityValue};

/// Elements whose text content is never rendered.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Block-level elements. Text on either side of them breaks onto its own line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "caption", "dd", "details", "dialog", "div", "dl",
    "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table", "tr",
    "ul",
];

const PREFORMATTED_TAGS: &[&str] = &["pre", "textarea", "listing", "plaintext"];

pub fn is_block_tag(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

/// A parsed page plus the style resolution used to decide what a user sees.
pub struct PageDocument<V: Visibility = StyleVisibility> {
    html: Html,
    visibility: V,
}

impl PageDocument {
    pub fn parse(source: &str) -> Self {
        let html = Html::parse_document(source);
        let visibility = StyleVisibility::from_document(&html);
        debug!("Resolved {} visibility rules from stylesheets", visibility.rule_count());
        Self::with_visibility(html, visibility)
    }
}

impl<V: Visibility> PageDocument<V> {
    pub fn with_visibility(html: Html, visibility: V) -> Self {
        Self { html, visibility }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn select<'a, 'b>(&'a self, selector: &'b Selector) -> Select<'a, 'b> {
        self.html.select(selector)
    }

    /// Every element in deterministic pre-order, root first.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.root().descendants().filter_map(ElementRef::wrap)
    }

    /// Rendered text of `element`'s subtree, not yet normalized.
    ///
    /// Hidden descendants and script/style text are skipped, whitespace in
    /// normal flow collapses, block boundaries break lines, paragraphs are
    /// separated by a blank line, `<br>` is a newline and table cells are
    /// separated by tabs.
    pub fn visible_text(&self, element: ElementRef<'_>) -> String {
        let mut stack = Vec::new();
        push_children(&mut stack, element, WalkState::default());
        self.render(stack, |_| {})
    }

    /// Rendered text of the whole document.
    pub fn document_text(&self) -> String {
        self.render_document(|_| {})
    }

    /// Renders the whole document once, reporting every rendered element
    /// with its slice of the output as the walk leaves it.
    ///
    /// Elements under `display: none` (or script/style furniture) are never
    /// reported. The returned string is [`Self::document_text`].
    pub fn render_document<'a, F>(&'a self, on_close: F) -> String
    where
        F: FnMut(&RenderedElement<'a, '_>),
    {
        self.render(vec![Step::Open(self.root(), WalkState::default())], on_close)
    }

    /// Iterative walk: every element pushes its own close step below its
    /// children, so nesting depth never grows the call stack.
    fn render<'a, F>(&'a self, mut stack: Vec<Step<'a>>, mut on_close: F) -> String
    where
        F: FnMut(&RenderedElement<'a, '_>),
    {
        let mut out = TextBuilder::default();
        let mut order = 0;

        while let Some(step) = stack.pop() {
            match step {
                Step::Text(text, state) => {
                    if state.preformatted {
                        out.push_preformatted(text);
                    } else {
                        out.push_flow(text);
                    }
                }
                Step::Open(element, parent) => {
                    let name = element.value().name();
                    if RAW_TEXT_TAGS.contains(&name) {
                        continue;
                    }

                    let style = self.visibility.declared(element);
                    if style.is_display_none() {
                        continue;
                    }

                    let state = WalkState {
                        hidden: match style.visibility {
                            Some(VisibilityValue::Hidden) => true,
                            Some(VisibilityValue::Visible) => false,
                            None => parent.hidden,
                        },
                        preformatted: parent.preformatted || PREFORMATTED_TAGS.contains(&name),
                    };

                    if !state.hidden && name == "br" {
                        out.line_break();
                        continue;
                    }

                    // Hidden elements render nothing themselves; visible
                    // descendants still can.
                    let breaks = match name {
                        _ if state.hidden => 0,
                        "p" => 2,
                        _ if is_block_tag(name) => 1,
                        _ => 0,
                    };
                    let tab = !state.hidden
                        && matches!(name, "td" | "th")
                        && has_following_cell(element);

                    out.require_breaks(breaks);
                    stack.push(Step::Close(OpenElement {
                        element,
                        order,
                        hidden: state.hidden,
                        breaks,
                        tab,
                        start: out.mark(),
                    }));
                    order += 1;
                    push_children(&mut stack, element, state);
                }
                Step::Close(open) => {
                    on_close(&RenderedElement {
                        element: open.element,
                        order: open.order,
                        hidden: open.hidden,
                        text: out.since(open.start),
                    });
                    out.require_breaks(open.breaks);
                    if open.tab {
                        out.push_tab();
                    }
                }
            }
        }

        out.finish()
    }
}

/// An element's rendered subtree, reported by [`PageDocument::render_document`].
pub struct RenderedElement<'a, 't> {
    pub element: ElementRef<'a>,
    /// Pre-order position among rendered elements, root first.
    pub order: usize,
    /// Under an effective `visibility: hidden`.
    pub hidden: bool,
    /// Raw rendered text of the subtree, not yet normalized.
    pub text: &'t str,
}

enum Step<'a> {
    Open(ElementRef<'a>, WalkState),
    Text(&'a str, WalkState),
    Close(OpenElement<'a>),
}

struct OpenElement<'a> {
    element: ElementRef<'a>,
    order: usize,
    hidden: bool,
    breaks: usize,
    tab: bool,
    start: usize,
}

/// Pushes `element`'s children in reverse so they pop in document order.
fn push_children<'a>(stack: &mut Vec<Step<'a>>, element: ElementRef<'a>, state: WalkState) {
    for child in element.children().rev() {
        match child.value() {
            Node::Text(text) if !state.hidden => stack.push(Step::Text(&**text, state)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    stack.push(Step::Open(element, state));
                }
            }
            _ => {}
        }
    }
}

fn has_following_cell(cell: ElementRef<'_>) -> bool {
    cell.next_siblings()
        .filter_map(ElementRef::wrap)
        .any(|sibling| matches!(sibling.value().name(), "td" | "th"))
}

#[derive(Debug, Clone, Copy, Default)]
struct WalkState {
    hidden: bool,
    preformatted: bool,
}

/// Accumulates rendered text. Line breaks requested by block boundaries are
/// held back until more text arrives, so leading and trailing breaks never
/// appear and adjacent requests merge into the larger one.
#[derive(Default)]
struct TextBuilder {
    out: String,
    pending_breaks: usize,
}

impl TextBuilder {
    fn require_breaks(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks == 0 {
            return;
        }
        if !self.out.is_empty() {
            self.trim_trailing_spaces();
            let existing = self.out.len() - self.out.trim_end_matches('\n').len();
            for _ in existing..self.pending_breaks {
                self.out.push('\n');
            }
        }
        self.pending_breaks = 0;
    }

    /// Offset where text pushed from now on begins. A trailing space can
    /// still be trimmed later, so the mark sits before it.
    fn mark(&self) -> usize {
        self.out.trim_end_matches(' ').len()
    }

    /// Everything written since `mark`.
    fn since(&self, mark: usize) -> &str {
        self.out.get(mark..).unwrap_or("")
    }

    fn trim_trailing_spaces(&mut self) {
        let kept = self.out.trim_end_matches(' ').len();
        self.out.truncate(kept);
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with(['\n', '\t'])
    }

    fn push_flow(&mut self, raw: &str) {
        let mut collapsed = String::with_capacity(raw.len());
        let mut in_space = false;
        for c in raw.chars() {
            if c.is_ascii_whitespace() {
                if !in_space {
                    collapsed.push(' ');
                    in_space = true;
                }
            } else {
                collapsed.push(c);
                in_space = false;
            }
        }

        if collapsed.trim_matches(' ').is_empty() {
            if self.pending_breaks == 0 && !self.at_line_start() && !self.out.ends_with(' ') {
                self.out.push(' ');
            }
            return;
        }

        self.flush_breaks();
        let text = if self.at_line_start() || self.out.ends_with(' ') {
            collapsed.trim_start_matches(' ')
        } else {
            collapsed.as_str()
        };
        self.out.push_str(text);
    }

    fn push_preformatted(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        self.flush_breaks();
        self.out.push_str(raw);
    }

    fn line_break(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\n');
    }

    fn push_tab(&mut self) {
        self.flush_breaks();
        self.trim_trailing_spaces();
        self.out.push('\t');
    }

    fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(source: &str, css: &str) -> String {
        let doc = PageDocument::parse(source);
        let selector = Selector::parse(css).unwrap();
        let element = doc.select(&selector).next().unwrap();
        doc.visible_text(element)
    }

    #[test]
    fn test_inline_whitespace_collapses() {
        let text = text_of("<div id='a'>\n   Senior   <b>Rust</b>\n engineer  </div>", "#a");
        assert_eq!(text, "Senior Rust engineer ");
    }

    #[test]
    fn test_blocks_break_lines_and_paragraphs_get_blank_lines() {
        let text = text_of(
            "<div id='a'><h2>About</h2><p>First.</p><p>Second.</p><div>Third</div></div>",
            "#a",
        );
        assert_eq!(text, "About\n\nFirst.\n\nSecond.\n\nThird");
    }

    #[test]
    fn test_list_items_on_own_lines() {
        let text = text_of("<ul id='a'> <li>Rust</li> <li>Tokio</li> </ul>", "#a");
        assert_eq!(text, "Rust\nTokio");
    }

    #[test]
    fn test_br_is_newline() {
        assert_eq!(text_of("<p id='a'>one<br>two <br> three</p>", "#a"), "one\ntwo\nthree");
    }

    #[test]
    fn test_script_style_and_hidden_text_skipped() {
        let text = text_of(
            "<div id='a'>shown<script>var x = 1;</script><style>p{}</style>\
             <span style='display:none'>secret</span><span hidden>also</span> end</div>",
            "#a",
        );
        assert_eq!(text, "shown end");
    }

    #[test]
    fn test_visibility_hidden_subtree_with_visible_child() {
        let text = text_of(
            "<div id='a'><div style='visibility:hidden'>no <span style='visibility:visible'>yes</span></div></div>",
            "#a",
        );
        assert_eq!(text, "yes");
    }

    #[test]
    fn test_table_cells_separated_by_tabs() {
        let text = text_of(
            "<table id='a'><tr><td>Location</td><td>Remote</td></tr><tr><td>Pay</td><td>$150k</td></tr></table>",
            "#a",
        );
        assert_eq!(text, "Location\tRemote\nPay\t$150k");
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let text = text_of("<div id='a'><pre>fn main() {\n    run();\n}</pre></div>", "#a");
        assert_eq!(text, "fn main() {\n    run();\n}");
    }

    #[test]
    fn test_document_text_skips_head() {
        let doc = PageDocument::parse(
            "<html><head><title>Careers</title></head><body><p>Apply today</p></body></html>",
        );
        assert_eq!(doc.document_text(), "Apply today");
    }

    #[test]
    fn test_elements_are_preorder() {
        let doc = PageDocument::parse("<div id='a'><div id='b'></div></div><div id='c'></div>");
        let ids: Vec<&str> = doc.elements().filter_map(|e| e.value().id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_render_document_reports_each_element_slice() {
        let doc = PageDocument::parse(
            "<body><div id='a'>Rust <span id='b'>roles</span></div>\
             <div id='c' style='display:none'>gone</div>\
             <div id='d' style='visibility:hidden'>ghost</div>\
             <p id='e'>Apply</p></body>",
        );
        let mut seen = Vec::new();
        let text = doc.render_document(|block| {
            if let Some(id) = block.element.value().id() {
                seen.push((id.to_string(), block.order, block.hidden, block.text.trim().to_string()));
            }
        });

        assert_eq!(text, doc.document_text());
        // Post-order reporting, pre-order numbering; display:none never reported.
        let ids: Vec<&str> = seen.iter().map(|s| s.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "d", "e"]);
        assert!(seen[1].1 < seen[0].1);
        assert_eq!(seen[1].3, "Rust roles");
        assert_eq!(seen[0].3, "roles");
        assert!(seen[2].2);
        assert_eq!(seen[2].3, "");
        assert_eq!(seen[3].3, "Apply");
    }

    #[test]
    fn test_deep_nesting_renders_on_small_stack() {
        // Inline wrappers keep the parser linear while the tree stays deep.
        let depth = 50_000;
        let source = format!(
            "<div>{}<b>deep</b>{}</div>",
            "<span>".repeat(depth),
            "</span>".repeat(depth)
        );
        let text = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(move || PageDocument::parse(&source).document_text())
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(text, "deep");
    }

    #[test]
    fn test_block_tags() {
        assert!(is_block_tag("section"));
        assert!(is_block_tag("p"));
        assert!(!is_block_tag("span"));
    }
}
