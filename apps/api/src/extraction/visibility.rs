//! Style resolution for visibility checks.
//!
//! The extractor never talks to a rendering engine. It asks a [`Visibility`]
//! implementation for each element's own declared `display` / `visibility`
//! and applies inheritance itself. [`StyleVisibility`] resolves those
//! declarations from the static document: user-agent hidden elements, the
//! `hidden` attribute, `<style>` sheet rules and inline `style` attributes.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static STYLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("style").expect("BUG: hardcoded CSS selector 'style' is invalid")
});

static CSS_COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// Elements the user agent never renders.
const UA_HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "title", "meta", "link", "base",
];

/// Selector fragments that only match under user interaction or target
/// pseudo-elements. Rules using them never hide static content.
const DYNAMIC_SELECTOR_MARKERS: &[&str] = &["::", ":hover", ":focus", ":active", ":visited", ":target"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityValue {
    Visible,
    Hidden,
}

/// Declarations an element carries itself, before inheritance.
/// `None` means "not declared".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredStyle {
    pub display_none: Option<bool>,
    pub visibility: Option<VisibilityValue>,
}

impl DeclaredStyle {
    pub fn is_display_none(&self) -> bool {
        self.display_none == Some(true)
    }

    pub fn is_empty(&self) -> bool {
        self.display_none.is_none() && self.visibility.is_none()
    }

    /// Later declarations win property by property.
    fn merge(&mut self, later: DeclaredStyle) {
        if later.display_none.is_some() {
            self.display_none = later.display_none;
        }
        if later.visibility.is_some() {
            self.visibility = later.visibility;
        }
    }
}

/// Answers "is this node visible to a user".
pub trait Visibility {
    /// The element's own resolved declarations, ignoring ancestors.
    fn declared(&self, element: ElementRef<'_>) -> DeclaredStyle;

    /// Effective visibility: no ancestor (or the element itself) suppresses
    /// display, and the nearest declared `visibility` is not hidden.
    fn is_visible(&self, element: ElementRef<'_>) -> bool {
        let mut visibility = None;
        let mut current = Some(element);

        while let Some(el) = current {
            let style = self.declared(el);
            if style.is_display_none() {
                return false;
            }
            if visibility.is_none() {
                visibility = style.visibility;
            }
            current = el.parent().and_then(ElementRef::wrap);
        }

        visibility != Some(VisibilityValue::Hidden)
    }
}

struct StyleRule {
    selector: Selector,
    style: DeclaredStyle,
}

/// Resolves visibility from the document's own markup and stylesheets.
///
/// Cascade order: user-agent defaults, then sheet rules in source order
/// (later rules win, specificity is not ranked), then inline `style`.
pub struct StyleVisibility {
    rules: Vec<StyleRule>,
}

impl StyleVisibility {
    /// Collects the visibility-relevant rules of every screen `<style>` block.
    pub fn from_document(html: &Html) -> Self {
        let mut rules = Vec::new();

        for style_el in html.select(&STYLE_SELECTOR) {
            let on_screen = style_el
                .value()
                .attr("media")
                .map_or(true, media_applies_to_screen);
            if !on_screen {
                continue;
            }
            let css: String = style_el.text().collect();
            rules.extend(parse_stylesheet(&css));
        }

        Self { rules }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Visibility for StyleVisibility {
    fn declared(&self, element: ElementRef<'_>) -> DeclaredStyle {
        let el = element.value();
        let mut style = DeclaredStyle::default();

        let closed_dialog = el.name() == "dialog" && el.attr("open").is_none();
        if UA_HIDDEN_TAGS.contains(&el.name()) || el.attr("hidden").is_some() || closed_dialog {
            style.display_none = Some(true);
        }

        for rule in &self.rules {
            if rule.selector.matches(&element) {
                style.merge(rule.style);
            }
        }

        if let Some(inline) = el.attr("style") {
            style.merge(parse_declarations(inline));
        }

        style
    }
}

/// True when any query in a `media` list can match a screen.
/// Media features are not evaluated; `(max-width: 600px)` counts as screen.
fn media_applies_to_screen(media: &str) -> bool {
    media.split(',').any(|query| {
        let query = query.trim().to_ascii_lowercase();
        let mut tokens = query.split_whitespace();
        match tokens.next() {
            None => true,
            Some("not") => !matches!(tokens.next(), Some("screen" | "all")),
            Some("only") => matches!(tokens.next(), Some("screen" | "all")),
            Some(media_type) => !matches!(media_type, "print" | "speech"),
        }
    })
}

/// Parses a declaration block (`display: none; color: red`).
fn parse_declarations(block: &str) -> DeclaredStyle {
    let mut style = DeclaredStyle::default();

    for declaration in block.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        let value = value.trim_end_matches("!important").trim();

        match property.as_str() {
            "display" => style.display_none = Some(value == "none"),
            "visibility" => {
                style.visibility = match value {
                    "hidden" | "collapse" => Some(VisibilityValue::Hidden),
                    "visible" => Some(VisibilityValue::Visible),
                    _ => None,
                }
            }
            _ => {}
        }
    }

    style
}

/// Splits a stylesheet into top-level rules and keeps the ones that declare
/// `display` or `visibility`. At-rule blocks (`@media`, `@font-face`, ...)
/// are skipped whole.
fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let css = CSS_COMMENT_RE.replace_all(css, "");
    let mut rules = Vec::new();

    let mut depth = 0usize;
    let mut prelude = String::new();
    let mut body = String::new();

    for c in css.chars() {
        match c {
            '{' => {
                if depth > 0 {
                    body.push(c);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    body.push(c);
                    continue;
                }
                let selectors = prelude.trim();
                if !selectors.starts_with('@') {
                    let style = parse_declarations(&body);
                    if !style.is_empty() {
                        rules.extend(parse_selector_list(selectors).map(|selector| StyleRule {
                            selector,
                            style,
                        }));
                    }
                }
                prelude.clear();
                body.clear();
            }
            // Statement at-rules such as `@import url(x);`
            ';' if depth == 0 => prelude.clear(),
            _ if depth == 0 => prelude.push(c),
            _ => body.push(c),
        }
    }

    rules
}

/// Parses each comma-separated selector on its own so one unsupported
/// selector does not discard the rest of the list.
fn parse_selector_list(list: &str) -> impl Iterator<Item = Selector> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !DYNAMIC_SELECTOR_MARKERS.iter().any(|m| s.contains(m)))
        .filter_map(|s| Selector::parse(s).ok())
}
