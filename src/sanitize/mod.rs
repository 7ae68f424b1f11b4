//! Allowlist sanitizing for article bodies.
//!
//! Article HTML comes straight from the content API and must never reach a
//! renderer unfiltered. Elements outside the allowlist are unwrapped (their
//! children survive); script-like elements are dropped with their subtree.

use std::sync::OnceLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "div", "em", "figcaption", "figure", "h1", "h2", "h3",
    "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "s", "span", "strong", "sub",
    "sup", "table", "tbody", "td", "th", "thead", "tr", "u", "ul",
];

const DROPPED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "form", "input",
    "button", "textarea", "select", "svg", "math", "link", "meta", "base", "frame", "frameset",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

const URL_ATTRS: &[&str] = &["href", "src"];

const LINK_ATTRS: &[&str] = &["href", "title"];
const IMAGE_ATTRS: &[&str] = &["src", "alt", "title", "width", "height"];
const CELL_ATTRS: &[&str] = &["colspan", "rowspan"];

fn allowed_attrs(tag: &str) -> &'static [&'static str] {
    match tag {
        "a" => LINK_ATTRS,
        "img" => IMAGE_ATTRS,
        "td" | "th" => CELL_ATTRS,
        _ => &[],
    }
}

fn unsafe_scheme() -> &'static Regex {
    static UNSAFE_SCHEME: OnceLock<Regex> = OnceLock::new();
    UNSAFE_SCHEME.get_or_init(|| {
        Regex::new(r"(?i)^(javascript|vbscript|data|file):").expect("static regex")
    })
}

/// Browsers ignore whitespace and control characters inside a scheme, so
/// they are stripped before the check.
fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    !unsafe_scheme().is_match(&compact)
}

/// Return `html` with only allowlisted elements and attributes.
pub fn sanitize_html(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_children(document.root_element(), &mut out);
    out
}

fn write_children(parent: ElementRef<'_>, out: &mut String) {
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    write_element(element, out);
                }
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();

    if DROPPED_TAGS.contains(&name) {
        return;
    }

    if !ALLOWED_TAGS.contains(&name) {
        write_children(element, out);
        return;
    }

    out.push('<');
    out.push_str(name);

    let mut has_href = false;
    for attr in allowed_attrs(name) {
        let Some(value) = element.value().attr(attr) else {
            continue;
        };
        if URL_ATTRS.contains(attr) && !is_safe_url(value) {
            continue;
        }
        if *attr == "href" {
            has_href = true;
        }
        out.push(' ');
        out.push_str(attr);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }

    if has_href {
        out.push_str(" rel=\"noopener noreferrer nofollow\"");
    }

    out.push('>');

    if VOID_TAGS.contains(&name) {
        return;
    }

    write_children(element, out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

/// Extract plain text from HTML content, preserving some structure
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_fragment(html);
    let mut text = String::new();

    for node in document.root_element().descendants() {
        if let Some(text_node) = node.value().as_text() {
            let inside_dropped = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| DROPPED_TAGS.contains(&e.name()))
            });
            if !inside_dropped {
                text.push_str(text_node);
            }
        }
        // Add space after block elements to preserve word boundaries
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "p" | "br" | "div" | "li" | "h1" | "h2" | "h3" | "h4" => text.push(' '),
                _ => {}
            }
        }
    }

    // Collapse whitespace and trim
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
