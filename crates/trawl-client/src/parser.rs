//! HTML parsing: boilerplate-free text extraction, title, and in-domain
//! link collection.

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};
use trawl_core::models::FetchedPage;

/// Non-content elements whose subtrees are dropped before text extraction.
const SKIP_TAGS: &[&str] = &["script", "style", "header", "footer", "nav"];

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Parse one page into its cleaned text, title, and in-domain links.
///
/// Links are anchor targets whose string contains `domain_marker`, kept in
/// document order with duplicates; no URL normalization beyond that filter.
pub fn parse_page(html: &str, domain_marker: &str) -> FetchedPage {
    let document = Html::parse_document(html);
    FetchedPage {
        content: clean_text(&document),
        title: extract_title(&document),
        links: extract_links(&document, domain_marker),
    }
}

/// Remaining text after dropping [`SKIP_TAGS`] subtrees, joined with single
/// spaces and trimmed.
fn clean_text(document: &Html) -> String {
    let mut parts: Vec<String> = Vec::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let in_skipped_subtree = node.ancestors().any(|ancestor| {
                matches!(ancestor.value(), Node::Element(el) if SKIP_TAGS.contains(&el.name()))
            });
            if in_skipped_subtree {
                continue;
            }
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.split_whitespace().collect::<Vec<_>>().join(" "));
            }
        }
    }
    parts.join(" ")
}

fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_links(document: &Html, domain_marker: &str) -> Vec<String> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.contains(domain_marker))
        .map(str::to_string)
        .collect()
}
