// src/scrape/extract.rs
//! Turn a job page's HTML into plain text

use crate::utils::collapse_whitespace;
use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never belongs to the posting.
const SKIPPED_TAGS: &[&str] = &[
    "head", "script", "style", "nav", "header", "footer", "noscript", "template", "svg",
];

/// Elements that start a new line in the extracted text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "aside", "li", "ul", "ol", "br", "h1", "h2",
    "h3", "h4", "h5", "h6", "tr", "table", "dd", "dt", "dl", "blockquote", "pre", "form",
];

/// Job-specific containers first, then generic page landmarks.
const CONTENT_SELECTORS: &[&str] = &[
    ".job-description",
    ".job-details",
    ".posting-description",
    "#job-description",
    "[role='main']",
    ".description",
    ".content",
    "main",
    "article",
    "body",
];

const TITLE_SELECTORS: &[&str] = &["title", "meta[property='og:title']", "h1"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub text: String,
}

pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    ExtractedPage {
        title: find_title(&document),
        text: find_content(&document),
    }
}

fn find_title(document: &Html) -> Option<String> {
    for selector_str in TITLE_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let raw = match element.value().attr("content") {
                Some(content) => content.to_string(),
                None => element.text().collect::<String>(),
            };
            let title = collapse_whitespace(&raw);
            if !title.is_empty() {
                return Some(title);
            }
        }
    }
    None
}

fn find_content(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }
    element_text(document.root_element())
}

/// Visible text of `element` with boilerplate subtrees removed, cleaned.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    clean_text(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };
                let is_block = BLOCK_TAGS.contains(&name);
                if is_block {
                    out.push('\n');
                }
                collect_text(child_element, out);
                if is_block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Trim every line, collapse inner whitespace, drop blank lines.
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
