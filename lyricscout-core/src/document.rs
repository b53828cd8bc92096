//! Parsed pages and selector lookups.
//!
//! A [`Document`] is built from a fetched [`Page`] either by parsing the HTML
//! body directly or, for JSON endpoints, by rewriting the JSON as markup first.
//! JSON object keys become elements named after the key, so a body of
//! `{"response": {"hits": [{"url": "..."}]}}` can be addressed with the
//! selector `hits > url`.
//!
//! Documents are not `Send`. Build and consume them inside synchronous code.

use crate::fetcher::{FetchError, FetchMode, Page};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::fmt::Write;
use tracing::{debug, warn};
use url::Url;

const LOG_TARGET: &str = "lyricscout::document";

/// Root element name used when the JSON body is an array
const JSON_ARRAY_ELEMENT: &str = "array";

pub struct Document {
    html: Html,
    base_url: Option<Url>,
}

impl Document {
    /// Parse an HTML body. `base_url` is used to resolve relative links.
    #[must_use]
    pub fn parse_html(body: &str, base_url: &str) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url: Url::parse(base_url).ok(),
        }
    }

    /// Parse a JSON body and expose it as a markup tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn parse_json(body: &str, base_url: &str) -> Result<Self, FetchError> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::parse_html(&json_to_markup(&value), base_url))
    }

    /// Parse a fetched page according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON page is not valid JSON.
    pub fn from_page(page: &Page, mode: FetchMode) -> Result<Self, FetchError> {
        match mode {
            FetchMode::Html => Ok(Self::parse_html(&page.body, &page.url)),
            FetchMode::Json => Self::parse_json(&page.body, &page.url),
        }
    }

    /// First element matching `selector`, if any.
    ///
    /// Selectors are checked when a source is resolved, so an unparsable
    /// selector here is logged and treated as no match.
    #[must_use]
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let parsed = match Selector::parse(selector) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(target: LOG_TARGET, "Invalid selector '{}': {}", selector, e);
                return None;
            }
        };
        self.html.select(&parsed).next()
    }

    /// The element's `href` resolved against the document URL.
    ///
    /// Returns `None` when the attribute is missing or empty, or when a
    /// relative href cannot be resolved.
    #[must_use]
    pub fn absolute_href(&self, element: ElementRef<'_>) -> Option<String> {
        let href = element.value().attr("href")?.trim();
        if href.is_empty() {
            return None;
        }
        if let Ok(url) = Url::parse(href) {
            return Some(url.to_string());
        }
        self.base_url
            .as_ref()
            .and_then(|base| base.join(href).ok())
            .map(|url| url.to_string())
    }
}

/// Visible text of an element with whitespace runs collapsed and ends trimmed
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rewrite a JSON value as markup.
///
/// Object members become `<key>value</key>`, with characters that cannot
/// appear in an element name replaced by `_` and keys that cannot start one
/// dropped. Array members repeat the
/// enclosing key once per item. A top-level array wraps items in `<array>`.
/// Scalars become escaped text and `null` becomes the text `null`.
#[must_use]
pub fn json_to_markup(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Array(items) => {
            for item in items {
                write_member(&mut out, JSON_ARRAY_ELEMENT, item);
            }
        }
        other => write_value(&mut out, other),
    }
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, member) in map {
                write_member(out, key, member);
            }
        }
        Value::Array(items) => {
            for item in items {
                write_value(out, item);
            }
        }
        Value::String(s) => out.push_str(&escape(s)),
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
    }
}

fn write_member(out: &mut String, key: &str, value: &Value) {
    let Some(name) = element_name(key) else {
        debug!(target: LOG_TARGET, "Skipping JSON key '{}': not usable as an element name", key);
        return;
    };
    write_element(out, &name, value);
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    if let Value::Array(items) = value {
        for item in items {
            write_element(out, name, item);
        }
        return;
    }
    let _ = write!(out, "<{name}>");
    write_value(out, value);
    let _ = write!(out, "</{name}>");
}

/// Element name for a JSON key.
///
/// Names must start with an ASCII letter; other characters outside
/// `[A-Za-z0-9_.-]` become `_`.
fn element_name(key: &str) -> Option<String> {
    if !key.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(
        key.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect(),
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
