//! Field extraction primitives
//!
//! Pure functions over a parsed document. Absent elements never raise: scalar
//! lookups yield [`FieldValue::Missing`], tables come back empty, and link
//! discovery returns no links.

use scraper::{ElementRef, Html};
use tracing::{debug, warn};
use url::Url;

use super::ParsingError;
use super::rules::{FieldRule, Locator, TableRule};
use crate::domain::product::FieldValue;
use crate::infrastructure::config::{amazon_in, defaults};

/// U+200E, emitted by amazon inside specification values
pub const LEFT_TO_RIGHT_MARK: char = '\u{200e}';

/// Key/value rows of an attribute table in document order
///
/// A key seen twice keeps its first position and takes the later value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeTable {
    entries: Vec<(String, String)>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for AttributeTable {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Concatenated, trimmed text of an element and its descendants
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Remove every left-to-right mark, then trim what is left
pub fn strip_marks(text: &str) -> String {
    text.chars()
        .filter(|c| *c != LEFT_TO_RIGHT_MARK)
        .collect::<String>()
        .trim()
        .to_string()
}

/// First element matching `locator`, with its text post-processed per the rule
pub fn find_field(document: &Html, rule: &FieldRule) -> FieldValue {
    let Some(selector) = rule.locator.compile_or_warn() else {
        return FieldValue::Missing;
    };

    match document.select(&selector).next() {
        Some(element) => {
            let text = element_text(&element);
            let text = if rule.strip_marks { strip_marks(&text) } else { text };
            FieldValue::Present(text)
        }
        None => {
            debug!("No element for field '{}'", rule.field);
            FieldValue::Missing
        }
    }
}

/// Trimmed text of the `span` with `element_id`, or the missing-text sentinel
pub fn extract_text(document: &Html, element_id: &str) -> String {
    let rule = FieldRule::new("text", Locator::id("span", element_id));
    find_field(document, &rule).unwrap_or_sentinel(defaults::MISSING_TEXT_SENTINEL)
}

/// Trimmed text of the first `span` carrying `class_selector`, or the missing-text sentinel
pub fn extract_price(document: &Html, class_selector: &str) -> String {
    let rule = FieldRule::new("price", Locator::class("span", class_selector));
    find_field(document, &rule).unwrap_or_sentinel(defaults::MISSING_TEXT_SENTINEL)
}

/// Star rating text such as "4.1 out of 5 stars", if the page has one
pub fn extract_rating(document: &Html) -> Option<String> {
    let rule = FieldRule::new(
        "rating",
        Locator::class("span", amazon_in::RATING_TEXT_CLASS),
    );
    find_field(document, &rule).into()
}

/// Key/value rows of the table located by `rule`
///
/// Rows lacking either cell are skipped. A missing table gives an empty result.
pub fn extract_table(document: &Html, rule: &TableRule) -> AttributeTable {
    let mut table = AttributeTable::new();

    let (Some(table_selector), Some(key_selector), Some(value_selector)) = (
        rule.table.compile_or_warn(),
        rule.key_cell.compile_or_warn(),
        rule.value_cell.compile_or_warn(),
    ) else {
        return table;
    };
    let Some(row_selector) = Locator::css("tr").compile_or_warn() else {
        return table;
    };

    let Some(table_element) = document.select(&table_selector).next() else {
        debug!("Table '{}' not present", rule.name);
        return table;
    };

    for row in table_element.select(&row_selector) {
        let key = row.select(&key_selector).next();
        let value = row.select(&value_selector).next();

        if let (Some(key), Some(value)) = (key, value) {
            let value = element_text(&value);
            let value = if rule.strip_marks {
                strip_marks(&value)
            } else {
                value
            };
            table.insert(element_text(&key), value);
        }
    }

    debug!("Extracted {} rows from table '{}'", table.len(), rule.name);
    table
}

/// Absolute URLs of links carrying `class_selector`, resolved against amazon.in
pub fn extract_links(document: &Html, class_selector: &str) -> Vec<String> {
    match Url::parse(amazon_in::BASE_URL) {
        Ok(base) => extract_links_with_base(document, &Locator::class("a", class_selector), &base),
        Err(e) => {
            warn!("Invalid base URL {}: {}", amazon_in::BASE_URL, e);
            Vec::new()
        }
    }
}

/// Absolute URLs of every element matching `locator` that has an `href`, in document order
///
/// Duplicates are kept. An href that cannot be resolved is logged and skipped.
pub fn extract_links_with_base(document: &Html, locator: &Locator, base: &Url) -> Vec<String> {
    let Some(selector) = locator.compile_or_warn() else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                let error =
                    ParsingError::url_resolution_failed(href, &e.to_string(), Some(base.as_str()));
                warn!("Skipping link: {}", error);
                None
            }
        })
        .collect()
}
