//! Declarative extraction rules
//!
//! Each field the parsers produce is described by a locator plus a small
//! post-processing flag. The defaults describe amazon.in markup; a changed site
//! layout is handled by editing the `rules` section of the config file.

use cssparser::{serialize_identifier, serialize_string};
use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ParsingError, ParsingResult};
use crate::domain::product::{FIELD_PRICE, FIELD_REVIEWS, FIELD_TITLE};
use crate::infrastructure::config::amazon_in;

/// How to find an element in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// Element with an exact `id` attribute
    Id {
        #[serde(default)]
        tag: Option<String>,
        id: String,
    },
    /// Element carrying every class in a whitespace separated class string
    Class {
        #[serde(default)]
        tag: Option<String>,
        classes: String,
    },
    /// Raw CSS selector
    Css { selector: String },
}

impl Locator {
    pub fn id(tag: &str, id: &str) -> Self {
        Self::Id {
            tag: Some(tag.to_string()),
            id: id.to_string(),
        }
    }

    pub fn class(tag: &str, classes: &str) -> Self {
        Self::Class {
            tag: Some(tag.to_string()),
            classes: classes.to_string(),
        }
    }

    pub fn css(selector: &str) -> Self {
        Self::Css {
            selector: selector.to_string(),
        }
    }

    /// CSS selector text for this locator
    ///
    /// Ids and class names are escaped, so classes such as `2x` or `md:big`
    /// match exactly as written in the markup.
    pub fn css_selector(&self) -> ParsingResult<String> {
        let mut selector = String::new();
        let written = match self {
            Self::Id { tag, id } => {
                selector.push_str(tag.as_deref().unwrap_or(""));
                selector.push_str("[id=");
                serialize_string(id, &mut selector).map(|()| selector.push(']'))
            }
            Self::Class { tag, classes } => {
                selector.push_str(tag.as_deref().unwrap_or(""));
                let escaped = classes.split_whitespace().try_for_each(|class| {
                    selector.push('.');
                    serialize_identifier(class, &mut selector)
                });
                if selector.is_empty() {
                    selector.push('*');
                }
                escaped
            }
            Self::Css { selector: raw } => {
                selector.push_str(raw);
                Ok(())
            }
        };

        written
            .map(|()| selector)
            .map_err(|e| ParsingError::invalid_selector(&format!("{self:?}"), &e.to_string()))
    }

    pub fn compile(&self) -> ParsingResult<Selector> {
        let selector_text = self.css_selector()?;
        Selector::parse(&selector_text)
            .map_err(|e| ParsingError::invalid_selector(&selector_text, &format!("{e:?}")))
    }

    /// Compile, logging and discarding a bad selector so extraction degrades to "not found"
    pub(crate) fn compile_or_warn(&self) -> Option<Selector> {
        match self.compile() {
            Ok(selector) => Some(selector),
            Err(e) => {
                warn!("Skipping extraction: {}", e);
                None
            }
        }
    }
}

/// One scalar field of a product record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Record key the value is stored under
    pub field: String,
    pub locator: Locator,
    /// Remove left-to-right marks from the text
    #[serde(default)]
    pub strip_marks: bool,
}

impl FieldRule {
    pub fn new(field: &str, locator: Locator) -> Self {
        Self {
            field: field.to_string(),
            locator,
            strip_marks: false,
        }
    }
}

/// A key/value attribute table
///
/// Rows are `tr` elements of the located table; the first key cell and first
/// value cell of a row form one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRule {
    pub name: String,
    pub table: Locator,
    pub key_cell: Locator,
    pub value_cell: Locator,
    /// Remove left-to-right marks from values
    #[serde(default)]
    pub strip_marks: bool,
}

impl TableRule {
    /// Table with amazon's product detail row layout
    pub fn product_details(name: &str, table_id: &str, strip_marks: bool) -> Self {
        Self {
            name: name.to_string(),
            table: Locator::id("table", table_id),
            key_cell: Locator::class("th", amazon_in::TABLE_KEY_CLASS),
            value_cell: Locator::class("td", amazon_in::TABLE_VALUE_CLASS),
            strip_marks,
        }
    }
}

/// Every rule the listing and detail parsers apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionRules {
    /// Product links on a listing page; elements without `href` are ignored
    pub product_links: Locator,
    pub title: FieldRule,
    pub price: FieldRule,
    pub rating: FieldRule,
    /// Applied first
    pub detail_bullets: TableRule,
    /// Applied second; wins over detail bullets on shared keys
    pub tech_spec: TableRule,
}

impl ExtractionRules {
    /// Scalar field rules in record order
    pub fn field_rules(&self) -> [&FieldRule; 3] {
        [&self.title, &self.price, &self.rating]
    }

    /// Table rules in merge order
    pub fn table_rules(&self) -> [&TableRule; 2] {
        [&self.detail_bullets, &self.tech_spec]
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            product_links: Locator::class("a", amazon_in::PRODUCT_LINK_CLASS),
            title: FieldRule::new(FIELD_TITLE, Locator::id("span", amazon_in::TITLE_ID)),
            price: FieldRule::new(FIELD_PRICE, Locator::class("span", amazon_in::PRICE_CLASS)),
            rating: FieldRule::new(
                FIELD_REVIEWS,
                Locator::class("span", amazon_in::RATING_TEXT_CLASS),
            ),
            detail_bullets: TableRule::product_details(
                "detail_bullets",
                amazon_in::DETAIL_BULLETS_TABLE_ID,
                false,
            ),
            tech_spec: TableRule::product_details(
                "tech_spec",
                amazon_in::TECH_SPEC_TABLE_ID,
                true,
            ),
        }
    }
}
