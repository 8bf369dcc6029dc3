//! HTML extraction for listing and detail pages
//!
//! Extraction is data driven: [`ExtractionRules`] names every element the
//! parsers look for, and the functions in [`extractor`] apply one rule to a
//! parsed document. A rule that matches nothing yields a missing field or an
//! empty collection, never an error.

pub mod error;
pub mod extractor;
pub mod product_detail_parser;
pub mod product_list_parser;
pub mod rules;

// Re-export public types
pub use error::{ParsingError, ParsingResult};
pub use extractor::{
    AttributeTable, extract_links, extract_price, extract_rating, extract_table, extract_text,
};
pub use product_detail_parser::ProductDetailParser;
pub use product_list_parser::ProductListParser;
pub use rules::{ExtractionRules, FieldRule, Locator, TableRule};

use scraper::Html;

/// Parser over a whole page
///
/// `scraper::Html` is not `Send`, so async callers hand over the raw text and
/// get owned output back; the parsed tree never lives across an await point.
pub trait HtmlParser {
    type Output;

    fn parse_document(&self, document: &Html) -> Self::Output;

    fn parse(&self, html: &str) -> Self::Output {
        self.parse_document(&Html::parse_document(html))
    }
}
