//! Product detail parser
//!
//! Runs every field and table rule over one detail page and merges the results
//! into a [`ProductRecord`]:
//!
//! 1. detail-bullets table
//! 2. tech-spec table, overriding shared keys
//! 3. Title / Price / Reviews, which no table key can override

use scraper::Html;
use tracing::debug;

use super::HtmlParser;
use super::extractor::{extract_table, find_field};
use super::rules::ExtractionRules;
use crate::domain::product::ProductRecord;

/// Parser for turning product detail pages into records
#[derive(Debug, Clone, Default)]
pub struct ProductDetailParser {
    rules: ExtractionRules,
}

impl ProductDetailParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    /// Record for a detail page, tagged with the URL it came from
    pub fn parse_from(&self, html: &str, source_url: &str) -> ProductRecord {
        self.parse(html).with_source(source_url)
    }

    pub fn build_record(&self, document: &Html) -> ProductRecord {
        let mut record = ProductRecord::new();

        for rule in self.rules.field_rules() {
            record.set(rule.field.clone(), find_field(document, rule));
        }

        for table_rule in self.rules.table_rules() {
            record.merge_specifications(extract_table(document, table_rule));
        }

        debug!(
            "Built record '{}' with {} fields",
            record.title().unwrap_or("<untitled>"),
            record.len()
        );
        record
    }
}

impl HtmlParser for ProductDetailParser {
    type Output = ProductRecord;

    fn parse_document(&self, document: &Html) -> Self::Output {
        self.build_record(document)
    }
}
