//! Product list parser
//!
//! Finds product detail links on a search results page.

use scraper::Html;
use tracing::debug;
use url::Url;

use super::extractor::extract_links_with_base;
use super::rules::{ExtractionRules, Locator};
use super::{HtmlParser, ParsingError, ParsingResult};

/// Parser for extracting product links from listing pages
#[derive(Debug, Clone)]
pub struct ProductListParser {
    link_locator: Locator,
    base_url: Url,
}

impl ProductListParser {
    /// Parser with the default amazon.in link rule and origin
    pub fn new() -> ParsingResult<Self> {
        let rules = ExtractionRules::default();
        Self::with_config(&rules, crate::infrastructure::config::amazon_in::BASE_URL)
    }

    /// Parser with custom rules and link resolution origin
    pub fn with_config(rules: &ExtractionRules, base_url: &str) -> ParsingResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ParsingError::url_resolution_failed(base_url, &format!("Invalid base URL: {e}"), None)
        })?;

        // Surface a broken link rule at construction instead of on every page
        rules.product_links.compile()?;

        Ok(Self {
            link_locator: rules.product_links.clone(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl HtmlParser for ProductListParser {
    type Output = Vec<String>;

    fn parse_document(&self, document: &Html) -> Self::Output {
        let links = extract_links_with_base(document, &self.link_locator, &self.base_url);
        debug!("Found {} product links", links.len());
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING_PAGE: &str = r#"
        <div class="s-result-list">
          <h2><a class="a-link-normal s-underline-text s-underline-link-text s-link-style a-text-normal"
                 href="/HP-Laptop/dp/B0AAA/ref=sr_1_1">HP Laptop</a></h2>
          <h2><a class="a-link-normal s-underline-text s-underline-link-text s-link-style a-text-normal"
                 href="/sspa/click?spc=1&amp;url=%2Fdp%2FB0BBB">Sponsored</a></h2>
          <a class="a-link-normal" href="/dp/B0CCC">Image link</a>
        </div>"#;

    #[test]
    fn test_parser_creation() {
        let parser = ProductListParser::new();
        assert!(parser.is_ok());
    }

    #[test]
    fn test_parse_listing_links() {
        let parser = ProductListParser::new().unwrap();
        let links = parser.parse(LISTING_PAGE);

        assert_eq!(
            links,
            vec![
                "https://www.amazon.in/HP-Laptop/dp/B0AAA/ref=sr_1_1",
                "https://www.amazon.in/sspa/click?spc=1&url=%2Fdp%2FB0BBB",
            ]
        );
    }

    #[test]
    fn test_custom_base_url() {
        let parser =
            ProductListParser::with_config(&ExtractionRules::default(), "https://shop.example")
                .unwrap();
        let links = parser.parse(LISTING_PAGE);
        assert!(links.iter().all(|l| l.starts_with("https://shop.example/")));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = ProductListParser::with_config(&ExtractionRules::default(), "not a url")
            .unwrap_err();
        assert!(matches!(err, ParsingError::UrlResolutionFailed { .. }));
    }

    #[test]
    fn test_invalid_link_rule_is_rejected() {
        let rules = ExtractionRules {
            product_links: Locator::css("a["),
            ..ExtractionRules::default()
        };
        let err = ProductListParser::with_config(&rules, "https://www.amazon.in").unwrap_err();
        assert!(matches!(err, ParsingError::InvalidSelector { .. }));
    }
}
