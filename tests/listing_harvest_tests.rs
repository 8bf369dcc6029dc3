//! End-to-end harvest over a mock shop: listing page -> product pages -> records
use product_harvester_lib::domain::product::{FIELD_PRICE, FIELD_REVIEWS, FieldValue};
use product_harvester_lib::infrastructure::{AppConfig, HttpClient, ListingCrawler};
use wiremock::matchers::{path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LINK_CLASS: &str =
    "a-link-normal s-underline-text s-underline-link-text s-link-style a-text-normal";

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("Content-Type", "text/html; charset=utf-8")
        .set_body_string(body)
}

fn listing_page(paths: &[&str]) -> String {
    let links: String = paths
        .iter()
        .map(|p| format!(r#"<div><h2><a class="{LINK_CLASS}" href="{p}"><span>item</span></a></h2></div>"#))
        .collect();
    format!("<html><body>{links}</body></html>")
}

fn laptop_page() -> String {
    r#"<html><body>
        <span id="productTitle">  Acme Book 14 </span>
        <span class="a-price-whole">49,990</span>
        <span class="a-icon-alt">4.3 out of 5 stars</span>
        <table id="productDetails_detailBullets_sections1">
          <tr><th class="a-color-secondary a-size-base prodDetSectionEntry">Brand</th>
              <td class="a-size-base prodDetAttrValue">acme</td></tr>
          <tr><th class="a-color-secondary a-size-base prodDetSectionEntry">ASIN</th>
              <td class="a-size-base prodDetAttrValue">B0ACME</td></tr>
        </table>
        <table id="productDetails_techSpec_section_1">
          <tr><th class="a-color-secondary a-size-base prodDetSectionEntry">Brand</th>
              <td class="a-size-base prodDetAttrValue">&lrm;Acme</td></tr>
          <tr><th class="a-color-secondary a-size-base prodDetSectionEntry">CPU Speed</th>
              <td class="a-size-base prodDetAttrValue">1.5&lrm;GHz</td></tr>
        </table>
    </body></html>"#
        .to_string()
}

fn config_for(server: &MockServer, last_page: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.pacing.warmup_ms = 0;
    config.pacing.between_products_ms = 0;
    config.site.base_url = server.uri();
    config.site.listing_url_template = format!("{}/s?k=laptop&page={{page}}", server.uri());
    config.site.first_page = 1;
    config.site.last_page = last_page;
    config
}

#[tokio::test]
async fn harvests_records_from_listing() {
    let server = MockServer::start().await;
    Mock::given(path("/s"))
        .and(query_param("page", "1"))
        .respond_with(html(listing_page(&["/dp/ACME", "/dp/PLAIN"])))
        .mount(&server)
        .await;
    Mock::given(path("/dp/ACME"))
        .respond_with(html(laptop_page()))
        .mount(&server)
        .await;
    Mock::given(path("/dp/PLAIN"))
        .respond_with(html(
            r#"<span id="productTitle">Plain Widget</span><span class="a-price-whole">499</span>"#
                .to_string(),
        ))
        .mount(&server)
        .await;

    let config = config_for(&server, 1);
    let client = HttpClient::from_app_config(&config).unwrap();
    let crawler = ListingCrawler::from_app_config(client, &config).unwrap();

    let report = crawler.harvest_pages(&config.site).await;

    assert!(report.failures.is_empty(), "{:?}", report.failures);
    assert_eq!(report.records.len(), 2);

    let laptop = &report.records[0];
    assert_eq!(laptop.title(), Some("Acme Book 14"));
    assert_eq!(laptop.text(FIELD_PRICE), Some("49,990"));
    assert_eq!(laptop.text(FIELD_REVIEWS), Some("4.3 out of 5 stars"));
    assert_eq!(laptop.text("Brand"), Some("Acme"));
    assert_eq!(laptop.text("ASIN"), Some("B0ACME"));
    assert_eq!(laptop.text("CPU Speed"), Some("1.5GHz"));
    assert_eq!(
        laptop.source_url.as_deref(),
        Some(format!("{}/dp/ACME", server.uri()).as_str())
    );

    let plain = &report.records[1];
    assert_eq!(plain.title(), Some("Plain Widget"));
    assert_eq!(plain.get(FIELD_REVIEWS), Some(&FieldValue::Missing));
    assert_eq!(plain.len(), 3);
}

#[tokio::test]
async fn failing_product_page_does_not_drop_the_rest() {
    let server = MockServer::start().await;
    Mock::given(path("/s"))
        .and(query_param("page", "1"))
        .respond_with(html(listing_page(&["/dp/BROKEN", "/dp/ACME"])))
        .mount(&server)
        .await;
    Mock::given(path("/s"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(path("/dp/BROKEN"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(path("/dp/ACME"))
        .respond_with(html(laptop_page()))
        .mount(&server)
        .await;

    let config = config_for(&server, 2);
    let client = HttpClient::from_app_config(&config).unwrap();
    let crawler = ListingCrawler::from_app_config(client, &config).unwrap();

    let report = crawler.harvest_pages(&config.site).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title(), Some("Acme Book 14"));

    let failed: Vec<_> = report.failures.iter().map(|f| f.url.as_str()).collect();
    assert_eq!(
        failed,
        vec![
            format!("{}/dp/BROKEN", server.uri()),
            format!("{}/s?k=laptop&page=2", server.uri()),
        ]
    );
}

#[tokio::test]
async fn empty_listing_requests_no_product_pages() {
    let server = MockServer::start().await;
    Mock::given(path("/s"))
        .respond_with(html("<html><body>No results for laptop</body></html>".to_string()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/dp/ANY"))
        .respond_with(html(laptop_page()))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server, 1);
    let client = HttpClient::from_app_config(&config).unwrap();
    let crawler = ListingCrawler::from_app_config(client, &config).unwrap();

    let report = crawler
        .crawl_listing(&config.site.listing_url(1))
        .await
        .unwrap();

    assert!(report.records.is_empty());
    assert!(report.failures.is_empty());
}
