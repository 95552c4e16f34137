//! Integration tests for catalog reads: caching and retries.

use std::time::Duration;

use habaluna_integration_tests::{anonymous_client, catalog_product, storefront};
use habaluna_storefront::api::ErrorKind;
use habaluna_storefront::catalog::Catalog;
use habaluna_storefront::models::ProductQuery;
use habaluna_storefront::retry::RetryPolicy;
use mockito::{Matcher, Server};
use rust_decimal::Decimal;
use serde_json::json;

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn test_product_by_slug_is_cached() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let get = server
        .mock("GET", "/api/products/slug/cashmere-scarf")
        .with_status(200)
        .with_body(catalog_product("p1", "cashmere-scarf").to_string())
        .expect(1)
        .create_async()
        .await;

    let client = storefront(&server, dir.path());
    let first = client
        .catalog()
        .product_by_slug("cashmere-scarf")
        .await
        .expect("first read");
    let second = client
        .catalog()
        .product_by_slug("cashmere-scarf")
        .await
        .expect("cached read");

    get.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first.price_usd, Some(Decimal::new(4990, 2)));
    assert_eq!(first.variants.len(), 1);
}

#[tokio::test]
async fn test_list_sends_filters_and_skips_cache_for_search() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let get = server
        .mock("GET", "/api/products")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("search".into(), "felt boots".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "data": [catalog_product("p2", "felt-boots")],
                "total": 11,
                "page": 2,
                "limit": 10
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;

    let client = storefront(&server, dir.path());
    let query = ProductQuery {
        page: Some(2),
        search: Some("felt boots".to_string()),
        ..ProductQuery::default()
    };
    let page = client.catalog().list_products(&query).await.expect("list");
    client.catalog().list_products(&query).await.expect("list again");

    get.assert_async().await;
    assert_eq!(page.total, 11);
    assert_eq!(page.data.first().map(|p| p.slug.as_str()), Some("felt-boots"));
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let get = server
        .mock("GET", "/api/products/slug/felt-boots")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let catalog = Catalog::new(
        anonymous_client(&server, dir.path()),
        Duration::from_secs(60),
        fast_retry(3),
    );
    let err = catalog
        .product_by_slug("felt-boots")
        .await
        .expect_err("still unavailable");

    get.assert_async().await;
    assert_eq!(err.kind(), ErrorKind::Transient);
}

#[tokio::test]
async fn test_stock_errors_are_not_retried() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().expect("tempdir");

    let get = server
        .mock("GET", "/api/products/slug/felt-boots")
        .with_status(410)
        .with_body(r#"{"message":"Product is out of stock"}"#)
        .expect(1)
        .create_async()
        .await;

    let catalog = Catalog::new(
        anonymous_client(&server, dir.path()),
        Duration::from_secs(60),
        fast_retry(5),
    );
    let err = catalog
        .product_by_slug("felt-boots")
        .await
        .expect_err("business error");

    get.assert_async().await;
    assert_eq!(err.kind(), ErrorKind::Business);
}
