//! End-to-end tests for the image fetch relay.

use reqwest::StatusCode;
use serde_json::Value;

mod common;
use common::{
    closed_addr, http_client, image_config, start_mock_upstream, start_relay, MockResponse,
};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 1, 2, 3, 4];

fn proxied(target: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", target)
        .finish()
}

#[tokio::test]
async fn test_relays_image_with_cache_headers() {
    let upstream = start_mock_upstream(MockResponse::bytes(Some("image/png"), PNG_MAGIC)).await;
    let relay = start_relay(image_config()).await;
    let target = format!("{}/data/hash/p1.png", upstream.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(
        response.headers()["content-length"],
        PNG_MAGIC.len().to_string().as_str()
    );
    assert_eq!(
        response.headers()["cache-control"],
        "public, s-maxage=86400, stale-while-revalidate=43200"
    );
    assert!(response.headers().get("access-control-allow-origin").is_none());
    assert_eq!(response.bytes().await.unwrap().as_ref(), PNG_MAGIC);

    let seen = &upstream.requests()[0];
    assert_eq!(seen.method(), "GET");
    assert_eq!(seen.target(), "/data/hash/p1.png");
    assert_eq!(seen.header("referer"), Some("https://mangadex.org/"));
    assert!(seen
        .header("accept")
        .is_some_and(|accept| accept.starts_with("image/avif")));
}

#[tokio::test]
async fn test_missing_content_type_defaults_to_jpeg() {
    let upstream = start_mock_upstream(MockResponse::bytes(None, b"\xff\xd8\xff\xe0jpeg")).await;
    let relay = start_relay(image_config()).await;
    let target = format!("{}/covers/abc/cover.jpg", upstream.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"\xff\xd8\xff\xe0jpeg");
}

#[tokio::test]
async fn test_disallowed_host_never_fetched() {
    let upstream = start_mock_upstream(MockResponse::bytes(Some("image/png"), PNG_MAGIC)).await;
    let mut config = image_config();
    config.image.allowed_hosts = vec!["uploads.mangadex.org".to_string()];
    let relay = start_relay(config).await;
    let target = format!("{}/data/hash/p1.png", upstream.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Host not allowed");
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn test_bad_parameters_rejected() {
    let relay = start_relay(image_config()).await;
    let client = http_client();

    let cases = [
        ("/api/image-proxy", "Missing url parameter"),
        ("/api/image-proxy?url=", "Missing url parameter"),
        ("/api/image-proxy?url=%2Frelative%2Fpath.png", "Invalid URL"),
        (
            "/api/image-proxy?url=https%3A%2F%2Fuploads.mangadex.org.evil.com%2Fx.png",
            "Host not allowed",
        ),
    ];

    for (path, message) in cases {
        let response = client.get(relay.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], message, "{path}");
    }
}

#[tokio::test]
async fn test_upstream_status_passed_through() {
    let upstream = start_mock_upstream(MockResponse::text(404, "text/plain", "gone")).await;
    let relay = start_relay(image_config()).await;
    let target = format!("{}/data/hash/missing.png", upstream.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Upstream error 404");
}

#[tokio::test]
async fn test_unreachable_image_host_hides_details() {
    let dead = closed_addr().await;
    let relay = start_relay(image_config()).await;
    let target = format!("http://{dead}/x.png");

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text().await.unwrap(), r#"{"error":"Internal error"}"#);
}

#[tokio::test]
async fn test_redirect_followed_within_allow_list() {
    let image = start_mock_upstream(MockResponse::bytes(Some("image/png"), PNG_MAGIC)).await;
    let hop = start_mock_upstream(MockResponse::redirect(format!(
        "{}/data/hash/p1.png",
        image.base_url()
    )))
    .await;
    let relay = start_relay(image_config()).await;
    let target = format!("{}/old/p1.png", hop.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.bytes().await.unwrap().as_ref(), PNG_MAGIC);
    assert_eq!(image.requests()[0].target(), "/data/hash/p1.png");
}

#[tokio::test]
async fn test_redirect_off_allow_list_not_followed() {
    let image = start_mock_upstream(MockResponse::bytes(Some("image/png"), PNG_MAGIC)).await;
    let hop = start_mock_upstream(MockResponse::redirect(format!(
        "http://localhost:{}/data/hash/p1.png",
        image.addr.port()
    )))
    .await;
    let relay = start_relay(image_config()).await;
    let target = format!("{}/old/p1.png", hop.base_url());

    let response = http_client()
        .get(relay.url(&format!("/api/image-proxy?{}", proxied(&target))))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Upstream error 302");
    assert_eq!(hop.hits(), 1);
    assert_eq!(image.hits(), 0);
}
