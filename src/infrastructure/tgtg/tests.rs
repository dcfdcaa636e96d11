//! Client tests against a mock Too Good To Go server

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::application::errors::ApiErrorKind;
use crate::infrastructure::config::Config;
use reqwest::header::HeaderValue;

fn config(base_url: &str) -> MarketplaceConfig {
    let mut config = Config::default().marketplace;
    config.base_url = base_url.to_string();
    config.polling_interval_secs = 0;
    config.max_polling_attempts = 3;
    config.page_size = 2;
    config
}

fn client(base_url: &str) -> TgtgClient {
    TgtgClient::new(config(base_url)).unwrap()
}

async fn mock_client() -> (MockServer, TgtgClient) {
    let server = MockServer::start().await;
    let client = client(&format!("{}/api/", server.uri()));
    (server, client)
}

fn credentials(token: &str) -> Credentials {
    Credentials {
        access_token: format!("{}-access", token),
        refresh_token: format!("{}-refresh", token),
        user_id: "42".to_string(),
        cookie: format!("datadome={}", token),
    }
}

fn favorite(store_id: i64, item_id: i64, available: u32) -> Value {
    json!({
        "item": { "item_id": item_id.to_string(), "name": "Magic Bag" },
        "store": { "store_id": store_id.to_string(), "store_name": "Bakery", "branch": "Downtown" },
        "items_available": available,
        "pickup_interval": { "start": "2024-06-01T10:00:00Z", "end": "2024-06-01T10:30:00Z" }
    })
}

#[test]
fn test_url_joins_base_and_endpoint() {
    assert_eq!(
        client("https://apptoogoodtogo.com/api/").url(ITEM_ENDPOINT),
        "https://apptoogoodtogo.com/api/item/v8/"
    );
    assert_eq!(
        client("http://localhost:8080/api").url(REFRESH_ENDPOINT),
        "http://localhost:8080/api/auth/v5/token/refresh"
    );
}

#[test]
fn test_session_cookie_keeps_name_value_pairs() {
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, HeaderValue::from_static("datadome=abc123; Max-Age=31536000; Path=/; Secure"));
    headers.append(SET_COOKIE, HeaderValue::from_static("session=xyz; HttpOnly"));

    assert_eq!(session_cookie(&headers).as_deref(), Some("datadome=abc123; session=xyz"));
    assert_eq!(session_cookie(&HeaderMap::new()), None);
}

#[test]
fn test_token_lifetime_from_config() {
    assert_eq!(client("https://example.com/").token_lifetime(), Duration::hours(4));
}

#[tokio::test]
async fn test_login_waits_for_email_confirmation() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByEmail"))
        .and(body_partial_json(json!({ "email": "ann@example.com", "device_type": "ANDROID" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "state": "WAIT", "polling_id": "poll-1" }))
                .insert_header("set-cookie", "datadome=first; Path=/; Secure"),
        )
        .expect(1)
        .mount(&server)
        .await;

    // first poll: not confirmed yet
    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByRequestPollingId"))
        .and(header("cookie", "datadome=first"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByRequestPollingId"))
        .and(header("cookie", "datadome=first"))
        .and(body_partial_json(json!({ "request_polling_id": "poll-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "startup_data": { "user": { "user_id": 42 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = client.login("ann@example.com").await.unwrap();

    assert_eq!(credentials.access_token, "new-access");
    assert_eq!(credentials.refresh_token, "new-refresh");
    assert_eq!(credentials.user_id, "42");
    assert_eq!(credentials.cookie, "datadome=first");
}

#[tokio::test]
async fn test_login_gives_up_after_max_attempts() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "WAIT", "polling_id": "poll-1" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByRequestPollingId"))
        .respond_with(ResponseTemplate::new(202))
        .expect(3)
        .mount(&server)
        .await;

    let err = client.login("ann@example.com").await.unwrap_err();

    assert_eq!(err.kind, ApiErrorKind::Other);
    assert!(err.message.contains("not confirmed after 3 attempts"));
}

#[tokio::test]
async fn test_login_terms_state_needs_signup() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "TERMS" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByRequestPollingId"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.login("new@example.com").await.unwrap_err();

    assert!(!err.is_unauthorized());
    assert!(err.message.contains("sign up in the app first"));
}

#[tokio::test]
async fn test_login_unexpected_state() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/authByEmail"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "state": "BLOCKED" })))
        .mount(&server)
        .await;

    let err = client.login("ann@example.com").await.unwrap_err();

    assert!(err.message.contains("unexpected login state BLOCKED"));
}

#[tokio::test]
async fn test_stored_session_refreshes_before_listing() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/token/refresh"))
        .and(header("cookie", "datadome=old"))
        .and(body_partial_json(json!({ "refresh_token": "old-refresh" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "new-access", "refresh_token": "new-refresh" }))
                .insert_header("set-cookie", "datadome=new; Path=/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .and(header("authorization", "Bearer new-access"))
        .and(header("cookie", "datadome=new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::stored(credentials("old"));
    let snapshots = client.get_items(&mut session).await.unwrap();

    assert!(snapshots.is_empty());
    assert!(session.refreshed_at.is_some());
    assert_eq!(session.credentials.access_token, "new-access");
    assert_eq!(session.credentials.refresh_token, "new-refresh");
    assert_eq!(session.credentials.cookie, "datadome=new");
    assert_eq!(session.credentials.user_id, "42");
}

#[tokio::test]
async fn test_fresh_session_skips_refresh() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/v5/token/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::issued(credentials("fresh"), Utc::now());
    client.get_items(&mut session).await.unwrap();

    assert_eq!(session.credentials, credentials("fresh"));
}

#[tokio::test]
async fn test_favorites_paged_until_short_page() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .and(body_partial_json(json!({ "page": 1, "page_size": 2, "favorites_only": true, "user_id": "42" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [favorite(10, 100, 0), favorite(11, 110, 2)] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .and(body_partial_json(json!({ "page": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [favorite(12, 120, 5)] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = Session::issued(credentials("fresh"), Utc::now());
    let snapshots = client.get_items(&mut session).await.unwrap();

    let ids: Vec<_> = snapshots.iter().map(|s| (s.store_id, s.item_id, s.items_available)).collect();
    assert_eq!(ids, vec![(10, 100, 0), (11, 110, 2), (12, 120, 5)]);
    assert_eq!(snapshots[2].item_name, "Magic Bag");
    assert_eq!(snapshots[2].branch, "Downtown");
}

#[tokio::test]
async fn test_rejected_listing_is_unauthorized() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"errors":[{"code":"UNAUTHORIZED"}]}"#))
        .mount(&server)
        .await;

    let mut session = Session::issued(credentials("fresh"), Utc::now());
    let err = client.get_items(&mut session).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.status, Some(401));
}

#[tokio::test]
async fn test_server_error_and_captcha_are_other() {
    let (server, client) = mock_client().await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/item/v8/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(r#"{"url":"https://geo.captcha-delivery.com/captcha/"}"#),
        )
        .mount(&server)
        .await;

    let mut session = Session::issued(credentials("fresh"), Utc::now());

    let err = client.get_items(&mut session).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Other);
    assert_eq!(err.status, Some(500));

    let err = client.get_items(&mut session).await.unwrap_err();
    assert_eq!(err.kind, ApiErrorKind::Other);
    assert_eq!(err.status, Some(403));
}
