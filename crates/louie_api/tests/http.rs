use std::sync::Arc;

use louie_api::{ChatRequest, LouieApiClient, LouieApiConfig, ShareMode, StaticToken};

fn client(base_url: &str) -> LouieApiClient {
    let config = LouieApiConfig::new(base_url).with_org_name("Acme");
    LouieApiClient::new(config, Arc::new(StaticToken::new("tok"))).expect("client")
}

#[test]
fn http_chat_request_targets_chat_endpoint_with_query() {
    let client = client("https://louie.example.com/");
    let request = ChatRequest::new("top 5 hosts")
        .with_thread_id("D_1")
        .with_share_mode(ShareMode::Organization);

    let http_request = client
        .build_chat_request(&request, "tok")
        .expect("build request")
        .build()
        .expect("request");

    assert_eq!(http_request.method(), "POST");
    assert_eq!(http_request.url().path(), "/api/chat/");
    let query: Vec<(String, String)> = http_request
        .url()
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    assert_eq!(
        query,
        vec![
            ("query".to_owned(), "top 5 hosts".to_owned()),
            ("agent".to_owned(), "LouieAgent".to_owned()),
            ("ignore_traces".to_owned(), "true".to_owned()),
            ("share_mode".to_owned(), "Organization".to_owned()),
            ("dthread_id".to_owned(), "D_1".to_owned()),
        ]
    );
    assert_eq!(
        http_request
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer tok")
    );
    assert_eq!(
        http_request
            .headers()
            .get("x-graphistry-org")
            .and_then(|value| value.to_str().ok()),
        Some("acme")
    );
}

#[test]
fn http_client_reports_normalized_base() {
    let client = client(" https://louie.example.com// ");
    assert_eq!(client.base_url(), "https://louie.example.com");
    assert_eq!(client.config().org_name.as_deref(), Some("Acme"));
}
