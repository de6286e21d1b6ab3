//! End-to-end tests against a live server.

use std::collections::HashSet;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use suggest::http::Envelope;
use suggest::SuggestConfig;

mod common;

#[tokio::test]
async fn test_insert_then_suggest_scenario() {
    let server = common::start_server(SuggestConfig::default()).await;
    let client = common::client();

    let res = client
        .post(server.url("/"))
        .header(ACCEPT, "application/json")
        .json(&json!({"key": "hel", "value": null}))
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(server.url("/?key=hel"))
        .header(ACCEPT, "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "status": "OK",
            "message": "successful in retrieving results",
            "payload": [{"key": "hel", "value": null}]
        })
    );
}

#[tokio::test]
async fn test_prefix_grouping_over_http() {
    let server = common::start_server(SuggestConfig::default()).await;
    let client = common::client();

    for (key, value) in [("car", 1), ("cart", 2), ("dog", 3)] {
        let res = client
            .post(server.url("/"))
            .json(&json!({"key": key, "value": value}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client.get(server.url("/?key=ca")).send().await.unwrap();
    let envelope: Envelope = res.json().await.unwrap();
    let keys: Vec<_> = envelope
        .payload
        .unwrap()
        .into_iter()
        .map(|t| t.key)
        .collect();
    assert_eq!(keys, vec!["car", "cart"]);

    let res = client.get(server.url("/?key=z")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let envelope: Envelope = res.json().await.unwrap();
    assert_eq!(envelope.payload, Some(vec![]));
}

#[tokio::test]
async fn test_concurrent_clients_lose_no_inserts() {
    let mut config = SuggestConfig::default();
    config.store.insert_queue_depth = 4;
    let server = common::start_server(config).await;
    let client = common::client();
    let n = 50;

    let mut tasks = Vec::new();
    for i in 0..n {
        let client = client.clone();
        let url = server.url("/");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"key": format!("term-{i}"), "value": i}))
                .send()
                .await
                .map(|res| res.status())
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), StatusCode::OK);
    }

    let res = client.get(server.url("/?key=")).send().await.unwrap();
    let envelope: Envelope = res.json().await.unwrap();
    let keys: HashSet<_> = envelope.payload.unwrap().into_iter().map(|t| t.key).collect();
    assert_eq!(keys.len(), n);
}

#[tokio::test]
async fn test_content_negotiation() {
    let server = common::start_server(SuggestConfig::default()).await;
    let client = common::client();

    client
        .post(server.url("/"))
        .json(&json!({"key": "xml", "value": "markup"}))
        .send()
        .await
        .unwrap();

    let res = client
        .get(server.url("/?key=x"))
        .header(ACCEPT, "application/xml")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[CONTENT_TYPE], "application/xml");
    let body = res.text().await.unwrap();
    assert!(body.starts_with("<result>"), "{body}");
    assert!(body.contains("<message>successful in retrieving results</message>"), "{body}");

    let res = client
        .get(server.url("/?key=x"))
        .header(ACCEPT, "text/plain")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let server = common::start_server(SuggestConfig::default()).await;
    let client = common::client();

    let res = client
        .get(server.url("/?key=a"))
        .header("x-request-id", "abc-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "abc-123");
}
