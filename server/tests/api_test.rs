//! Integration tests for the objects API.
//!
//! Each test starts its own server on an ephemeral port.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use simplyput_server::{app, config::Config, AppState};

/// Start a server for `config` and return its base URL.
async fn spawn_server(config: Config) -> String {
    let state = AppState::new(config).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

fn config_with_tokens(tokens: &[(&str, &str)]) -> Config {
    let mut config = Config::default();
    for (token, namespace) in tokens {
        config.tokens.insert(token.to_string(), namespace.to_string());
    }
    config
}

async fn create(client: &Client, base: &str, kind: &str, body: Value) -> Value {
    let response = client
        .post(format!("{base}/objects/{kind}"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn record_lifecycle() {
    let base = spawn_server(Config::default()).await;
    let client = Client::new();

    let created = create(&client, &base, "MyKind", json!({"a": true})).await;
    assert_eq!(created["a"], true);
    assert!(created["_created"].is_i64());
    let id = created["_id"].as_str().unwrap().to_string();
    let url = format!("{base}/objects/MyKind/{id}");

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert_eq!(fetched, created);

    let response = client
        .post(&url)
        .json(&json!({"a": false, "_id": "forged", "_created": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched: Value = client.get(&url).send().await.unwrap().json().await.unwrap();
    let object = fetched.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(fetched["a"], false);
    assert_eq!(fetched["_id"], id.as_str());
    assert!(fetched["_updated"].is_i64());

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().is_empty());

    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cursor_continuation() {
    let base = spawn_server(Config::default()).await;
    let client = Client::new();
    for n in 0..3 {
        create(&client, &base, "items", json!({ "n": n })).await;
    }

    let first: Value = client
        .get(format!("{base}/objects/items"))
        .query(&[("limit", "1")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["items"].as_array().unwrap().len(), 1);
    let token = first["nextStartToken"].as_str().unwrap();
    assert!(!token.is_empty());

    let second: Value = client
        .get(format!("{base}/objects/items"))
        .query(&[("limit", "1"), ("start", token)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert_ne!(second["items"][0]["_id"], first["items"][0]["_id"]);
}

#[tokio::test]
async fn filters_and_sort() {
    let base = spawn_server(Config::default()).await;
    let client = Client::new();
    create(&client, &base, "people", json!({"name": "ann", "team": "red"})).await;
    create(&client, &base, "people", json!({"name": "bob", "team": "blue"})).await;
    create(&client, &base, "people", json!({"name": "cat", "team": "red"})).await;

    let page: Value = client
        .get(format!("{base}/objects/people"))
        .query(&[("where", "team=red"), ("sort", "-name")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["cat", "ann"]);
}

#[tokio::test]
async fn malformed_where_is_rejected() {
    let base = spawn_server(Config::default()).await;
    let response = Client::new()
        .get(format!("{base}/objects/items"))
        .query(&[("where", "no-equals-sign")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "invalid where: no-equals-sign");
}

#[tokio::test]
async fn namespaces_are_isolated() {
    let base = spawn_server(config_with_tokens(&[("t-alice", "alice"), ("t-bob", "bob")])).await;
    let client = Client::new();

    let created: Value = client
        .post(format!("{base}/objects/notes"))
        .bearer_auth("t-alice")
        .json(&json!({"owner": "alice"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["_id"].as_str().unwrap();

    let bob_page: Value = client
        .get(format!("{base}/objects/notes?access_token=t-bob"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bob_page["items"], json!([]));

    let response = client
        .get(format!("{base}/objects/notes/{id}"))
        .bearer_auth("t-bob")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let alice_page: Value = client
        .get(format!("{base}/objects/notes?access_token=t-alice"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(alice_page["items"][0]["owner"], "alice");

    let response = client
        .get(format!("{base}/objects/notes"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn snapshot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_path: Some(dir.path().join("store.json")),
        ..Config::default()
    };

    let base = spawn_server(config.clone()).await;
    let client = Client::new();
    let body = json!({"title": "kept", "tags": ["a", "b"]});
    let created = create(&client, &base, "notes", body).await;
    let id = created["_id"].as_str().unwrap();

    let restarted = spawn_server(config).await;
    let fetched: Value = client
        .get(format!("{restarted}/objects/notes/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn unsaved_writes_are_not_kept() {
    let dir = tempfile::tempdir().unwrap();
    let parent = dir.path().join("missing");
    let config = Config {
        data_path: Some(parent.join("store.json")),
        ..Config::default()
    };
    let base = spawn_server(config).await;
    let client = Client::new();

    let response = client
        .post(format!("{base}/objects/notes"))
        .json(&json!({"a": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let page: Value = client
        .get(format!("{base}/objects/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["items"], json!([]));

    std::fs::create_dir(&parent).unwrap();
    let created = create(&client, &base, "notes", json!({"a": 2})).await;
    let page: Value = client
        .get(format!("{base}/objects/notes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["items"], json!([created]));
    assert!(parent.join("store.json").exists());
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let base = spawn_server(Config::default()).await;
    let response = Client::new()
        .get(format!("{base}/health"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
