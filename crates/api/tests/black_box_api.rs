use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = build_app(AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create(
    client: &reqwest::Client,
    srv: &TestServer,
    body: serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(srv.url("/products"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_defaults_quantity_and_echoes_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let body = create(
        &client,
        &srv,
        json!({ "name": "Laptop", "sku": "SKU123", "price": 1000.5 }),
    )
    .await;

    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["name"], "Laptop");
    assert_eq!(body["sku"], "SKU123");
    assert_eq!(body["price"], 1000.5);
    assert_eq!(body["quantity"], 0);
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn duplicate_sku_is_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    create(
        &client,
        &srv,
        json!({ "name": "Laptop", "sku": "SKU123", "price": 1000, "quantity": 5 }),
    )
    .await;

    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": "Other", "sku": "SKU123", "price": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Product with SKU 'SKU123' already exists");
}

#[tokio::test]
async fn invalid_fields_are_reported_per_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .json(&json!({ "name": "", "sku": "X", "price": -1, "quantity": -3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<&str> = body["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price"));
    assert!(fields.contains(&"quantity"));
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/products"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_ids_are_rejected_before_lookup() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for id in ["abc", "0", "-4"] {
        let res = client
            .get(srv.url(&format!("/products/{id}")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "id {id}");
    }
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/products/999")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Product with ID 999 not found");

    let res = client
        .patch(srv.url("/products/999"))
        .json(&json!({ "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_changes_only_supplied_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &srv,
        json!({ "name": "Laptop", "sku": "SKU123", "price": 1000, "quantity": 5 }),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let res = client
        .patch(srv.url(&format!("/products/{id}")))
        .json(&json!({ "price": 899.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["price"], 899.5);
    assert_eq!(updated["name"], created["name"]);
    assert_eq!(updated["sku"], created["sku"]);
    assert_eq!(updated["quantity"], 5);
    assert_eq!(updated["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn delete_then_lookup_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &srv,
        json!({ "name": "Laptop", "sku": "SKU123", "price": 10 }),
    )
    .await;
    let url = srv.url(&format!("/products/{}", created["id"]));

    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client.get(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.delete(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_name_and_pages() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for (name, sku) in [("Laptop", "L"), ("Desktop", "D"), ("Mouse", "M")] {
        create(&client, &srv, json!({ "name": name, "sku": sku, "price": 5 })).await;
    }

    let res = client
        .get(srv.url("/products?search=top&page=1&limit=10"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["products"].as_array().unwrap().len(), 2);

    let res = client
        .get(srv.url("/products?limit=2&page=2"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let res = client
        .get(srv.url("/products?page=0"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
