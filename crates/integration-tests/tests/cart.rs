//! Per-owner cart flows: snapshots, consolidation, and the empty view.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tienda_core::ProductId;
use tienda_integration_tests::{TestServer, create_product, register_and_login};

#[tokio::test]
async fn test_cart_requires_token() {
    let server = TestServer::spawn().await;
    let client = Client::new();

    let response = client.get(server.url("/cart")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_cart_reads_as_empty() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], "0");
}

#[tokio::test]
async fn test_add_item_snapshots_the_product() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Teclado mecánico", "199.90").await;

    let response = client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"], "quantity": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["product_name"], "Teclado mecánico");
    assert_eq!(body["items"][0]["unit_price"], "199.90");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["items"][0]["subtotal"], "399.80");
    assert_eq!(body["total"], "399.80");
}

#[tokio::test]
async fn test_add_same_product_merges_into_one_line() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;

    for quantity in [1, 2] {
        let response = client
            .post(server.url("/cart/add"))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product["id"], "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 3);
    assert_eq!(body["items"][0]["subtotal"], "13.50");
}

#[tokio::test]
async fn test_add_without_quantity_defaults_to_one() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;

    let response = client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"] }))
        .send()
        .await
        .unwrap();

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;

    let response = client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": ProductId::generate(), "quantity": 1 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "product not found");

    // Nothing was created for the owner
    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_update_quantity_replaces_and_recomputes() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();

    let response = client
        .put(server.url(&format!("/cart/update/{product_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"][0]["quantity"], 5);
    assert_eq!(body["items"][0]["subtotal"], "22.50");
    assert_eq!(body["total"], "22.50");
}

#[tokio::test]
async fn test_update_quantity_rejects_zero_and_leaves_cart_alone() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "quantity": 2 }))
        .send()
        .await
        .unwrap();

    for bad in [0, -3] {
        let response = client
            .put(server.url(&format!("/cart/update/{product_id}")))
            .bearer_auth(&token)
            .json(&json!({ "quantity": bad }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["message"], "quantity must be at least 1");
    }

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_update_line_missing_from_cart_is_not_found() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let in_cart = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;
    let never_added = create_product(&server, &client, &token, "Hub USB", "29.00").await;
    let never_added_id = never_added["id"].as_str().unwrap();

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": in_cart["id"], "quantity": 1 }))
        .send()
        .await
        .unwrap();

    let response = client
        .put(server.url(&format!("/cart/update/{never_added_id}")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "item not in cart");
}

#[tokio::test]
async fn test_remove_item_keeps_the_rest() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let first = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;
    let second = create_product(&server, &client, &token, "Hub USB", "29.00").await;
    let first_id = first["id"].as_str().unwrap().to_owned();

    for product in [&first, &second] {
        client
            .post(server.url("/cart/add"))
            .bearer_auth(&token)
            .json(&json!({ "product_id": product["id"], "quantity": 1 }))
            .send()
            .await
            .unwrap();
    }

    let response = client
        .delete(server.url(&format!("/cart/remove/{first_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["product_name"], "Hub USB");
    assert_eq!(body["total"], "29.00");
}

#[tokio::test]
async fn test_remove_missing_item_is_not_found() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"], "quantity": 1 }))
        .send()
        .await
        .unwrap();

    let response = client
        .delete(server.url(&format!("/cart/remove/{}", ProductId::generate())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product["id"], "quantity": 3 }))
        .send()
        .await
        .unwrap();

    // Clearing a full cart and clearing a missing cart both succeed
    for _ in 0..2 {
        let response = client
            .delete(server.url("/cart/clear"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["total"], "0");
    }
}

#[tokio::test]
async fn test_carts_are_isolated_per_owner() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (ana, _) = register_and_login(&server, &client, "ana@example.com").await;
    let (benito, _) = register_and_login(&server, &client, "benito@example.com").await;
    let product = create_product(&server, &client, &ana, "Cable USB-C", "4.50").await;

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&ana)
        .json(&json!({ "product_id": product["id"], "quantity": 2 }))
        .send()
        .await
        .unwrap();

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&benito)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"], json!([]), "another owner's cart leaked");

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&ana)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_snapshot_survives_product_price_change() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "10.00").await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    client
        .post(server.url("/cart/add"))
        .bearer_auth(&token)
        .json(&json!({ "product_id": product_id, "quantity": 1 }))
        .send()
        .await
        .unwrap();

    client
        .put(server.url(&format!("/products/{product_id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Cable USB-C", "price": "20.00", "stock": 50 }))
        .send()
        .await
        .unwrap();

    // The line keeps the price it was added at
    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["items"][0]["unit_price"], "10.00");
}

#[tokio::test]
async fn test_concurrent_adds_merge_into_one_line() {
    let server = TestServer::spawn().await;
    let client = Client::new();
    let (token, _) = register_and_login(&server, &client, "ana@example.com").await;
    let product = create_product(&server, &client, &token, "Cable USB-C", "4.50").await;
    let product_id = product["id"].as_str().unwrap().to_owned();

    let add = |client: Client, url: String, token: String, product_id: String| async move {
        client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "product_id": product_id, "quantity": 1 }))
            .send()
            .await
            .unwrap()
            .status()
    };

    let url = server.url("/cart/add");
    let (a, b, c, d, e) = tokio::join!(
        add(client.clone(), url.clone(), token.clone(), product_id.clone()),
        add(client.clone(), url.clone(), token.clone(), product_id.clone()),
        add(client.clone(), url.clone(), token.clone(), product_id.clone()),
        add(client.clone(), url.clone(), token.clone(), product_id.clone()),
        add(client.clone(), url.clone(), token.clone(), product_id.clone()),
    );
    for status in [a, b, c, d, e] {
        assert_eq!(status, StatusCode::OK);
    }

    let response = client
        .get(server.url("/cart"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();

    // Five racing adds must still net one line of five, never five lines
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["quantity"], 5);
    assert_eq!(body["total"], "22.50");
}
