mod common;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use common::{decimal, spawn_app};

#[tokio::test]
async fn test_get_cart_creates_empty_cart() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/cart"))
        .headers(app.user_headers().await)
        .send()
        .await
        .expect("Failed to send get cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total_products"], 0);
    assert_eq!(body["in_order"], false);
    assert_eq!(body["for_anonymous_user"], false);
    assert!(body["products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_add_products_keeps_totals_in_sync() {
    let app = spawn_app().await;
    app.create_notebook("cart-nb", "1000.50").await;
    app.create_smartphone("cart-ph", "250.25", json!({})).await;
    let headers = app.user_headers().await;

    let first = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "cart-nb", "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "smartphone", "slug": "cart-ph" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CREATED);

    let merged = app
        .client
        .post(app.url("/cart"))
        .headers(headers)
        .json(&json!({ "kind": "notebook", "slug": "cart-nb", "quantity": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(merged.status(), StatusCode::OK);

    let cart: Value = merged.json().await.unwrap();
    let lines = cart["products"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(cart["total_products"], 2);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["label"], "Product: Notebook cart-nb (for cart)");
    assert_eq!(decimal(&lines[0]["final_price"]), Decimal::new(300150, 2));
    assert_eq!(decimal(&lines[1]["final_price"]), Decimal::new(25025, 2));
    assert_eq!(decimal(&cart["final_price"]), Decimal::new(325175, 2));
}

#[tokio::test]
async fn test_add_rejects_zero_quantity_and_unknown_product() {
    let app = spawn_app().await;
    app.create_notebook("zero-nb", "10.00").await;
    let headers = app.user_headers().await;

    let zero = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "zero-nb", "quantity": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let missing = app
        .client
        .post(app.url("/cart"))
        .headers(headers)
        .json(&json!({ "kind": "smartphone", "slug": "zero-nb" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_quantity_and_remove_line() {
    let app = spawn_app().await;
    app.create_notebook("patch-nb", "20.00").await;
    app.create_smartphone("patch-ph", "5.00", json!({})).await;
    let headers = app.user_headers().await;

    for (kind, slug) in [("notebook", "patch-nb"), ("smartphone", "patch-ph")] {
        app.client
            .post(app.url("/cart"))
            .headers(headers.clone())
            .json(&json!({ "kind": kind, "slug": slug }))
            .send()
            .await
            .unwrap();
    }
    let cart: Value = app
        .client
        .get(app.url("/cart"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let notebook_line = cart["products"][0]["id"].as_i64().unwrap();
    let phone_line = cart["products"][1]["id"].as_i64().unwrap();

    let patched: Value = app
        .client
        .patch(app.url(&format!("/cart/{notebook_line}")))
        .headers(headers.clone())
        .json(&json!({ "quantity": 4 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(decimal(&patched["products"][0]["final_price"]), Decimal::new(8000, 2));
    assert_eq!(decimal(&patched["final_price"]), Decimal::new(8500, 2));

    let zeroed: Value = app
        .client
        .patch(app.url(&format!("/cart/{phone_line}")))
        .headers(headers.clone())
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(zeroed["total_products"], 1);
    assert_eq!(decimal(&zeroed["final_price"]), Decimal::new(8000, 2));

    let removed = app
        .client
        .delete(app.url(&format!("/cart/{notebook_line}")))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), StatusCode::OK);
    let removed: Value = removed.json().await.unwrap();
    assert_eq!(removed["total_products"], 0);
    assert_eq!(decimal(&removed["final_price"]), Decimal::ZERO);

    let gone = app
        .client
        .delete(app.url(&format!("/cart/{notebook_line}")))
        .headers(headers)
        .send()
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_locks_cart() {
    let app = spawn_app().await;
    app.create_notebook("order-nb", "99.99").await;
    let headers = app.user_headers().await;

    let empty = app
        .client
        .post(app.url("/cart/checkout"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let cart: Value = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "order-nb" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let line = cart["products"][0]["id"].as_i64().unwrap();
    let cart_id = cart["id"].as_i64().unwrap();

    let ordered = app
        .client
        .post(app.url("/cart/checkout"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(ordered.status(), StatusCode::OK);
    let ordered: Value = ordered.json().await.unwrap();
    assert_eq!(ordered["in_order"], true);

    let locked = app
        .client
        .patch(app.url(&format!("/cart/{line}")))
        .headers(headers.clone())
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(locked.status(), StatusCode::CONFLICT);

    let fresh: Value = app
        .client
        .get(app.url("/cart"))
        .headers(headers)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_ne!(fresh["id"].as_i64().unwrap(), cart_id);
    assert_eq!(fresh["total_products"], 0);

    let carts: Value = app
        .client
        .get(app.url("/admin/cart"))
        .headers(app.admin_headers().await)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ordered_cart = carts
        .as_array()
        .unwrap()
        .iter()
        .find(|cart| cart["id"].as_i64() == Some(cart_id))
        .unwrap();
    assert_eq!(ordered_cart["in_order"], true);
    assert_eq!(ordered_cart["total_products"], 1);
}

#[tokio::test]
async fn test_admin_lists_customers() {
    let app = spawn_app().await;

    let customers: Value = app
        .client
        .get(app.url("/admin/customer"))
        .headers(app.admin_headers().await)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let demo = customers
        .as_array()
        .unwrap()
        .iter()
        .find(|customer| customer["username"] == "user")
        .unwrap();
    assert_eq!(demo["label"], "Customer: Demo Customer");
}

#[tokio::test]
async fn test_deleting_product_keeps_ordered_carts() {
    let app = spawn_app().await;
    let notebook = app.create_notebook("kept-order", "40.00").await;
    let notebook_id = notebook["product"]["id"].as_i64().unwrap();
    let headers = app.user_headers().await;

    let add = json!({ "kind": "notebook", "slug": "kept-order" });
    let ordered: Value = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&add)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ordered_id = ordered["id"].as_i64().unwrap();
    let checkout = app
        .client
        .post(app.url("/cart/checkout"))
        .headers(headers.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(checkout.status(), StatusCode::OK);

    let open: Value = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&add)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let open_id = open["id"].as_i64().unwrap();
    assert_ne!(open_id, ordered_id);

    let admin = app.admin_headers().await;
    let deleted = app
        .client
        .delete(app.url(&format!("/admin/notebook/{notebook_id}")))
        .headers(admin.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let carts: Value = app
        .client
        .get(app.url("/admin/cart"))
        .headers(admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let find = |id: i64| {
        carts
            .as_array()
            .unwrap()
            .iter()
            .find(|cart| cart["id"].as_i64() == Some(id))
            .cloned()
            .unwrap()
    };

    let ordered = find(ordered_id);
    assert_eq!(ordered["total_products"], 1);
    assert_eq!(decimal(&ordered["final_price"]), Decimal::new(4000, 2));
    assert_eq!(ordered["products"][0]["label"], "Product: <removed> (for cart)");
    assert!(ordered["products"][0]["url"].is_null());

    let open = find(open_id);
    assert_eq!(open["total_products"], 0);
    assert_eq!(decimal(&open["final_price"]), Decimal::ZERO);
}

#[tokio::test]
async fn test_line_total_must_fit_price_column() {
    let app = spawn_app().await;
    app.create_notebook("top-price", "9999999.99").await;
    let headers = app.user_headers().await;

    let huge = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "top-price", "quantity": 4000000000u32 }))
        .send()
        .await
        .unwrap();
    assert_eq!(huge.status(), StatusCode::BAD_REQUEST);

    let single: Value = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "top-price" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let line = single["products"][0]["id"].as_i64().unwrap();

    let doubled = app
        .client
        .patch(app.url(&format!("/cart/{line}")))
        .headers(headers.clone())
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(doubled.status(), StatusCode::BAD_REQUEST);

    let merged = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "top-price" }))
        .send()
        .await
        .unwrap();
    assert_eq!(merged.status(), StatusCode::BAD_REQUEST);

    let cart: Value = app
        .client
        .get(app.url("/cart"))
        .headers(headers)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["products"][0]["quantity"], 1);
    assert_eq!(decimal(&cart["final_price"]), Decimal::new(999_999_999, 2));
}

#[tokio::test]
async fn test_cart_total_must_fit_price_column() {
    let app = spawn_app().await;
    app.create_notebook("half-a", "6000000.00").await;
    app.create_notebook("half-b", "6000000.00").await;
    let headers = app.user_headers().await;

    let first = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "half-a" }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .client
        .post(app.url("/cart"))
        .headers(headers.clone())
        .json(&json!({ "kind": "notebook", "slug": "half-b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);

    let cart: Value = app
        .client
        .get(app.url("/cart"))
        .headers(headers)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["total_products"], 1);
    assert_eq!(decimal(&cart["final_price"]), Decimal::new(600_000_000, 2));
}

#[tokio::test]
async fn test_admin_cart_listing_matches_lines() {
    let app = spawn_app().await;
    app.create_notebook("list-nb", "12.30").await;
    app.create_smartphone("list-ph", "7.70", json!({})).await;

    app.client
        .post(app.url("/register"))
        .json(&json!({
            "username": "carol",
            "password": "carol-password",
            "first_name": "Carol",
            "last_name": "White",
            "phone": "555",
            "address": "Elm street 2",
        }))
        .send()
        .await
        .unwrap();
    let carol = common::bearer(&app.login("carol", "carol-password").await);

    for (headers, kind, slug, quantity) in [
        (app.user_headers().await, "notebook", "list-nb", 2),
        (app.user_headers().await, "smartphone", "list-ph", 1),
        (carol, "smartphone", "list-ph", 3),
    ] {
        let response = app
            .client
            .post(app.url("/cart"))
            .headers(headers)
            .json(&json!({ "kind": kind, "slug": slug, "quantity": quantity }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let carts: Value = app
        .client
        .get(app.url("/admin/cart"))
        .headers(app.admin_headers().await)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let carts = carts.as_array().unwrap();
    assert_eq!(carts.len(), 2);
    for cart in carts {
        let lines = cart["products"].as_array().unwrap();
        let sum: Decimal = lines.iter().map(|line| decimal(&line["final_price"])).sum();
        assert_eq!(cart["total_products"].as_u64().unwrap() as usize, lines.len());
        assert_eq!(decimal(&cart["final_price"]), sum);
    }
}
