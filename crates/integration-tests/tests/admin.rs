//! Admin console flows against the fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use maoyang_core::OrderStatus;
use maoyang_integration_tests::{
    FakeBackend, admin_login, browser, location, order_row, spawn_admin,
};
use reqwest::StatusCode;

#[tokio::test]
async fn test_login_required() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;

    let response = browser().get(format!("{site}/orders")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_product_list_includes_hidden_and_filters() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let html = client.get(format!("{site}/products")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Hidden Tea"));

    let html = client
        .get(format!("{site}/products"))
        .query(&[("q", "MANGO")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Mango Smoothie"));
    assert!(!html.contains("Lime Soda"));
}

#[tokio::test]
async fn test_product_list_shows_live_stock() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let html = client.get(format!("{site}/products")).send().await.unwrap().text().await.unwrap();
    assert!(!html.contains("<td>37</td>"));

    backend.data().products[0].quantity_in_stock = 37;
    let html = client.get(format!("{site}/products")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("<td>37</td>"));
}

#[tokio::test]
async fn test_order_table_resolves_names() {
    let backend = FakeBackend::spawn().await;
    {
        let mut data = backend.data();
        data.orders.push(order_row("ORD-1", 1, 1, 2, 13000, OrderStatus::Pending));
        data.orders.push(order_row("ORD-2", 9, 42, 1, 4000, OrderStatus::Sending));
    }
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let html = client.get(format!("{site}/orders")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Nok"));
    assert!(html.contains("Mango Smoothie"));
    // member 9 and product 42 do not exist
    assert!(html.contains("Unknown"));

    let html = client
        .get(format!("{site}/orders"))
        .query(&[("q", "ORD-2")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!html.contains("ORD-1"));
}

#[tokio::test]
async fn test_status_change_and_final_state() {
    let backend = FakeBackend::spawn().await;
    backend
        .data()
        .orders
        .push(order_row("ORD-1", 1, 1, 2, 13000, OrderStatus::Pending));
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let response = client
        .post(format!("{site}/orders/ORD-1/status"))
        .form(&[("status", "sending")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/orders?success=status_saved");
    assert_eq!(backend.data().orders[0].status, OrderStatus::Sending);

    let response = client
        .post(format!("{site}/orders/ORD-1/status"))
        .form(&[("status", "pending")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/orders?error=status_final");
    assert_eq!(backend.data().orders[0].status, OrderStatus::Sending);
}

#[tokio::test]
async fn test_add_product_with_announcement() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let response = client
        .post(format!("{site}/products"))
        .form(&[
            ("name", "Passion Fizz"),
            ("description", "Sparkling passion fruit"),
            ("price", "55"),
            ("quantity_in_stock", "20"),
            ("is_visible", "on"),
            ("ingredient", "1"),
            ("announce", "on"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products?success=product_added");

    let data = backend.data();
    assert_eq!(data.added_products.len(), 1);
    assert_eq!(data.added_products[0]["ingredients"], serde_json::json!([1]));
    assert_eq!(data.sent_notifications.len(), 1);
    assert_eq!(data.sent_notifications[0]["sendToAll"], true);
}

#[tokio::test]
async fn test_invalid_product_rerenders_form() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let html = client
        .post(format!("{site}/products"))
        .form(&[("name", "Bad Price"), ("price", "-4")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("Price must be a number of at least 0."));
    assert!(html.contains("Bad Price"));
    assert!(backend.data().added_products.is_empty());
}

#[tokio::test]
async fn test_ingredients_and_notifications() {
    let backend = FakeBackend::spawn().await;
    let site = spawn_admin(&backend).await;
    let client = browser();
    admin_login(&client, &site).await;

    let response = client
        .post(format!("{site}/ingredients"))
        .form(&[("name", "   ")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/ingredients?error=ingredient_name");

    client
        .post(format!("{site}/ingredients"))
        .form(&[("name", "Passion fruit")])
        .send()
        .await
        .unwrap();
    let html = client.get(format!("{site}/ingredients")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Passion fruit"));

    let response = client
        .post(format!("{site}/notifications"))
        .form(&[("title", "Hello"), ("message", "Order shipped"), ("user_id", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/notifications/new?success=notification_sent");
    assert_eq!(backend.data().sent_notifications[0]["userId"], 1);
}
