use std::sync::Arc;

use actix_web::test::TestRequest;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use petshop_pos::api::orders::create_pos_order;

mod support;

async fn insert_product(pool: &PgPool, name: &str, price: f64, stock: i32) -> Uuid {
    let suffix = Uuid::new_v4().to_string();
    sqlx::query(
        r#"INSERT INTO products (name, sku, price, stock)
           VALUES ($1, $2, $3, $4)
           RETURNING id"#,
    )
    .bind(name)
    .bind(format!("SKU-{suffix}"))
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("insert product")
    .get("id")
}

async fn product_stock(pool: &PgPool, id: Uuid) -> i32 {
    sqlx::query("SELECT stock FROM products WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("select stock")
        .get("stock")
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query("SELECT COUNT(*) AS n FROM orders")
        .fetch_one(pool)
        .await
        .expect("count orders")
        .get("n")
}

#[actix_web::test]
async fn pos_order_decrements_stock_and_sends_one_low_stock_alert() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let product_id = insert_product(pool, "Food", 10000.0, 10).await;

    let notifier = Arc::new(support::RecordingNotifier::default());
    let state = web::Data::new(support::build_state(pool.clone(), notifier.clone()));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "cash",
        "items": [{
            "product_id": product_id,
            "product_name": "Food",
            "quantity": 3,
            "unit_price": 10000.0,
            "discount": 0.0
        }]
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    let order_id = body["order_id"].as_str().expect("order_id in response");
    let order_number = body["order_number"].as_str().expect("order_number");
    assert!(order_number.starts_with("ORD-"));

    // header: computed total, completed/paid, zeroed order-level discount/tax
    let order_row = sqlx::query(
        r#"SELECT total_amount, discount, tax, status, payment_status
           FROM orders WHERE id = $1::uuid"#,
    )
    .bind(order_id)
    .fetch_one(pool)
    .await
    .expect("select order");
    assert_eq!(order_row.get::<f64, _>("total_amount"), 30000.0);
    assert_eq!(order_row.get::<f64, _>("discount"), 0.0);
    assert_eq!(order_row.get::<f64, _>("tax"), 0.0);
    assert_eq!(order_row.get::<String, _>("status"), "completed");
    assert_eq!(order_row.get::<String, _>("payment_status"), "paid");

    // one item with the computed subtotal
    let item_row = sqlx::query(
        r#"SELECT product_name, quantity, unit_price, subtotal
           FROM order_items WHERE order_id = $1::uuid"#,
    )
    .bind(order_id)
    .fetch_one(pool)
    .await
    .expect("select order item");
    assert_eq!(item_row.get::<String, _>("product_name"), "Food");
    assert_eq!(item_row.get::<i32, _>("quantity"), 3);
    assert_eq!(item_row.get::<f64, _>("subtotal"), 30000.0);

    // stock 10 -> 7, which is at or below the default threshold of 8
    assert_eq!(product_stock(pool, product_id).await, 7);

    let calls = notifier.calls.lock().await;
    assert_eq!(calls.as_slice(), &[("Food".to_string(), 7)]);
}

#[actix_web::test]
async fn pos_order_rejects_insufficient_stock_without_writes() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let product_id = insert_product(pool, "Shampoo", 5000.0, 2).await;

    let notifier = Arc::new(support::RecordingNotifier::default());
    let state = web::Data::new(support::build_state(pool.clone(), notifier.clone()));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "cash",
        "items": [{
            "product_id": product_id,
            "product_name": "Shampoo",
            "quantity": 5,
            "unit_price": 5000.0
        }]
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"].as_str().expect("error message"),
        "Insufficient stock for product Shampoo"
    );

    assert_eq!(order_count(pool).await, 0);
    assert_eq!(product_stock(pool, product_id).await, 2);
    assert!(notifier.calls.lock().await.is_empty());
}

#[actix_web::test]
async fn pos_order_rejects_empty_cart() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let notifier = Arc::new(support::RecordingNotifier::default());
    let state = web::Data::new(support::build_state(pool.clone(), notifier));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "cash",
        "items": []
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"].as_str().expect("error message"), "No items in order");

    assert_eq!(order_count(pool).await, 0);

    // rejected before any store interaction: not even the settings
    // singleton got lazily created
    let settings_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM settings")
        .fetch_one(pool)
        .await
        .expect("count settings")
        .get("n");
    assert_eq!(settings_count, 0);
}

#[actix_web::test]
async fn pos_order_clamps_line_discounts_in_totals() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let food_id = insert_product(pool, "Food", 10000.0, 50).await;
    let toy_id = insert_product(pool, "Toy", 5000.0, 50).await;

    let notifier = Arc::new(support::RecordingNotifier::default());
    let state = web::Data::new(support::build_state(pool.clone(), notifier));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "card",
        "items": [
            {
                "product_id": food_id,
                "product_name": "Food",
                "quantity": 2,
                "unit_price": 10000.0,
                "discount": 5000.0
            },
            {
                "product_id": toy_id,
                "product_name": "Toy",
                "quantity": 1,
                "unit_price": 5000.0,
                "discount": 10000.0
            }
        ]
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    let order_id = body["order_id"].as_str().expect("order_id");

    let order_row = sqlx::query("SELECT total_amount FROM orders WHERE id = $1::uuid")
        .bind(order_id)
        .fetch_one(pool)
        .await
        .expect("select order");
    assert_eq!(order_row.get::<f64, _>("total_amount"), 15000.0);

    let toy_subtotal: f64 = sqlx::query(
        r#"SELECT subtotal FROM order_items
           WHERE order_id = $1::uuid AND product_name = 'Toy'"#,
    )
    .bind(order_id)
    .fetch_one(pool)
    .await
    .expect("select toy item")
    .get("subtotal");
    assert_eq!(toy_subtotal, 0.0);

    assert_eq!(product_stock(pool, food_id).await, 48);
    assert_eq!(product_stock(pool, toy_id).await, 49);
}

#[actix_web::test]
async fn notification_failure_does_not_block_the_order() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let product_id = insert_product(pool, "Litter", 20000.0, 5).await;

    let state = web::Data::new(support::build_state(
        pool.clone(),
        Arc::new(support::FailingNotifier),
    ));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "cash",
        "items": [{
            "product_id": product_id,
            "product_name": "Litter",
            "quantity": 1,
            "unit_price": 20000.0
        }]
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(product_stock(pool, product_id).await, 4);
}

#[actix_web::test]
async fn no_alert_when_stock_stays_above_threshold() {
    let test_db = support::init_test_db().await;
    let pool = &test_db.pool;

    let product_id = insert_product(pool, "Cage", 150000.0, 100).await;

    let notifier = Arc::new(support::RecordingNotifier::default());
    let state = web::Data::new(support::build_state(pool.clone(), notifier.clone()));
    let app = test::init_service(App::new().app_data(state.clone()).service(create_pos_order)).await;

    let payload = json!({
        "payment_method": "cash",
        "items": [{
            "product_id": product_id,
            "product_name": "Cage",
            "quantity": 1,
            "unit_price": 150000.0
        }]
    });

    let req = TestRequest::post()
        .uri("/orders/pos")
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    assert_eq!(product_stock(pool, product_id).await, 99);
    assert!(notifier.calls.lock().await.is_empty());
}
