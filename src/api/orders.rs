// src/api/orders.rs

use std::collections::HashMap;

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use crate::checkout::{self, CheckoutConfig, CheckoutError, CreateOrderPayload};
use crate::models::{Order, OrderItem};
use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct CustomerRef {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Option<CustomerRef>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct OrderInput {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub total_amount: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    pub status: String,
    pub payment_status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

fn order_from_row(r: &sqlx::postgres::PgRow) -> Order {
    Order {
        id: r.get("id"),
        order_number: r.get("order_number"),
        customer_id: r.get("customer_id"),
        total_amount: r.get("total_amount"),
        discount: r.get("discount"),
        tax: r.get("tax"),
        status: r.get("status"),
        payment_status: r.get("payment_status"),
        payment_method: r.get("payment_method"),
        notes: r.get("notes"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

fn item_from_row(r: &sqlx::postgres::PgRow) -> OrderItem {
    OrderItem {
        id: r.get("id"),
        order_id: r.get("order_id"),
        product_id: r.get("product_id"),
        product_name: r.get("product_name"),
        quantity: r.get("quantity"),
        unit_price: r.get("unit_price"),
        subtotal: r.get("subtotal"),
        created_at: r.get("created_at"),
    }
}

/// The POS cart flow. Settings are loaded once here and passed into the
/// workflow as explicit config.
#[utoipa::path(
    post,
    path = "/api/orders/pos",
    request_body = CreateOrderPayload,
    responses(
        (status = 200, description = "Order created: {success, order_id, order_number}"),
        (status = 400, description = "Empty cart or insufficient stock: {success: false, error}")
    ),
    tag = "orders"
)]
#[post("/orders/pos")]
pub async fn create_pos_order(
    state: web::Data<AppState>,
    payload: web::Json<CreateOrderPayload>,
) -> impl Responder {
    // An empty cart is rejected before touching the store at all.
    if payload.items.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": CheckoutError::EmptyCart.to_string(),
        }));
    }

    let settings = db::get_settings(&state.pool).await;
    let config = CheckoutConfig {
        low_stock_threshold: settings.low_stock_threshold,
        alert_recipient: settings.alert_email_recipient,
    };

    match checkout::create_order_with_items(
        &state.pool,
        state.notifier.as_ref(),
        &config,
        &payload,
    )
    .await
    {
        Ok(created) => HttpResponse::Ok().json(json!({
            "success": true,
            "order_id": created.order_id,
            "order_number": created.order_number,
        })),
        Err(e @ (CheckoutError::EmptyCart | CheckoutError::InsufficientStock { .. })) => {
            HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
        Err(CheckoutError::Db(e)) => {
            log::error!("create_pos_order db error: {e}");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string(),
            }))
        }
    }
}

#[get("/orders")]
pub async fn list_orders(state: web::Data<AppState>) -> impl Responder {
    let order_rows = match sqlx::query(
        r#"SELECT o.id, o.order_number, o.customer_id, o.total_amount, o.discount,
                  o.tax, o.status, o.payment_status, o.payment_method, o.notes,
                  o.created_at, o.updated_at,
                  c.name AS customer_name, c.email AS customer_email
           FROM orders o
           LEFT JOIN customers c ON c.id = o.customer_id
           ORDER BY o.created_at DESC"#,
    )
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list_orders db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut orders: Vec<OrderWithItems> = order_rows
        .iter()
        .map(|r| {
            let order = order_from_row(r);
            let customer = order.customer_id.map(|id| CustomerRef {
                id,
                name: r.get("customer_name"),
                email: r.get("customer_email"),
            });
            OrderWithItems {
                order,
                customer,
                items: Vec::new(),
            }
        })
        .collect();

    if orders.is_empty() {
        return HttpResponse::Ok().json(orders);
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.order.id).collect();
    let item_rows = match sqlx::query(
        r#"SELECT id, order_id, product_id, product_name, quantity, unit_price,
                  subtotal, created_at
           FROM order_items
           WHERE order_id = ANY($1)"#,
    )
    .bind(&order_ids)
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list_orders items db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in &item_rows {
        let item = item_from_row(row);
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
        if let Some(items) = by_order.remove(&order.order.id) {
            order.items = items;
        }
    }

    HttpResponse::Ok().json(orders)
}

#[get("/orders/{id}")]
pub async fn get_order(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    let row = match sqlx::query(
        r#"SELECT o.id, o.order_number, o.customer_id, o.total_amount, o.discount,
                  o.tax, o.status, o.payment_status, o.payment_method, o.notes,
                  o.created_at, o.updated_at,
                  c.name AS customer_name, c.email AS customer_email,
                  c.phone AS customer_phone, c.address AS customer_address
           FROM orders o
           LEFT JOIN customers c ON c.id = o.customer_id
           WHERE o.id = $1"#,
    )
    .bind(id)
    .fetch_optional(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("get_order db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(row) = row else {
        return HttpResponse::NotFound().json(json!({"error": "order not found"}));
    };

    let item_rows = match sqlx::query(
        r#"SELECT oi.id, oi.order_id, oi.product_id, oi.product_name, oi.quantity,
                  oi.unit_price, oi.subtotal, oi.created_at,
                  p.sku AS product_sku
           FROM order_items oi
           LEFT JOIN products p ON p.id = oi.product_id
           WHERE oi.order_id = $1"#,
    )
    .bind(id)
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("get_order items db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let order = order_from_row(&row);
    let customer = order.customer_id.map(|customer_id| {
        json!({
            "id": customer_id,
            "name": row.get::<String, _>("customer_name"),
            "email": row.get::<Option<String>, _>("customer_email"),
            "phone": row.get::<Option<String>, _>("customer_phone"),
            "address": row.get::<Option<String>, _>("customer_address"),
        })
    });
    let items: Vec<serde_json::Value> = item_rows
        .iter()
        .map(|r| {
            let item = item_from_row(r);
            json!({
                "id": item.id,
                "order_id": item.order_id,
                "product_id": item.product_id,
                "product_name": item.product_name,
                "product_sku": r.get::<Option<String>, _>("product_sku"),
                "quantity": item.quantity,
                "unit_price": item.unit_price,
                "subtotal": item.subtotal,
                "created_at": item.created_at,
            })
        })
        .collect();

    HttpResponse::Ok().json(json!({
        "order": order,
        "customer": customer,
        "items": items,
    }))
}

/// Manual back-office entry: the caller supplies totals and statuses as-is,
/// nothing is computed.
#[post("/orders")]
pub async fn create_order(
    state: web::Data<AppState>,
    payload: web::Json<OrderInput>,
) -> impl Responder {
    let order_number = checkout::generate_order_number(Utc::now());

    let result = sqlx::query(
        r#"INSERT INTO orders
               (order_number, customer_id, total_amount, discount, tax,
                status, payment_status, payment_method, notes)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
           RETURNING id"#,
    )
    .bind(&order_number)
    .bind(payload.customer_id)
    .bind(payload.total_amount)
    .bind(payload.discount.unwrap_or(0.0))
    .bind(payload.tax.unwrap_or(0.0))
    .bind(&payload.status)
    .bind(&payload.payment_status)
    .bind(&payload.payment_method)
    .bind(&payload.notes)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(row) => {
            let id: Uuid = row.get("id");
            HttpResponse::Ok().json(json!({
                "success": true,
                "order_id": id,
                "order_number": order_number,
            }))
        }
        Err(e) => {
            log::error!("create_order error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[put("/orders/{id}")]
pub async fn update_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<OrderInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE orders
           SET customer_id = $1, total_amount = $2, discount = $3, tax = $4,
               status = $5, payment_status = $6, payment_method = $7, notes = $8,
               updated_at = NOW()
           WHERE id = $9"#,
    )
    .bind(payload.customer_id)
    .bind(payload.total_amount)
    .bind(payload.discount.unwrap_or(0.0))
    .bind(payload.tax.unwrap_or(0.0))
    .bind(&payload.status)
    .bind(&payload.payment_status)
    .bind(&payload.payment_method)
    .bind(&payload.notes)
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_order error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

/// Any status may move to any other; there is no transition graph.
#[put("/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<StatusInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.status)
        .bind(id)
        .execute(&state.pool)
        .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_order_status error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[delete("/orders/{id}")]
pub async fn delete_order(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_order error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
