// src/checkout.rs
//
// The POS cart flow: validate stock, price the lines, persist the order and
// its items, decrement stock, raise low-stock alerts. The steps are
// independent statements with no enclosing transaction; a failure mid-way
// leaves the earlier writes in place.

use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Row};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db;
use crate::notify::LowStockNotifier;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    #[serde(default)]
    pub discount: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderPayload {
    #[serde(default)]
    pub customer_id: Option<Uuid>,
    pub payment_method: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<CartItem>,
}

/// Per-operation configuration. The caller loads settings once per request
/// and passes the relevant values in; nothing here is read ambiently.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub low_stock_threshold: i32,
    pub alert_recipient: Option<String>,
}

#[derive(Debug)]
pub struct CreatedOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub total_amount: f64,
}

#[derive(Debug)]
pub enum CheckoutError {
    EmptyCart,
    InsufficientStock { product_name: String },
    Db(sqlx::Error),
}

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutError::EmptyCart => write!(f, "No items in order"),
            CheckoutError::InsufficientStock { product_name } => {
                write!(f, "Insufficient stock for product {product_name}")
            }
            CheckoutError::Db(e) => write!(f, "{e}"),
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(value: sqlx::Error) -> Self {
        Self::Db(value)
    }
}

/// `max(0, unit_price * quantity - discount)` — a line never goes negative,
/// even when the discount exceeds the line amount.
pub fn line_subtotal(unit_price: f64, quantity: i32, discount: f64) -> f64 {
    (unit_price * quantity as f64 - discount).max(0.0)
}

/// `ORD-<year>-<6 trailing digits of the millisecond timestamp>`.
/// Uniqueness is best-effort; there is no collision check.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!("ORD-{}-{:06}", now.year(), now.timestamp_millis() % 1_000_000)
}

pub async fn create_order_with_items(
    pool: &PgPool,
    notifier: &dyn LowStockNotifier,
    config: &CheckoutConfig,
    payload: &CreateOrderPayload,
) -> Result<CreatedOrder, CheckoutError> {
    if payload.items.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    // Stock snapshot for the distinct products in the cart. Unknown ids
    // count as stock 0.
    let mut product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();

    let stock_map = db::fetch_stock_map(pool, &product_ids).await?;

    for item in &payload.items {
        let available = stock_map.get(&item.product_id).copied().unwrap_or(0);
        if item.quantity > available {
            return Err(CheckoutError::InsufficientStock {
                product_name: item.product_name.clone(),
            });
        }
    }

    let subtotals: Vec<f64> = payload
        .items
        .iter()
        .map(|i| line_subtotal(i.unit_price, i.quantity, i.discount.unwrap_or(0.0)))
        .collect();
    let total_amount: f64 = subtotals.iter().sum();

    let order_number = generate_order_number(Utc::now());

    // Header first; its id keys the item batch. Cart orders are completed
    // and paid immediately, with order-level discount/tax zeroed.
    let row = sqlx::query(
        r#"INSERT INTO orders
               (order_number, customer_id, total_amount, discount, tax,
                status, payment_status, payment_method, notes)
           VALUES ($1, $2, $3, 0, 0, 'completed', 'paid', $4, $5)
           RETURNING id"#,
    )
    .bind(&order_number)
    .bind(payload.customer_id)
    .bind(total_amount)
    .bind(&payload.payment_method)
    .bind(&payload.notes)
    .fetch_one(pool)
    .await?;
    let order_id: Uuid = row.get("id");

    // All items in one batch. A failure here leaves the header behind.
    let item_product_ids: Vec<Uuid> = payload.items.iter().map(|i| i.product_id).collect();
    let product_names: Vec<String> = payload
        .items
        .iter()
        .map(|i| i.product_name.clone())
        .collect();
    let quantities: Vec<i32> = payload.items.iter().map(|i| i.quantity).collect();
    let unit_prices: Vec<f64> = payload.items.iter().map(|i| i.unit_price).collect();

    sqlx::query(
        r#"INSERT INTO order_items
               (order_id, product_id, product_name, quantity, unit_price, subtotal)
           SELECT $1, product_id, product_name, quantity, unit_price, subtotal
           FROM UNNEST($2::uuid[], $3::text[], $4::int4[], $5::float8[], $6::float8[])
                AS t(product_id, product_name, quantity, unit_price, subtotal)"#,
    )
    .bind(order_id)
    .bind(&item_product_ids)
    .bind(&product_names)
    .bind(&quantities)
    .bind(&unit_prices)
    .bind(&subtotals)
    .execute(pool)
    .await?;

    // Decrement stock line by line against the snapshot. The first failed
    // write returns immediately; earlier lines stay decremented.
    for item in &payload.items {
        let snapshot = stock_map.get(&item.product_id).copied().unwrap_or(0);
        let new_stock = snapshot - item.quantity;
        db::set_product_stock(pool, item.product_id, new_stock).await?;

        if new_stock <= config.low_stock_threshold {
            if let Err(e) = notifier
                .notify_low_stock(&item.product_name, new_stock, config.alert_recipient.as_deref())
                .await
            {
                log::error!("low stock notification failed for {}: {e}", item.product_name);
            }
        }
    }

    Ok(CreatedOrder {
        order_id,
        order_number,
        total_amount,
    })
}
