// src/api/dashboard.rs

use std::collections::BTreeMap;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

use crate::AppState;

// The dashboard uses a fixed threshold; min_stock is ignored here.
const LOW_STOCK_THRESHOLD: i32 = 8;

#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
}

#[derive(Debug, Serialize)]
pub struct Activity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String, // order | product | customer
    pub description: String,
    pub time: String,
    pub status: String, // new | warning | success | info
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub total_products: i64,
    pub low_stock_items: i64,
    pub low_stock_products: Vec<LowStockProduct>,
    pub total_customers: i64,
    pub recent_activities: Vec<Activity>,
}

#[derive(Debug, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub revenue: f64,
    pub profit: f64,
}

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, description = "Aggregated store stats")),
    tag = "dashboard"
)]
#[get("/dashboard/stats")]
pub async fn dashboard_stats(state: web::Data<AppState>) -> impl Responder {
    let pool = &state.pool;

    // Independent read-only aggregates, issued concurrently.
    let result = tokio::try_join!(
        async {
            sqlx::query("SELECT COUNT(*) AS n FROM orders")
                .fetch_one(pool)
                .await
        },
        async {
            sqlx::query(
                "SELECT COUNT(*) AS n FROM orders WHERE status IN ('pending', 'processing')",
            )
            .fetch_one(pool)
            .await
        },
        async {
            sqlx::query(
                r#"SELECT COALESCE(SUM(total_amount), 0)::float8 AS revenue
                   FROM orders
                   WHERE payment_status IN ('paid', 'partial')"#,
            )
            .fetch_one(pool)
            .await
        },
        async {
            sqlx::query("SELECT id, name, stock FROM products")
                .fetch_all(pool)
                .await
        },
        async {
            sqlx::query("SELECT COUNT(*) AS n FROM customers")
                .fetch_one(pool)
                .await
        },
        async {
            sqlx::query(
                r#"SELECT id, order_number, created_at, status
                   FROM orders ORDER BY created_at DESC LIMIT 5"#,
            )
            .fetch_all(pool)
            .await
        },
        async {
            sqlx::query(
                r#"SELECT id, name, created_at
                   FROM customers ORDER BY created_at DESC LIMIT 3"#,
            )
            .fetch_all(pool)
            .await
        },
    );

    let (orders_row, pending_row, revenue_row, product_rows, customers_row, recent_orders, recent_customers) =
        match result {
            Ok(r) => r,
            Err(e) => {
                log::error!("dashboard_stats db error: {e}");
                return HttpResponse::InternalServerError().finish();
            }
        };

    let mut low_stock_products = Vec::new();
    for r in &product_rows {
        let stock: i32 = r.get("stock");
        if stock <= LOW_STOCK_THRESHOLD {
            low_stock_products.push(LowStockProduct {
                id: r.get("id"),
                name: r.get("name"),
                stock,
            });
        }
    }

    let mut activities = Vec::new();
    for r in &recent_orders {
        let id: Uuid = r.get("id");
        let order_number: String = r.get("order_number");
        let status: String = r.get("status");
        let created_at: DateTime<Utc> = r.get("created_at");
        activities.push(Activity {
            id: format!("order-{id}"),
            kind: "order".to_string(),
            description: format!("Order #{order_number} is {status}"),
            time: created_at.date_naive().to_string(),
            status: if status == "completed" { "success" } else { "new" }.to_string(),
        });
    }
    for r in &recent_customers {
        let id: Uuid = r.get("id");
        let name: String = r.get("name");
        let created_at: DateTime<Utc> = r.get("created_at");
        activities.push(Activity {
            id: format!("customer-{id}"),
            kind: "customer".to_string(),
            description: format!("New customer: {name}"),
            time: created_at.date_naive().to_string(),
            status: "info".to_string(),
        });
    }
    for p in low_stock_products.iter().take(2) {
        activities.push(Activity {
            id: format!("product-low-{}", p.id),
            kind: "product".to_string(),
            description: format!("Low stock: {} ({} left)", p.name, p.stock),
            time: "Just now".to_string(),
            status: "warning".to_string(),
        });
    }
    activities.truncate(6);

    HttpResponse::Ok().json(DashboardStats {
        total_revenue: revenue_row.get("revenue"),
        total_orders: orders_row.get("n"),
        pending_orders: pending_row.get("n"),
        total_products: product_rows.len() as i64,
        low_stock_items: low_stock_products.len() as i64,
        low_stock_products,
        total_customers: customers_row.get("n"),
        recent_activities: activities,
    })
}

/// Daily revenue and profit over the last 30 days, empty days included.
/// Profit is revenue minus product cost per unit sold.
#[get("/dashboard/charts")]
pub async fn dashboard_charts(state: web::Data<AppState>) -> impl Responder {
    let thirty_days_ago = Utc::now() - Duration::days(30);

    let rows = match sqlx::query(
        r#"SELECT o.created_at, oi.quantity, oi.unit_price, p.cost
           FROM orders o
           JOIN order_items oi ON oi.order_id = o.id
           LEFT JOIN products p ON p.id = oi.product_id
           WHERE o.created_at >= $1
             AND o.payment_status IN ('paid', 'partial')
           ORDER BY o.created_at ASC"#,
    )
    .bind(thirty_days_ago)
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("dashboard_charts db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut daily: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    let today = Utc::now().date_naive();
    for i in 0..30 {
        daily.insert(today - Duration::days(i), (0.0, 0.0));
    }

    for r in &rows {
        let created_at: DateTime<Utc> = r.get("created_at");
        let quantity: i32 = r.get("quantity");
        let unit_price: f64 = r.get("unit_price");
        let cost: Option<f64> = r.get("cost");

        let revenue = unit_price * quantity as f64;
        let item_cost = cost.unwrap_or(0.0) * quantity as f64;

        let entry = daily.entry(created_at.date_naive()).or_insert((0.0, 0.0));
        entry.0 += revenue;
        entry.1 += revenue - item_cost;
    }

    let points: Vec<ChartPoint> = daily
        .into_iter()
        .map(|(date, (revenue, profit))| ChartPoint {
            date,
            revenue,
            profit,
        })
        .collect();

    HttpResponse::Ok().json(points)
}
