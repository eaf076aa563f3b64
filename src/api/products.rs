// src/api/products.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{db, AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub sku: String,
    pub price: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub min_stock: Option<i32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses((status = 200, body = [crate::models::Product])),
    tag = "products"
)]
#[get("/products")]
pub async fn list_products(state: web::Data<AppState>) -> impl Responder {
    match db::list_products(&state.pool).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            log::error!("list_products db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/categories")]
pub async fn list_categories(state: web::Data<AppState>) -> impl Responder {
    match db::list_categories(&state.pool).await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => {
            log::error!("list_categories db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductInput,
    responses(
        (status = 200, description = "Created"),
        (status = 400, description = "SKU already in use")
    ),
    tag = "products"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<AppState>,
    payload: web::Json<ProductInput>,
) -> impl Responder {
    // SKU pre-check before inserting
    let existing = match sqlx::query("SELECT id FROM products WHERE sku = $1")
        .bind(&payload.sku)
        .fetch_optional(&state.pool)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("create_product sku check error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if existing.is_some() {
        return HttpResponse::BadRequest().json(json!({
            "error": "SKU sudah digunakan. Silakan gunakan SKU yang lain."
        }));
    }

    let result = sqlx::query(
        r#"INSERT INTO products
               (name, description, category_id, sku, price, cost, stock, min_stock,
                unit, status, expiry_date)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING id"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.category_id)
    .bind(&payload.sku)
    .bind(payload.price)
    .bind(payload.cost)
    .bind(payload.stock.unwrap_or(0))
    .bind(payload.min_stock.unwrap_or(0))
    .bind(payload.unit.as_deref().unwrap_or("unit"))
    .bind(payload.status.as_deref().unwrap_or("active"))
    .bind(payload.expiry_date)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(row) => {
            let id: Uuid = row.get("id");
            HttpResponse::Ok().json(json!({"success": true, "id": id}))
        }
        Err(e) => {
            log::error!("create_product insert error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<ProductInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE products
           SET name = $1, description = $2, category_id = $3, sku = $4, price = $5,
               cost = $6, stock = $7, min_stock = $8, unit = $9, status = $10,
               expiry_date = $11, updated_at = NOW()
           WHERE id = $12"#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.category_id)
    .bind(&payload.sku)
    .bind(payload.price)
    .bind(payload.cost)
    .bind(payload.stock.unwrap_or(0))
    .bind(payload.min_stock.unwrap_or(0))
    .bind(payload.unit.as_deref().unwrap_or("unit"))
    .bind(payload.status.as_deref().unwrap_or("active"))
    .bind(payload.expiry_date)
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_product error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[delete("/products/{id}")]
pub async fn delete_product(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_product error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
