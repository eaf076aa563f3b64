// src/api/suppliers.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use crate::models::Supplier;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub tax_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[get("/suppliers")]
pub async fn list_suppliers(state: web::Data<AppState>) -> impl Responder {
    let rows = match sqlx::query(
        r#"SELECT id, name, contact_person, email, phone, address, city, state,
                  zip_code, tax_number, notes, status, created_at, updated_at
           FROM suppliers
           ORDER BY created_at DESC"#,
    )
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list_suppliers db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let suppliers: Vec<Supplier> = rows
        .into_iter()
        .map(|r| Supplier {
            id: r.get("id"),
            name: r.get("name"),
            contact_person: r.get("contact_person"),
            email: r.get("email"),
            phone: r.get("phone"),
            address: r.get("address"),
            city: r.get("city"),
            state: r.get("state"),
            zip_code: r.get("zip_code"),
            tax_number: r.get("tax_number"),
            notes: r.get("notes"),
            status: r.get("status"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
        .collect();

    HttpResponse::Ok().json(suppliers)
}

#[post("/suppliers")]
pub async fn create_supplier(
    state: web::Data<AppState>,
    payload: web::Json<SupplierInput>,
) -> impl Responder {
    let result = sqlx::query(
        r#"INSERT INTO suppliers
               (name, contact_person, email, phone, address, city, state,
                zip_code, tax_number, notes, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
           RETURNING id"#,
    )
    .bind(&payload.name)
    .bind(&payload.contact_person)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.zip_code)
    .bind(&payload.tax_number)
    .bind(&payload.notes)
    .bind(payload.status.as_deref().unwrap_or("active"))
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(row) => {
            let id: Uuid = row.get("id");
            HttpResponse::Ok().json(json!({"success": true, "id": id}))
        }
        Err(e) => {
            log::error!("create_supplier error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[put("/suppliers/{id}")]
pub async fn update_supplier(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<SupplierInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE suppliers
           SET name = $1, contact_person = $2, email = $3, phone = $4, address = $5,
               city = $6, state = $7, zip_code = $8, tax_number = $9, notes = $10,
               status = $11, updated_at = NOW()
           WHERE id = $12"#,
    )
    .bind(&payload.name)
    .bind(&payload.contact_person)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.zip_code)
    .bind(&payload.tax_number)
    .bind(&payload.notes)
    .bind(payload.status.as_deref().unwrap_or("active"))
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_supplier error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[delete("/suppliers/{id}")]
pub async fn delete_supplier(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM suppliers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_supplier error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
