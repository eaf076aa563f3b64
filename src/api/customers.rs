// src/api/customers.rs

use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct CustomerInput {
    pub name: String,
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
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PetInput {
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[get("/customers")]
pub async fn list_customers(state: web::Data<AppState>) -> impl Responder {
    match db::list_customers_with_pets(&state.pool).await {
        Ok(customers) => HttpResponse::Ok().json(customers),
        Err(e) => {
            log::error!("list_customers db error: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Active customers only, as `{id, name, email}` for the POS select.
#[get("/customers/select")]
pub async fn customers_for_select(state: web::Data<AppState>) -> impl Responder {
    let rows = match sqlx::query(
        r#"SELECT id, name, email FROM customers
           WHERE status = 'active'
           ORDER BY created_at DESC"#,
    )
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("customers_for_select db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let customers: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|r| {
            json!({
                "id": r.get::<Uuid, _>("id"),
                "name": r.get::<String, _>("name"),
                "email": r.get::<Option<String>, _>("email"),
            })
        })
        .collect();

    HttpResponse::Ok().json(customers)
}

#[post("/customers")]
pub async fn create_customer(
    state: web::Data<AppState>,
    payload: web::Json<CustomerInput>,
) -> impl Responder {
    let result = sqlx::query(
        r#"INSERT INTO customers
               (name, email, phone, address, city, state, zip_code, notes, status)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
           RETURNING id"#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.zip_code)
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
            log::error!("create_customer error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[put("/customers/{id}")]
pub async fn update_customer(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<CustomerInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE customers
           SET name = $1, email = $2, phone = $3, address = $4, city = $5,
               state = $6, zip_code = $7, notes = $8, status = $9, updated_at = NOW()
           WHERE id = $10"#,
    )
    .bind(&payload.name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.zip_code)
    .bind(&payload.notes)
    .bind(payload.status.as_deref().unwrap_or("active"))
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_customer error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[delete("/customers/{id}")]
pub async fn delete_customer(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_customer error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[post("/customers/{id}/pets")]
pub async fn create_pet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<PetInput>,
) -> impl Responder {
    let customer_id = path.into_inner();

    let result = sqlx::query(
        r#"INSERT INTO pets (customer_id, name, species, breed, age, weight, notes)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING id"#,
    )
    .bind(customer_id)
    .bind(&payload.name)
    .bind(&payload.species)
    .bind(&payload.breed)
    .bind(payload.age)
    .bind(payload.weight)
    .bind(&payload.notes)
    .fetch_one(&state.pool)
    .await;

    match result {
        Ok(row) => {
            let id: Uuid = row.get("id");
            HttpResponse::Ok().json(json!({"success": true, "id": id}))
        }
        Err(e) => {
            log::error!("create_pet error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[put("/pets/{id}")]
pub async fn update_pet(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: web::Json<PetInput>,
) -> impl Responder {
    let id = path.into_inner();

    let result = sqlx::query(
        r#"UPDATE pets
           SET name = $1, species = $2, breed = $3, age = $4, weight = $5,
               notes = $6, updated_at = NOW()
           WHERE id = $7"#,
    )
    .bind(&payload.name)
    .bind(&payload.species)
    .bind(&payload.breed)
    .bind(payload.age)
    .bind(payload.weight)
    .bind(&payload.notes)
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_pet error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}

#[delete("/pets/{id}")]
pub async fn delete_pet(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM pets WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_pet error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
