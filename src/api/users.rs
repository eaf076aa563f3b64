// src/api/users.rs

use actix_web::{delete, get, post, web, HttpResponse, Responder};
use bcrypt::{hash, DEFAULT_COST};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use crate::models::User;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[get("/users")]
pub async fn list_users(state: web::Data<AppState>) -> impl Responder {
    let rows = match sqlx::query(
        r#"SELECT id, username, email, created_at, last_sign_in_at
           FROM users
           ORDER BY created_at DESC"#,
    )
    .fetch_all(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("list_users db error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let users: Vec<User> = rows
        .into_iter()
        .map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
            email: r.get("email"),
            created_at: r.get("created_at"),
            last_sign_in_at: r.get("last_sign_in_at"),
        })
        .collect();

    HttpResponse::Ok().json(users)
}

#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: web::Json<CreateUserRequest>,
) -> impl Responder {
    let password_hash = match hash(&payload.password, DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            log::error!("bcrypt hash error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let row = match sqlx::query(
        r#"INSERT INTO users (username, email, password_hash)
           VALUES ($1, $2, $3)
           RETURNING id"#,
    )
    .bind(payload.username.as_deref())
    .bind(&payload.email)
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("create_user db error: {e}");
            return HttpResponse::BadRequest().json(json!({
                "error": "user already exists or invalid data"
            }));
        }
    };

    let user_id: Uuid = row.get("id");
    HttpResponse::Ok().json(json!({"success": true, "user_id": user_id}))
}

#[delete("/users/{id}")]
pub async fn delete_user(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let id = path.into_inner();

    match sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("delete_user error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
