// src/api/settings.rs

use actix_web::{get, put, web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use sqlx::Row;
use uuid::Uuid;

use crate::{db, AppState};

#[derive(Debug, Deserialize)]
pub struct SettingsInput {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub store_address: Option<String>,
    #[serde(default)]
    pub store_phone: Option<String>,
    #[serde(default)]
    pub low_stock_threshold: Option<i32>,
    #[serde(default)]
    pub alert_email_recipient: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    responses((status = 200, description = "Store settings singleton")),
    tag = "settings"
)]
#[get("/settings")]
pub async fn get_settings(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(db::get_settings(&state.pool).await)
}

/// Partial update merged over the current row. The read also creates the
/// row when it is missing.
#[put("/settings")]
pub async fn update_settings(
    state: web::Data<AppState>,
    payload: web::Json<SettingsInput>,
) -> impl Responder {
    let current = db::get_settings(&state.pool).await;

    let merged_name = payload.store_name.clone().unwrap_or(current.store_name);
    let merged_address = payload.store_address.clone().or(current.store_address);
    let merged_phone = payload.store_phone.clone().or(current.store_phone);
    let merged_threshold = payload
        .low_stock_threshold
        .unwrap_or(current.low_stock_threshold);
    let merged_recipient = payload
        .alert_email_recipient
        .clone()
        .or(current.alert_email_recipient);

    let row = match sqlx::query("SELECT id FROM settings LIMIT 1")
        .fetch_optional(&state.pool)
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("update_settings select error: {e}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let Some(row) = row else {
        return HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": "settings row missing"
        }));
    };
    let id: Uuid = row.get("id");

    let result = sqlx::query(
        r#"UPDATE settings
           SET store_name = $1, store_address = $2, store_phone = $3,
               low_stock_threshold = $4, alert_email_recipient = $5,
               updated_at = NOW()
           WHERE id = $6"#,
    )
    .bind(&merged_name)
    .bind(&merged_address)
    .bind(&merged_phone)
    .bind(merged_threshold)
    .bind(&merged_recipient)
    .bind(id)
    .execute(&state.pool)
    .await;

    match result {
        Ok(_) => HttpResponse::Ok().json(json!({"success": true})),
        Err(e) => {
            log::error!("update_settings error: {e}");
            HttpResponse::BadRequest().json(json!({"success": false, "error": e.to_string()}))
        }
    }
}
