// src/models.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub sku: String,
    pub price: f64,
    pub cost: Option<f64>,
    pub stock: i32,
    pub min_stock: i32,
    pub unit: String,
    pub status: String, // active | inactive | discontinued
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub status: String, // active | inactive
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pets: Vec<Pet>,
}

#[derive(Debug, Serialize)]
pub struct Pet {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Option<Uuid>,
    pub total_amount: f64,
    pub discount: f64,
    pub tax: f64,
    pub status: String,         // pending | processing | completed | cancelled
    pub payment_status: String, // unpaid | partial | paid | refunded
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub subtotal: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AppSettings {
    pub store_name: String,
    pub store_address: Option<String>,
    pub store_phone: Option<String>,
    pub low_stock_threshold: i32,
    pub alert_email_recipient: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            store_name: "Toko Roman".to_string(),
            store_address: None,
            store_phone: None,
            low_stock_threshold: 8,
            alert_email_recipient: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub tax_number: Option<String>,
    pub notes: Option<String>,
    pub status: String, // active | inactive
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
