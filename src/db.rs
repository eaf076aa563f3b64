// src/db.rs

use std::collections::HashMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AppSettings, Category, Customer, Pet, Product};

pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    let rows = sqlx::query(
        r#"SELECT p.id, p.name, p.description, p.category_id, c.name AS category_name,
                  p.sku, p.price, p.cost, p.stock, p.min_stock, p.unit, p.status,
                  p.expiry_date, p.created_at, p.updated_at
           FROM products p
           LEFT JOIN categories c ON c.id = p.category_id
           ORDER BY p.created_at DESC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| Product {
            id: r.get("id"),
            name: r.get("name"),
            description: r.get("description"),
            category_id: r.get("category_id"),
            category_name: r.get("category_name"),
            sku: r.get("sku"),
            price: r.get("price"),
            cost: r.get("cost"),
            stock: r.get("stock"),
            min_stock: r.get("min_stock"),
            unit: r.get("unit"),
            status: r.get("status"),
            expiry_date: r.get("expiry_date"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        })
        .collect())
}

pub async fn list_categories(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, name FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| Category {
            id: r.get("id"),
            name: r.get("name"),
        })
        .collect())
}

/// Point-in-time stock snapshot for the given product ids. Ids that do not
/// exist simply have no entry; callers treat them as stock 0. The read is not
/// locked against concurrent writers.
pub async fn fetch_stock_map(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<HashMap<Uuid, i32>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, stock FROM products WHERE id = ANY($1)")
        .bind(product_ids)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.get::<Uuid, _>("id"), r.get::<i32, _>("stock")))
        .collect())
}

/// Writes the computed stock value back as-is. Intentionally not
/// `stock = stock - qty`: the caller owns the snapshot arithmetic.
pub async fn set_product_stock(
    pool: &PgPool,
    product_id: Uuid,
    new_stock: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET stock = $1, updated_at = NOW() WHERE id = $2")
        .bind(new_stock)
        .bind(product_id)
        .execute(pool)
        .await?;

    Ok(())
}

fn pet_from_row(r: &sqlx::postgres::PgRow) -> Pet {
    Pet {
        id: r.get("id"),
        customer_id: r.get("customer_id"),
        name: r.get("name"),
        species: r.get("species"),
        breed: r.get("breed"),
        age: r.get("age"),
        weight: r.get("weight"),
        notes: r.get("notes"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

/// Customers newest first, each with its pets merged in. A failed pets fetch
/// degrades to empty pet lists instead of failing the whole listing.
pub async fn list_customers_with_pets(pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
    let customer_rows = sqlx::query(
        r#"SELECT id, name, email, phone, address, city, state, zip_code, notes,
                  status, created_at, updated_at
           FROM customers
           ORDER BY created_at DESC"#,
    )
    .fetch_all(pool)
    .await?;

    let mut customers: Vec<Customer> = customer_rows
        .into_iter()
        .map(|r| Customer {
            id: r.get("id"),
            name: r.get("name"),
            email: r.get("email"),
            phone: r.get("phone"),
            address: r.get("address"),
            city: r.get("city"),
            state: r.get("state"),
            zip_code: r.get("zip_code"),
            notes: r.get("notes"),
            status: r.get("status"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
            pets: Vec::new(),
        })
        .collect();

    if customers.is_empty() {
        return Ok(customers);
    }

    let customer_ids: Vec<Uuid> = customers.iter().map(|c| c.id).collect();
    let pet_rows = match sqlx::query(
        r#"SELECT id, customer_id, name, species, breed, age, weight, notes,
                  created_at, updated_at
           FROM pets
           WHERE customer_id = ANY($1)"#,
    )
    .bind(&customer_ids)
    .fetch_all(pool)
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            log::error!("list_customers_with_pets pets fetch error: {e}");
            return Ok(customers);
        }
    };

    let mut by_customer: HashMap<Uuid, Vec<Pet>> = HashMap::new();
    for row in &pet_rows {
        let pet = pet_from_row(row);
        by_customer.entry(pet.customer_id).or_default().push(pet);
    }
    for customer in &mut customers {
        if let Some(pets) = by_customer.remove(&customer.id) {
            customer.pets = pets;
        }
    }

    Ok(customers)
}

async fn load_or_init_settings(pool: &PgPool) -> Result<AppSettings, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT store_name, store_address, store_phone, low_stock_threshold,
                  alert_email_recipient
           FROM settings
           LIMIT 1"#,
    )
    .fetch_optional(pool)
    .await?;

    if let Some(r) = row {
        return Ok(AppSettings {
            store_name: r.get("store_name"),
            store_address: r.get("store_address"),
            store_phone: r.get("store_phone"),
            low_stock_threshold: r.get("low_stock_threshold"),
            alert_email_recipient: r.get("alert_email_recipient"),
        });
    }

    let defaults = AppSettings::default();
    sqlx::query(
        r#"INSERT INTO settings
               (store_name, store_address, store_phone, low_stock_threshold, alert_email_recipient)
           VALUES ($1, $2, $3, $4, $5)"#,
    )
    .bind(&defaults.store_name)
    .bind(&defaults.store_address)
    .bind(&defaults.store_phone)
    .bind(defaults.low_stock_threshold)
    .bind(&defaults.alert_email_recipient)
    .execute(pool)
    .await?;

    Ok(defaults)
}

/// Settings read never fails the caller: on any error the built-in defaults
/// (threshold 8) are returned. Creates the singleton row on first read.
pub async fn get_settings(pool: &PgPool) -> AppSettings {
    match load_or_init_settings(pool).await {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("get_settings error, using defaults: {e}");
            AppSettings::default()
        }
    }
}
