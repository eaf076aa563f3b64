pub mod api;
pub mod checkout;
pub mod db;
pub mod docs;
pub mod models;
pub mod notify;

use std::sync::Arc;

use sqlx::PgPool;

use crate::notify::LowStockNotifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub notifier: Arc<dyn LowStockNotifier>,
}
