use std::env;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::{Mutex, MutexGuard};

use petshop_pos::notify::{LowStockNotifier, NotifyError};
use petshop_pos::AppState;

fn split_db_url(url: &str) -> Result<(String, String), String> {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base.to_string(), Some(query)),
        None => (url.to_string(), None),
    };

    let db_start = base
        .rfind('/')
        .ok_or_else(|| "invalid database url".to_string())?;
    if db_start + 1 >= base.len() {
        return Err("database name is empty".to_string());
    }

    let db_name = base[db_start + 1..].to_string();
    let mut admin_url = format!("{}postgres", &base[..db_start + 1]);
    if let Some(query) = query {
        admin_url = format!("{admin_url}?{query}");
    }

    Ok((admin_url, db_name))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

static TEST_DB_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestDb {
    pub pool: PgPool,
    _guard: MutexGuard<'static, ()>,
}

pub async fn init_test_db() -> TestDb {
    dotenvy::dotenv().ok();
    let test_url = env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let (admin_url, db_name) =
        split_db_url(&test_url).expect("invalid TEST_DATABASE_URL format");

    let lock = TEST_DB_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().await;

    let admin_pool = PgPool::connect(&admin_url)
        .await
        .expect("connect admin db");

    let _ = sqlx::query("SELECT pg_advisory_lock(171717)")
        .execute(&admin_pool)
        .await;

    let quoted_name = quote_identifier(&db_name);
    let drop_sql = format!("DROP DATABASE IF EXISTS {quoted_name} WITH (FORCE)");
    let create_sql = format!("CREATE DATABASE {quoted_name}");

    let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
    let create_result = sqlx::query(&create_sql).execute(&admin_pool).await;
    if let Err(e) = create_result {
        eprintln!("create test db error: {e}");
        let _ = sqlx::query(&drop_sql).execute(&admin_pool).await;
        sqlx::query(&create_sql)
            .execute(&admin_pool)
            .await
            .expect("create test db retry");
    }

    let _ = sqlx::query("SELECT pg_advisory_unlock(171717)")
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;

    let pool = PgPool::connect(&test_url)
        .await
        .expect("connect test db");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    TestDb { pool, _guard: guard }
}

/// Records every low-stock attempt instead of sending anything.
#[derive(Default)]
pub struct RecordingNotifier {
    pub calls: Mutex<Vec<(String, i32)>>,
}

#[async_trait]
impl LowStockNotifier for RecordingNotifier {
    async fn notify_low_stock(
        &self,
        product_name: &str,
        remaining_stock: i32,
        _recipient: Option<&str>,
    ) -> Result<(), NotifyError> {
        self.calls
            .lock()
            .await
            .push((product_name.to_string(), remaining_stock));
        Ok(())
    }
}

/// Fails every attempt; the order flow must not care.
pub struct FailingNotifier;

#[async_trait]
impl LowStockNotifier for FailingNotifier {
    async fn notify_low_stock(
        &self,
        _product_name: &str,
        _remaining_stock: i32,
        _recipient: Option<&str>,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Api {
            status: 500,
            body: "smtp down".to_string(),
        })
    }
}

pub fn build_state(pool: PgPool, notifier: Arc<dyn LowStockNotifier>) -> AppState {
    AppState { pool, notifier }
}
