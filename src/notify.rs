// src/notify.rs
//
// Low-stock alert delivery via the Resend HTTP API (https://api.resend.com).
// Delivery is best-effort: callers log a failure and move on, it never blocks
// order completion.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

const RESEND_API_BASE: &str = "https://api.resend.com";
const FALLBACK_RECIPIENT: &str = "delivered@resend.dev";

#[derive(Debug)]
pub enum NotifyError {
    Http(reqwest::Error),
    Api { status: u16, body: String },
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Http(e) => write!(f, "http error: {e}"),
            NotifyError::Api { status, body } => {
                write!(f, "resend api error status={status} body={body}")
            }
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

#[async_trait]
pub trait LowStockNotifier: Send + Sync {
    /// One attempt per call. `recipient` comes from settings; `None` falls
    /// back to the Resend sandbox address.
    async fn notify_low_stock(
        &self,
        product_name: &str,
        remaining_stock: i32,
        recipient: Option<&str>,
    ) -> Result<(), NotifyError>;
}

pub struct EmailNotifier {
    api_key: Option<String>,
    from: String,
}

impl EmailNotifier {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            from: "Toko Roman <onboarding@resend.dev>".to_string(),
        }
    }
}

#[async_trait]
impl LowStockNotifier for EmailNotifier {
    async fn notify_low_stock(
        &self,
        product_name: &str,
        remaining_stock: i32,
        recipient: Option<&str>,
    ) -> Result<(), NotifyError> {
        let Some(api_key) = self.api_key.as_deref() else {
            log::info!("RESEND_API_KEY is not set, skipping low stock email for {product_name}");
            return Ok(());
        };

        let to = recipient.unwrap_or(FALLBACK_RECIPIENT);
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": format!("Low Stock Alert: {product_name}"),
            "html": format!(
                "<h1>Low Stock Warning</h1>\
                 <p>The stock for <strong>{product_name}</strong> has dropped to \
                 <strong>{remaining_stock}</strong> pcs.</p>\
                 <p>Please restock soon.</p>"
            ),
        });

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{RESEND_API_BASE}/emails"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("low stock email sent for {product_name} to {to}");
        Ok(())
    }
}
