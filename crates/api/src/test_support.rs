//! Shared fixtures for handler tests.
//!
//! The state runs over a disconnected pool, so any handler that reaches the
//! datastore answers 502. Tests here cover everything decided before that point.

use axum::response::Response;
use chrono::Duration;
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

use crate::AppState;
use restoboost_shared::config::{AnalyticsConfig, CronConfig, DatabaseConfig, ServerConfig};
use restoboost_shared::types::AccountId;
use restoboost_shared::{AppConfig, AuthConfig, BillingConfig, EmailConfig, StorageSettings};

pub const JWT_SECRET: &str = "test-secret";
pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const CRON_SECRET: &str = "cron-secret";
pub const ADMIN_EMAIL: &str = "ops@restoboost.com";

pub fn test_config(storage_root: &str) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: "https://restorise.fr".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/unused".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            audience: None,
            admin_emails: vec![ADMIN_EMAIL.to_string()],
        },
        email: EmailConfig::default(),
        billing: BillingConfig {
            secret_key: "sk_test".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            signature_tolerance_secs: 300,
            pro_price_id: "price_pro".to_string(),
            enterprise_price_id: "price_ent".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
        storage: StorageSettings {
            local_root: storage_root.to_string(),
            ..StorageSettings::default()
        },
        cron: CronConfig {
            reset_secret: Some(CRON_SECRET.to_string()),
        },
        analytics: AnalyticsConfig::default(),
    }
}

/// State over a disconnected pool. Keep the directory alive for the test.
pub fn test_state() -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = test_config(dir.path().to_str().unwrap());
    let state = AppState::new(&config, DatabaseConnection::Disconnected).unwrap();
    (state, dir)
}

pub fn token_for(state: &AppState, account: AccountId, email: &str) -> String {
    state
        .jwt_service
        .issue_token(account, Some(email), Duration::hours(1))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
