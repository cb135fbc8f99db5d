//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Auth provider token configuration.
    pub auth: AuthConfig,
    /// Outbound email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Billing provider configuration.
    pub billing: BillingConfig,
    /// Logo storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Scheduled job configuration.
    #[serde(default)]
    pub cron: CronConfig,
    /// Analytics configuration.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site, used for QR codes and billing redirects.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "https://restorise.fr".to_string()
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Configuration for tokens issued by the auth provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Secret shared with the auth provider for HS256 token validation.
    pub jwt_secret: String,
    /// Expected `aud` claim, if the provider sets one.
    #[serde(default)]
    pub audience: Option<String>,
    /// Emails allowed to use administrative endpoints.
    #[serde(default)]
    pub admin_emails: Vec<String>,
}

impl AuthConfig {
    /// Returns true if the email belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

/// SMTP configuration for transactional email.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@restoboost.com".to_string(),
            from_name: "RestoBoost".to_string(),
        }
    }
}

/// Billing provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Secret API key.
    pub secret_key: String,
    /// Webhook signing secret.
    pub webhook_secret: String,
    /// Accepted clock skew for webhook signatures, in seconds.
    #[serde(default = "default_signature_tolerance")]
    pub signature_tolerance_secs: i64,
    /// Price identifier of the pro plan.
    pub pro_price_id: String,
    /// Price identifier of the enterprise plan.
    pub enterprise_price_id: String,
    /// Base URL of the provider REST API.
    #[serde(default = "default_billing_api_base")]
    pub api_base: String,
}

fn default_signature_tolerance() -> i64 {
    300
}

fn default_billing_api_base() -> String {
    "https://api.stripe.com".to_string()
}

/// Logo storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Local root directory. Used when no S3 bucket is configured.
    #[serde(default = "default_storage_root")]
    pub local_root: String,
    /// S3-compatible endpoint.
    #[serde(default)]
    pub s3_endpoint: Option<String>,
    /// S3 bucket name.
    #[serde(default)]
    pub s3_bucket: Option<String>,
    /// S3 access key ID.
    #[serde(default)]
    pub s3_access_key_id: Option<String>,
    /// S3 secret access key.
    #[serde(default)]
    pub s3_secret_access_key: Option<String>,
    /// S3 region.
    #[serde(default = "default_s3_region")]
    pub s3_region: String,
    /// Azure storage account. Used when no S3 bucket is configured.
    #[serde(default)]
    pub azure_account: Option<String>,
    /// Azure storage access key.
    #[serde(default)]
    pub azure_access_key: Option<String>,
    /// Azure container name.
    #[serde(default)]
    pub azure_container: Option<String>,
    /// Public URL under which stored objects are served.
    #[serde(default = "default_storage_public_url")]
    pub public_base_url: String,
    /// Maximum logo size in bytes.
    #[serde(default = "default_max_logo_bytes")]
    pub max_logo_bytes: u64,
}

fn default_storage_root() -> String {
    "./storage".to_string()
}

fn default_s3_region() -> String {
    "auto".to_string()
}

fn default_storage_public_url() -> String {
    "http://localhost:8080/storage".to_string()
}

fn default_max_logo_bytes() -> u64 {
    2 * 1024 * 1024
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            local_root: default_storage_root(),
            s3_endpoint: None,
            s3_bucket: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_region: default_s3_region(),
            azure_account: None,
            azure_access_key: None,
            azure_container: None,
            public_base_url: default_storage_public_url(),
            max_logo_bytes: default_max_logo_bytes(),
        }
    }
}

/// Scheduled job configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CronConfig {
    /// Bearer secret for the monthly scan reset. Unset disables the endpoint.
    #[serde(default)]
    pub reset_secret: Option<String>,
}

/// Analytics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// IANA timezone used to bucket events by day.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Paris".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("RESTOBOOST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.admin_emails")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_env() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("RESTOBOOST__DATABASE__URL", Some("postgres://localhost/restoboost")),
            ("RESTOBOOST__AUTH__JWT_SECRET", Some("secret")),
            ("RESTOBOOST__BILLING__SECRET_KEY", Some("sk_test")),
            ("RESTOBOOST__BILLING__WEBHOOK_SECRET", Some("whsec_test")),
            ("RESTOBOOST__BILLING__PRO_PRICE_ID", Some("price_pro")),
            ("RESTOBOOST__BILLING__ENTERPRISE_PRICE_ID", Some("price_ent")),
            ("RESTOBOOST__SERVER__PORT", Some("9090")),
            ("RESTOBOOST__AUTH__ADMIN_EMAILS", Some("ops@restoboost.com,Boss@Resto.fr")),
        ]
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(required_env(), || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.billing.signature_tolerance_secs, 300);
            assert_eq!(config.analytics.timezone, "Europe/Paris");
            assert_eq!(config.storage.max_logo_bytes, 2 * 1024 * 1024);
            assert!(config.cron.reset_secret.is_none());
            assert!(config.auth.is_admin("boss@resto.fr"));
            assert!(!config.auth.is_admin("someone@else.fr"));
        });
    }

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }
}
