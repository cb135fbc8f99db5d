//! Logo storage configuration.

use std::path::PathBuf;

use restoboost_shared::StorageSettings;

/// Object storage backend.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces.
    S3 {
        /// Endpoint URL.
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Azure Blob Storage.
    AzureBlob {
        /// Storage account name.
        account: String,
        /// Storage access key.
        access_key: String,
        /// Container name.
        container: String,
    },
    /// Local filesystem, for development.
    LocalFs {
        /// Root directory.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Provider name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Picks the backend from settings: S3 when a bucket is set, Azure when an
    /// account is set, the local filesystem otherwise.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        if let Some(bucket) = &settings.s3_bucket {
            return Self::S3 {
                endpoint: settings.s3_endpoint.clone().unwrap_or_default(),
                bucket: bucket.clone(),
                access_key_id: settings.s3_access_key_id.clone().unwrap_or_default(),
                secret_access_key: settings.s3_secret_access_key.clone().unwrap_or_default(),
                region: settings.s3_region.clone(),
            };
        }
        if let Some(account) = &settings.azure_account {
            return Self::AzureBlob {
                account: account.clone(),
                access_key: settings.azure_access_key.clone().unwrap_or_default(),
                container: settings.azure_container.clone().unwrap_or_else(|| "logos".to_string()),
            };
        }
        Self::LocalFs {
            root: PathBuf::from(&settings.local_root),
        }
    }
}

/// Logo storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend.
    pub provider: StorageProvider,
    /// Largest accepted logo, in bytes.
    pub max_logo_bytes: u64,
    /// URL under which stored keys are publicly served.
    pub public_base_url: String,
}

/// Accepted logo types and the extension stored for each.
pub const LOGO_MIME_TYPES: [(&str, &str); 5] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/svg+xml", "svg"),
];

impl StorageConfig {
    /// Default logo limit: 2 MiB.
    pub const DEFAULT_MAX_LOGO_BYTES: u64 = 2 * 1024 * 1024;

    /// Create a config with the default size limit.
    #[must_use]
    pub fn new(provider: StorageProvider, public_base_url: impl Into<String>) -> Self {
        let public_base_url: String = public_base_url.into();
        Self {
            provider,
            max_logo_bytes: Self::DEFAULT_MAX_LOGO_BYTES,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds the config from application settings.
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(
            StorageProvider::from_settings(settings),
            settings.public_base_url.clone(),
        )
        .with_max_logo_bytes(settings.max_logo_bytes)
    }

    /// Set the logo size limit.
    #[must_use]
    pub const fn with_max_logo_bytes(mut self, bytes: u64) -> Self {
        self.max_logo_bytes = bytes;
        self
    }

    /// Extension for an accepted MIME type.
    #[must_use]
    pub fn extension_for(mime_type: &str) -> Option<&'static str> {
        LOGO_MIME_TYPES
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(mime_type))
            .map(|(_, ext)| *ext)
    }
}
