//! Storage service implementation using Apache OpenDAL.

use opendal::{ErrorKind, Operator, services};
use restoboost_shared::types::VenueId;
use uuid::Uuid;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// A stored object and where it is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key.
    pub key: String,
    /// Public URL.
    pub url: String,
}

/// Storage service for venue logos.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        tracing::debug!(provider = config.provider.name(), "logo storage initialized");
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );
                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Checks a logo against the type and size limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the size or MIME type is not accepted.
    pub fn validate_logo(
        &self,
        content_type: &str,
        size: u64,
    ) -> Result<&'static str, StorageError> {
        if size > self.config.max_logo_bytes {
            return Err(StorageError::file_too_large(size, self.config.max_logo_bytes));
        }
        StorageConfig::extension_for(content_type)
            .ok_or_else(|| StorageError::invalid_mime_type(content_type))
    }

    /// Key for a new logo: `logos/{venue_id}/{uuid}.{ext}`.
    #[must_use]
    pub fn logo_key(venue_id: VenueId, extension: &str) -> String {
        format!("logos/{venue_id}/{}.{extension}", Uuid::new_v4())
    }

    /// Public URL of a key.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.config.public_base_url)
    }

    /// Recovers the key from a public URL. `None` for URLs this storage did not issue.
    #[must_use]
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.config.public_base_url)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|key| key.split(['?', '#']).next().unwrap_or(key).to_string())
            .filter(|key| !key.is_empty() && !key.split('/').any(|p| p == ".."))
    }

    /// Stores a logo and returns its key and public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the logo is rejected or the write fails.
    pub async fn upload_logo(
        &self,
        venue_id: VenueId,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        let extension = self.validate_logo(content_type, data.len() as u64)?;
        let key = Self::logo_key(venue_id, extension);

        self.operator
            .write_with(&key, data)
            .content_type(content_type)
            .await?;

        tracing::info!(venue_id = %venue_id, key = %key, "logo stored");
        Ok(StoredObject {
            url: self.public_url(&key),
            key,
        })
    }

    /// Deletes the object behind a public URL. Missing objects and foreign URLs are
    /// not errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete itself fails.
    pub async fn delete_by_url(&self, url: &str) -> Result<(), StorageError> {
        let Some(key) = self.key_from_url(url) else {
            tracing::debug!(url, "logo url not issued by this storage, skipping delete");
            return Ok(());
        };
        match self.operator.delete(&key).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.exists(key).await.unwrap_or(false)
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }
}
