#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{CodeRecord, ExpiryUpdate, UnlockPayload};
use crate::error::EntryCodeServiceError;

/// Repository for provisioned entry codes.
pub trait EntryCodeRepository: Send + Sync {
    /// Find the record for a code + address pair that is active and not expired at `now`.
    async fn find_eligible(
        &self,
        entry_code: u64,
        contact_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CodeRecord>, EntryCodeServiceError>;

    /// Set the expiry of a single-use code to `expires_at`, only if the stored
    /// record is single-use and its expiry is absent or not earlier than `expires_at`.
    ///
    /// A failed condition is reported as [`ExpiryUpdate::ConditionFailed`], not as an error.
    async fn schedule_expiry(
        &self,
        entry_code: u64,
        contact_address: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ExpiryUpdate, EntryCodeServiceError>;
}

/// Port for resolving decrypted secrets by name.
pub trait SecretPort: Send + Sync {
    /// Fails with [`EntryCodeServiceError::SecretUnavailable`].
    async fn resolve(&self, name: &str) -> Result<String, EntryCodeServiceError>;
}

/// Port for sending unlock messages to the device topic.
pub trait UnlockPublisher: Send + Sync {
    /// Fails with [`EntryCodeServiceError::Publish`].
    async fn publish(
        &self,
        topic: &str,
        payload: &UnlockPayload,
    ) -> Result<(), EntryCodeServiceError>;
}

impl<T: EntryCodeRepository> EntryCodeRepository for &T {
    async fn find_eligible(
        &self,
        entry_code: u64,
        contact_address: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CodeRecord>, EntryCodeServiceError> {
        (**self).find_eligible(entry_code, contact_address, now).await
    }

    async fn schedule_expiry(
        &self,
        entry_code: u64,
        contact_address: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ExpiryUpdate, EntryCodeServiceError> {
        (**self)
            .schedule_expiry(entry_code, contact_address, expires_at)
            .await
    }
}
