//! Trait seam over the administered-vaccine system of record.

use chanjo_core::AdministeredRecord;
use chrono::NaiveDate;

use crate::client::ApiClient;
use crate::error::ApiError;

/// Access to the administered-vaccine system of record.
///
/// The dashboard flow depends on this trait rather than the HTTP client
/// directly, so tests can substitute an in-memory store.
#[async_trait::async_trait]
pub trait AdministeredStore: Send + Sync {
    /// Fetch the confirmed administered list for a baby.
    async fn administered(
        &self,
        token: &str,
        baby_id: &str,
    ) -> Result<Vec<AdministeredRecord>, ApiError>;

    /// Best-effort persistence of a manual mark.
    async fn mark_administered(
        &self,
        token: &str,
        baby_id: &str,
        vaccine: &str,
        date: NaiveDate,
    ) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
impl AdministeredStore for ApiClient {
    async fn administered(
        &self,
        token: &str,
        baby_id: &str,
    ) -> Result<Vec<AdministeredRecord>, ApiError> {
        ApiClient::administered(self, token, baby_id).await
    }

    async fn mark_administered(
        &self,
        token: &str,
        baby_id: &str,
        vaccine: &str,
        date: NaiveDate,
    ) -> Result<(), ApiError> {
        ApiClient::mark_administered(self, token, baby_id, vaccine, date).await
    }
}
