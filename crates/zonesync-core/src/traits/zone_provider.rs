// # Zone Provider Trait
//
// Defines the capability the engine needs from a remote DNS provider:
// session handling, zone lookup and record CRUD.
//
// ## Implementations
//
// - INWX: `zonesync-provider-inwx` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::ZoneProvider;
//
// async fn zone_id(provider: &dyn ZoneProvider) -> zonesync_core::Result<()> {
//     let response = provider.lookup_zone("example.com").await?;
//     if let Some(zone_id) = response.into_payload() {
//         println!("zone id: {zone_id}");
//     }
//     Ok(())
// }
// ```

use crate::record::{ExistingRecord, NormalizedRecord, RecordId, ZoneId};
use async_trait::async_trait;

/// Verdict of a single remote call
///
/// `Err(_)` from a provider method means the call never produced a verdict
/// (transport failure, undecodable body). A `ProviderResponse` with
/// `success == false` means the provider answered and refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse<T> {
    /// Whether the provider reported success
    pub success: bool,
    /// Provider status code, when the provider has one
    pub code: Option<i64>,
    /// Provider status message
    pub message: Option<String>,
    /// Result data
    pub payload: Option<T>,
}

impl<T> ProviderResponse<T> {
    /// A successful response carrying `payload`
    pub fn ok(code: Option<i64>, payload: T) -> Self {
        Self {
            success: true,
            code,
            message: None,
            payload: Some(payload),
        }
    }

    /// A refusal with the provider's code and message
    pub fn rejected(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The payload of a successful call
    pub fn into_payload(self) -> Option<T> {
        if self.success { self.payload } else { None }
    }

    /// Human-readable "code: message" for logs
    pub fn describe(&self) -> String {
        match (self.code, self.message.as_deref()) {
            (Some(code), Some(msg)) => format!("code {code}: {msg}"),
            (Some(code), None) => format!("code {code}"),
            (None, Some(msg)) => msg.to_string(),
            (None, None) => "no status".to_string(),
        }
    }
}

/// Trait for remote DNS provider implementations
///
/// Every method performs at most one remote call and reports the outcome; it
/// never retries and never decides what should change. Deciding is the
/// engine's job.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks, although the engine
/// issues calls strictly one at a time.
#[async_trait]
pub trait ZoneProvider: Send + Sync {
    /// Authenticate and open a session
    ///
    /// Returns [`crate::Error::Authentication`] when credentials are rejected.
    async fn open_session(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Close the session opened by [`ZoneProvider::open_session`]
    async fn close_session(&self) -> Result<(), crate::Error> {
        Ok(())
    }

    /// Look up a zone's identifier by name (no trailing dot)
    async fn lookup_zone(&self, name: &str) -> Result<ProviderResponse<ZoneId>, crate::Error>;

    /// Delete a whole zone by name (no trailing dot)
    async fn delete_zone(&self, name: &str) -> Result<ProviderResponse<()>, crate::Error>;

    /// List every record currently in the zone
    async fn zone_records(
        &self,
        zone_id: &ZoneId,
    ) -> Result<ProviderResponse<Vec<ExistingRecord>>, crate::Error>;

    /// Create a record in the zone
    async fn create_record(
        &self,
        zone_id: &ZoneId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>, crate::Error>;

    /// Overwrite an existing record in place
    async fn update_record(
        &self,
        id: &RecordId,
        record: &NormalizedRecord,
    ) -> Result<ProviderResponse<()>, crate::Error>;

    /// Delete a record
    async fn delete_record(&self, id: &RecordId) -> Result<ProviderResponse<()>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing zone providers from configuration
pub trait ZoneProviderFactory: Send + Sync {
    /// Create a ZoneProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    /// - `dry_run`: Perform lookups but only log mutations
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
        dry_run: bool,
    ) -> Result<Box<dyn ZoneProvider>, crate::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_response_has_no_payload() {
        let response: ProviderResponse<ZoneId> = ProviderResponse::rejected(Some(2303), "Object does not exist");
        assert!(!response.is_success());
        assert_eq!(response.describe(), "code 2303: Object does not exist");
        assert_eq!(response.into_payload(), None);
    }

    #[test]
    fn test_ok_response_payload() {
        let response = ProviderResponse::ok(Some(1000), ZoneId::from("42"));
        assert!(response.is_success());
        assert_eq!(response.describe(), "code 1000");
        assert_eq!(response.into_payload(), Some(ZoneId::from("42")));
    }
}
