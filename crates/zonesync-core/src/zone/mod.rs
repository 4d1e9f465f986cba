//! Zone state fetching
//!
//! Thin wrapper over a [`ZoneProvider`] that resolves zone names to provider
//! identifiers and retrieves the current record list. Zones are never created
//! here: a zone missing on the provider is reported as
//! [`Error::ZoneNotFound`].

use crate::error::{Error, Result};
use crate::record::{ExistingRecord, ZoneId};
use crate::traits::ZoneProvider;
use tracing::{debug, error, info, warn};

/// Strip the trailing dot(s) providers do not accept in zone names
pub fn provider_zone_name(name: &str) -> &str {
    name.trim_end_matches('.')
}

/// Read access to provider-side zone state
pub struct ZoneFetcher<'a> {
    provider: &'a dyn ZoneProvider,
}

impl<'a> ZoneFetcher<'a> {
    /// Create a fetcher over the given provider
    pub fn new(provider: &'a dyn ZoneProvider) -> Self {
        Self { provider }
    }

    /// Resolve a zone name to the provider's identifier
    ///
    /// # Returns
    ///
    /// - `Ok(ZoneId)`: The provider reported success and supplied an id
    /// - `Err(Error::ZoneNotFound)`: Any other outcome, including transport failure
    pub async fn resolve_zone(&self, name: &str) -> Result<ZoneId> {
        let lookup_name = provider_zone_name(name);

        match self.provider.lookup_zone(lookup_name).await {
            Ok(response) if response.is_success() => match response.into_payload() {
                Some(zone_id) => {
                    debug!("Resolved zone {} to id {}", name, zone_id);
                    Ok(zone_id)
                }
                None => {
                    error!("Zone lookup for {} succeeded without an id", name);
                    Err(Error::zone_not_found(name))
                }
            },
            Ok(response) => {
                error!(
                    "Zone does not exist on {} (auto-creation disabled): {} ({})",
                    self.provider.provider_name(),
                    name,
                    response.describe()
                );
                Err(Error::zone_not_found(name))
            }
            Err(e) => {
                error!("Zone lookup for {} failed: {}", name, e);
                Err(Error::zone_not_found(name))
            }
        }
    }

    /// Fetch the zone's current record list
    ///
    /// Failures are logged and yield an empty list.
    pub async fn fetch_records(&self, zone_id: &ZoneId) -> Vec<ExistingRecord> {
        match self.provider.zone_records(zone_id).await {
            Ok(response) if response.is_success() => {
                let records = response.into_payload().unwrap_or_default();
                debug!("Fetched {} record(s) for zone id {}", records.len(), zone_id);
                records
            }
            Ok(response) => {
                warn!(
                    "Listing records of zone id {} returned non-success: {}",
                    zone_id,
                    response.describe()
                );
                Vec::new()
            }
            Err(e) => {
                error!("Listing records of zone id {} failed: {}", zone_id, e);
                Vec::new()
            }
        }
    }

    /// Delete a whole zone by name
    ///
    /// # Returns
    ///
    /// `true` when the provider confirmed the deletion
    pub async fn delete_zone(&self, name: &str) -> bool {
        match self.provider.delete_zone(provider_zone_name(name)).await {
            Ok(response) if response.is_success() => {
                info!("Zone deleted: {}", name);
                true
            }
            Ok(response) => {
                warn!(
                    "Deleting zone {} returned non-success: {}",
                    name,
                    response.describe()
                );
                false
            }
            Err(e) => {
                error!("Deleting zone {} failed: {}", name, e);
                false
            }
        }
    }
}
