//! Key/value metadata attached to provider resources.

use std::collections::BTreeMap;

/// Tag through which rollouts discover the deploy group an image belongs to.
pub const DEPLOY_GROUP_TAG: &str = "Autoscale-Deploy-group";

/// Tagging primitive of the provider, scoped to one resource id per call.
///
/// Reads are eventually consistent on the provider side. Implementations must
/// not cache: every read goes to the provider so a successful write from the
/// same client is observed by the next read.
pub trait TagStore {
    /// Provider specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes (creates or overwrites) one tag on `resource_id`.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the write is rejected.
    fn write_tag(&self, resource_id: &str, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Returns every tag currently set on `resource_id`.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the tags cannot be listed.
    fn read_tags(&self, resource_id: &str) -> Result<BTreeMap<String, String>, Self::Error>;

    /// Returns the value of `key` on `resource_id`, or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the tags cannot be listed.
    fn read_tag(&self, resource_id: &str, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.read_tags(resource_id)?.remove(key))
    }
}
