//! Storage snapshots backing an image.

use tracing::debug;

use crate::gateway::ImageGateway;
use crate::image::{ImageError, RemoteOperation};

/// Handle to one provider storage snapshot.
///
/// A snapshot belongs to exactly one [`crate::Image`]; deleting it directly
/// while the image is alive leaves the image pointing at missing storage, so
/// callers normally go through [`crate::Image::delete`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Snapshot {
    id: String,
}

impl Snapshot {
    /// Wraps a provider snapshot id. No remote call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] when `id` is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ImageError> {
        let snapshot_id = id.into();
        if snapshot_id.trim().is_empty() {
            return Err(ImageError::invalid("snapshot_id", "must not be empty"));
        }
        Ok(Self { id: snapshot_id })
    }

    /// Provider snapshot id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issues one delete-snapshot call.
    ///
    /// Nothing is retried and no local state changes. Calling this twice
    /// re-issues the remote delete; the second outcome is whatever the
    /// provider reports for a missing snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::RemoteOperationFailed`] when the provider rejects
    /// the delete.
    pub fn delete<G: ImageGateway>(&self, gateway: &G) -> Result<(), ImageError> {
        debug!(snapshot_id = %self.id, "deleting snapshot");
        gateway
            .delete_snapshot(&self.id)
            .map_err(|err| ImageError::remote(RemoteOperation::DeleteSnapshot, &self.id, &err))
    }
}
