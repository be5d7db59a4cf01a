//! Machine images captured from running instances.
//!
//! An [`Image`] and the [`Snapshot`]s backing its block devices form one
//! logical unit: they are created together by [`Image::create`], discovered
//! through the deploy-group tag, and torn down together by [`Image::delete`],
//! which removes every snapshot before the image so no storage is orphaned
//! silently.

mod cascade;
mod create;
mod error;
mod naming;

use tracing::debug;

use crate::gateway::{BlockDeviceMapping, ImageGateway};
use crate::snapshot::Snapshot;
use crate::tags::{DEPLOY_GROUP_TAG, TagStore};

pub use cascade::{CascadePolicy, UnknownCascadePolicy};
pub use create::CreateOptions;
pub use error::{ImageError, ImageRemoval, RemoteOperation, SnapshotFailure};
pub use naming::{Clock, IMAGE_NAME_PREFIX, SystemClock, image_name};

/// Handle to one provider machine image and the snapshots it owns.
///
/// The handle holds ids only. The snapshot list is captured at construction
/// and is not refreshed from the provider unless the caller describes the
/// image again.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Image {
    id: String,
    snapshots: Vec<Snapshot>,
}

impl Image {
    /// Builds an image from its id and the block device mappings the provider
    /// reports for it, creating one [`Snapshot`] per mapping in order.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] when `id` is blank or a mapping
    /// carries no snapshot id.
    pub fn new(
        id: impl Into<String>,
        block_device_mappings: impl IntoIterator<Item = BlockDeviceMapping>,
    ) -> Result<Self, ImageError> {
        let image_id = id.into();
        if image_id.trim().is_empty() {
            return Err(ImageError::invalid("image_id", "must not be empty"));
        }

        let snapshots = block_device_mappings
            .into_iter()
            .enumerate()
            .map(|(index, mapping)| {
                let location = format!("block_device_mappings[{index}]");
                let snapshot_id = mapping.snapshot_id().ok_or_else(|| {
                    ImageError::invalid(location.clone(), "mapping carries no snapshot id")
                })?;
                Snapshot::new(snapshot_id).map_err(|err| match err {
                    ImageError::InvalidInput { reason, .. } => {
                        ImageError::invalid(location, format!("snapshot id {reason}"))
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: image_id,
            snapshots,
        })
    }

    /// Builds an image that owns no snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] when `id` is blank.
    pub fn with_id(id: impl Into<String>) -> Result<Self, ImageError> {
        Self::new(id, Vec::new())
    }

    /// Describes `id` remotely and builds the image from the reported block
    /// device mappings.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] for a blank id, and
    /// [`ImageError::RemoteOperationFailed`] when the describe call fails or
    /// reports a mapping without a snapshot id.
    pub fn describe<G: ImageGateway>(gateway: &G, id: &str) -> Result<Self, ImageError> {
        if id.trim().is_empty() {
            return Err(ImageError::invalid("image_id", "must not be empty"));
        }
        debug!(image_id = id, "describing image");
        let description = gateway
            .describe_image(id)
            .map_err(|err| ImageError::remote(RemoteOperation::DescribeImage, id, &err))?;

        Self::new(id, description.block_device_mappings).map_err(|err| match err {
            ImageError::InvalidInput { field, reason } => ImageError::RemoteOperationFailed {
                operation: RemoteOperation::DescribeImage,
                resource_id: id.to_owned(),
                message: format!("unexpected response, {field}: {reason}"),
            },
            other => other,
        })
    }

    /// Provider image id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Snapshots owned by the image, in block device mapping order.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Writes one tag on the image.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] for a blank key and
    /// [`ImageError::RemoteOperationFailed`] when the write is rejected.
    pub fn tag<T: TagStore>(&self, tags: &T, key: &str, value: &str) -> Result<(), ImageError> {
        if key.trim().is_empty() {
            return Err(ImageError::invalid("tag key", "must not be empty"));
        }
        debug!(image_id = %self.id, key, value, "writing image tag");
        tags.write_tag(&self.id, key, value)
            .map_err(|err| ImageError::remote(RemoteOperation::WriteTag, &self.id, &err))
    }

    /// Records the deploy group the image belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::RemoteOperationFailed`] when the write is
    /// rejected.
    pub fn tag_deploy_group<T: TagStore>(&self, tags: &T, group: &str) -> Result<(), ImageError> {
        self.tag(tags, DEPLOY_GROUP_TAG, group)
    }

    /// Reads the deploy group tag, `None` when it was never set.
    ///
    /// Always performs a fresh remote read.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::RemoteOperationFailed`] when the tags cannot be
    /// read.
    pub fn deploy_group<T: TagStore>(&self, tags: &T) -> Result<Option<String>, ImageError> {
        tags.read_tag(&self.id, DEPLOY_GROUP_TAG)
            .map_err(|err| ImageError::remote(RemoteOperation::ReadTags, &self.id, &err))
    }
}
