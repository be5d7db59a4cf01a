//! Capability interface for the image and snapshot primitives of a cloud
//! provider.
//!
//! The lifecycle code never holds a live provider handle. Every remote read or
//! mutation goes through an [`ImageGateway`] passed in by the caller, so the
//! same [`crate::Image`] value works against the AWS CLI adapter, an SDK
//! wrapper, or an in-memory fake.

/// Block device entry as reported by the provider's describe-image call.
///
/// Only the nested storage-volume descriptor matters to the lifecycle: each
/// EBS-backed mapping carries the id of the snapshot that backs the device.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BlockDeviceMapping {
    /// Device name exposed to the guest (for example `/dev/xvda`).
    pub device_name: Option<String>,
    /// Storage volume descriptor; absent for instance-store devices.
    pub ebs: Option<EbsVolume>,
}

impl BlockDeviceMapping {
    /// Builds a mapping backed by the given snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot_id: impl Into<String>) -> Self {
        Self {
            device_name: None,
            ebs: Some(EbsVolume {
                snapshot_id: Some(snapshot_id.into()),
            }),
        }
    }

    /// Sets the device name.
    #[must_use]
    pub fn device_name(mut self, value: impl Into<String>) -> Self {
        self.device_name = Some(value.into());
        self
    }

    /// Returns the snapshot id carried by the mapping, if any.
    #[must_use]
    pub fn snapshot_id(&self) -> Option<&str> {
        self.ebs
            .as_ref()
            .and_then(|ebs| ebs.snapshot_id.as_deref())
    }
}

/// Storage volume descriptor nested inside a [`BlockDeviceMapping`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EbsVolume {
    /// Snapshot backing the volume.
    pub snapshot_id: Option<String>,
}

/// Image record returned by [`ImageGateway::describe_image`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageDescription {
    /// Provider image identifier.
    pub id: String,
    /// Block device mappings in provider order.
    pub block_device_mappings: Vec<BlockDeviceMapping>,
}

/// Image and snapshot primitives required from the provider transport.
///
/// Implementations perform exactly one remote call per method and do not
/// retry; retries and timeouts belong to the transport.
pub trait ImageGateway {
    /// Provider specific error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Captures `instance_id` into a new image called `name` and returns the
    /// new image id. `no_reboot` is forwarded to the provider verbatim.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the request is rejected.
    fn create_image(
        &self,
        instance_id: &str,
        name: &str,
        no_reboot: bool,
    ) -> Result<String, Self::Error>;

    /// Fetches the image record including its block device mappings.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the image cannot be described.
    fn describe_image(&self, image_id: &str) -> Result<ImageDescription, Self::Error>;

    /// Deletes (deregisters) the image itself.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the delete is rejected.
    fn delete_image(&self, image_id: &str) -> Result<(), Self::Error>;

    /// Deletes one storage snapshot.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the delete is rejected.
    fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), Self::Error>;
}
