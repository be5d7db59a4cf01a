//! Capturing an instance into a new image.

use tracing::info;

use crate::gateway::ImageGateway;
use crate::tags::TagStore;

use super::naming::{Clock, SystemClock, image_name};
use super::{Image, ImageError, RemoteOperation};

/// Options for [`Image::create`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CreateOptions {
    /// Skip the provider's stop/restart around the capture. Faster, but the
    /// filesystem may be captured in an inconsistent state. Defaults to
    /// `false`.
    pub no_reboot: bool,
    /// Deploy group to tag the new image with once it is described.
    pub deploy_group: Option<String>,
}

impl CreateOptions {
    /// Creates options with provider defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the no-reboot flag.
    #[must_use]
    pub const fn no_reboot(mut self, value: bool) -> Self {
        self.no_reboot = value;
        self
    }

    /// Sets the deploy group.
    #[must_use]
    pub fn deploy_group(mut self, group: impl Into<String>) -> Self {
        self.deploy_group = Some(group.into());
        self
    }
}

impl Image {
    /// Captures `instance_id` into a new image named after the current time
    /// and returns the fully described image.
    ///
    /// # Errors
    ///
    /// See [`Image::create_with_clock`].
    pub fn create<C>(
        client: &C,
        instance_id: &str,
        options: &CreateOptions,
    ) -> Result<Self, ImageError>
    where
        C: ImageGateway + TagStore,
    {
        Self::create_with_clock(client, &SystemClock, instance_id, options)
    }

    /// Captures `instance_id` into a new image named `autoscale-<seconds>`
    /// using `clock`, describes it, and tags it with the deploy group when
    /// one is given.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidInput`] for a blank instance id, and
    /// [`ImageError::RemoteOperationFailed`] when the create, describe, or
    /// tag call fails. No image handle is returned on failure; when only the
    /// tag write fails the error names the new image id.
    pub fn create_with_clock<C, K>(
        client: &C,
        clock: &K,
        instance_id: &str,
        options: &CreateOptions,
    ) -> Result<Self, ImageError>
    where
        C: ImageGateway + TagStore,
        K: Clock,
    {
        if instance_id.trim().is_empty() {
            return Err(ImageError::invalid("instance_id", "must not be empty"));
        }

        let name = image_name(clock);
        info!(
            instance_id,
            name = %name,
            no_reboot = options.no_reboot,
            "creating image from instance"
        );
        let image_id = client
            .create_image(instance_id, &name, options.no_reboot)
            .map_err(|err| ImageError::remote(RemoteOperation::CreateImage, instance_id, &err))?;

        let image = Self::describe(client, &image_id)?;
        if let Some(group) = options.deploy_group.as_deref() {
            image.tag_deploy_group(client, group)?;
        }

        info!(
            instance_id,
            image_id = %image.id,
            snapshots = image.snapshots.len(),
            "image created"
        );
        Ok(image)
    }
}
