//! Cascade deletion of an image and the snapshots it owns.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::gateway::ImageGateway;

use super::{Image, ImageError, ImageRemoval, RemoteOperation, SnapshotFailure};

/// How [`Image::delete_with_policy`] reacts to a failed snapshot delete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CascadePolicy {
    /// Keep deleting the remaining snapshots and the image, then report every
    /// failure.
    #[default]
    BestEffort,
    /// Stop at the first failed snapshot and leave the image in place.
    AbortOnFirstFailure,
}

impl CascadePolicy {
    /// Configuration spelling of the policy.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BestEffort => "best-effort",
            Self::AbortOnFirstFailure => "abort-on-first-failure",
        }
    }
}

impl fmt::Display for CascadePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unrecognised cascade policy name.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown cascade policy '{0}' (expected best-effort or abort-on-first-failure)")]
pub struct UnknownCascadePolicy(pub String);

impl FromStr for CascadePolicy {
    type Err = UnknownCascadePolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "best-effort" => Ok(Self::BestEffort),
            "abort-on-first-failure" => Ok(Self::AbortOnFirstFailure),
            other => Err(UnknownCascadePolicy(other.to_owned())),
        }
    }
}

impl Image {
    /// Deletes every owned snapshot in order, then the image, continuing past
    /// snapshot failures.
    ///
    /// # Errors
    ///
    /// See [`Image::delete_with_policy`].
    pub fn delete<G: ImageGateway>(self, gateway: &G) -> Result<(), ImageError> {
        self.delete_with_policy(gateway, CascadePolicy::BestEffort)
    }

    /// Deletes every owned snapshot in order, then the image.
    ///
    /// All snapshot deletes are issued before the image delete. Consumes the
    /// handle: a deleted image has no further lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::PartialCascadeFailure`] when any snapshot delete
    /// failed, listing each failure and the image outcome. Returns
    /// [`ImageError::RemoteOperationFailed`] when every snapshot was deleted
    /// but the image delete failed.
    pub fn delete_with_policy<G: ImageGateway>(
        self,
        gateway: &G,
        policy: CascadePolicy,
    ) -> Result<(), ImageError> {
        info!(
            image_id = %self.id,
            snapshots = self.snapshots.len(),
            %policy,
            "deleting image and its snapshots"
        );

        let mut failed_snapshots = Vec::new();
        for snapshot in &self.snapshots {
            let Err(err) = snapshot.delete(gateway) else {
                continue;
            };
            warn!(
                image_id = %self.id,
                snapshot_id = snapshot.id(),
                error = %err,
                "snapshot delete failed"
            );
            failed_snapshots.push(SnapshotFailure {
                snapshot_id: snapshot.id().to_owned(),
                message: err.to_string(),
            });
            if policy == CascadePolicy::AbortOnFirstFailure {
                return Err(ImageError::PartialCascadeFailure {
                    image_id: self.id,
                    failed_snapshots,
                    image: ImageRemoval::NotAttempted,
                });
            }
        }

        let removal = match gateway.delete_image(&self.id) {
            Ok(()) => ImageRemoval::Deleted,
            Err(err) if failed_snapshots.is_empty() => {
                return Err(ImageError::remote(
                    RemoteOperation::DeleteImage,
                    &self.id,
                    &err,
                ));
            }
            Err(err) => ImageRemoval::Failed {
                message: err.to_string(),
            },
        };

        if failed_snapshots.is_empty() {
            info!(image_id = %self.id, "image deleted");
            return Ok(());
        }

        Err(ImageError::PartialCascadeFailure {
            image_id: self.id,
            failed_snapshots,
            image: removal,
        })
    }
}
